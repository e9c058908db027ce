use serde_json::json;

use crate::admin::{AdminPanel, QrStatus, CREATE_FAILED_PREFIX};
use crate::api::ApiCall;
use crate::config::PollPolicy;
use crate::error::{GameError, TransportError};

fn created_panel(poll: PollPolicy) -> AdminPanel {
    let mut panel = AdminPanel::new(poll);
    let call = panel.create_session().unwrap();
    panel
        .handle_response(
            &call,
            Ok(json!({
                "success": true,
                "session_code": "AB12CD",
                "join_url": "https://quest.example/join/AB12CD"
            })),
        )
        .unwrap();
    panel
}

#[test]
fn test_create_session_exposes_code_and_url() {
    let panel = created_panel(PollPolicy::default());
    let invite = panel.invite().unwrap();
    assert_eq!(invite.session_code, "AB12CD");
    assert_eq!(invite.join_url, "https://quest.example/join/AB12CD");
    assert_eq!(panel.qr_status(), &QrStatus::Waiting { attempts: 0 });
    assert!(!panel.is_busy());
}

#[test]
fn test_create_session_is_single_flight() {
    let mut panel = AdminPanel::new(PollPolicy::default());
    assert_eq!(panel.create_session(), Ok(ApiCall::CreateSession));
    assert_eq!(panel.create_session(), Err(GameError::RequestInFlight));
}

#[test]
fn test_create_session_failure_reports_backend_message() {
    let mut panel = AdminPanel::new(PollPolicy::default());
    let call = panel.create_session().unwrap();
    let err = panel
        .handle_response(&call, Ok(json!({ "success": false, "message": "Not allowed" })))
        .unwrap_err();
    assert_eq!(err, GameError::Rejected { message: "Not allowed".into() });
    assert_eq!(
        panel.error(),
        Some(format!("{}Not allowed", CREATE_FAILED_PREFIX).as_str())
    );
    assert!(panel.invite().is_none());
    assert_eq!(panel.qr_status(), &QrStatus::Idle);

    let call = panel.create_session().unwrap();
    let err = panel
        .handle_response(&call, Err(TransportError::Network("reset".into())))
        .unwrap_err();
    assert!(matches!(err, GameError::Connection { .. }));
}

#[test]
fn test_qr_poll_ready_when_library_appears() {
    let mut panel = created_panel(PollPolicy::default());
    assert_eq!(panel.qr_tick(false), &QrStatus::Waiting { attempts: 1 });
    assert_eq!(panel.qr_tick(false), &QrStatus::Waiting { attempts: 2 });
    assert_eq!(panel.qr_tick(true), &QrStatus::Ready);
    // Settled states do not move
    assert_eq!(panel.qr_tick(false), &QrStatus::Ready);
}

#[test]
fn test_qr_poll_gives_up_after_max_attempts() {
    let poll = PollPolicy {
        interval_ms: 100,
        max_attempts: 100,
    };
    assert_eq!(poll.timeout_ms(), 10_000);

    let mut panel = created_panel(poll);
    for _ in 0..99 {
        assert!(!panel.qr_tick(false).is_settled());
    }
    let status = panel.qr_tick(false).clone();
    assert!(matches!(status, QrStatus::Failed { .. }));
    assert!(panel.qr_tick(true).is_settled(), "failure is terminal");
    assert!(matches!(panel.qr_status(), QrStatus::Failed { .. }));
    assert!(panel.invite().is_some(), "raw URL stays available");
}

#[test]
fn test_qr_render_failure_is_terminal() {
    let mut panel = created_panel(PollPolicy::default());
    panel.qr_tick(true);
    panel.qr_render_failed("canvas unavailable");
    assert_eq!(
        panel.qr_status(),
        &QrStatus::Failed {
            reason: "canvas unavailable".into()
        }
    );
}

#[test]
fn test_qr_idle_before_any_session() {
    let mut panel = AdminPanel::new(PollPolicy::default());
    assert_eq!(panel.qr_tick(true), &QrStatus::Idle);
}

#[test]
fn test_new_session_mid_poll_starts_a_fresh_generation() {
    let mut panel = created_panel(PollPolicy::default());
    let first = panel.qr_generation();
    panel.qr_tick(false);
    panel.qr_tick(false);

    let call = panel.create_session().unwrap();
    panel
        .handle_response(
            &call,
            Ok(json!({ "session_code": "ZZ99ZZ", "join_url": "https://quest.example/join/ZZ99ZZ" })),
        )
        .unwrap();
    assert_ne!(panel.qr_generation(), first);
    assert_eq!(panel.qr_status(), &QrStatus::Waiting { attempts: 0 });

    let current = panel.qr_generation();
    let call = panel.create_session().unwrap();
    let _ = panel.handle_response(&call, Err(TransportError::Network("reset".into())));
    assert_eq!(panel.qr_generation(), current, "a failed create keeps the running poll");
}
