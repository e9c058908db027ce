use serde_json::json;

use crate::api::{
    check_envelope, decode, decode_dashboard, ApiCall, ChooseReply, LeaderboardReply, Method,
};
use crate::collectors::PhaseSelection;
use crate::error::GameError;
use crate::types::{DashboardCategory, Phase, PhaseChoices, UnlockKind};

#[test]
fn test_call_paths_and_methods() {
    let cases = [
        (ApiCall::StartGame, Method::Post, "/api/start_game"),
        (ApiCall::Choices { phase: Phase::Three }, Method::Get, "/api/phase3/choices"),
        (ApiCall::ExecutiveDashboard, Method::Get, "/api/executive_dashboard"),
        (ApiCall::CurrentScore, Method::Get, "/api/current_score"),
        (ApiCall::GameState, Method::Get, "/api/game_state"),
        (ApiCall::GameConfig, Method::Get, "/api/game_config"),
        (ApiCall::Leaderboard { limit: 20 }, Method::Get, "/api/leaderboard?limit=20"),
        (ApiCall::NextStep, Method::Get, "/api/next_step"),
        (ApiCall::CreateSession, Method::Post, "/api/admin/create_session"),
        (ApiCall::Logout, Method::Post, "/api/logout"),
    ];
    for (call, method, path) in cases {
        assert_eq!(call.method(), method, "{}", path);
        assert_eq!(call.path(), path);
    }
}

#[test]
fn test_choose_call_carries_phase_shaped_body() {
    let call = ApiCall::Choose(PhaseSelection::Priorities {
        solution_ids: vec!["s3".into(), "s1".into(), "s2".into()],
    });
    assert_eq!(call.method(), Method::Post);
    assert_eq!(call.path(), "/api/phase2/choose");
    assert_eq!(call.body(), Some(json!({ "solution_ids": ["s3", "s1", "s2"] })));

    let call = ApiCall::Choose(PhaseSelection::Deployment {
        choice_id: "d2".into(),
    });
    assert_eq!(call.path(), "/api/phase5/choose");
    assert_eq!(call.body(), Some(json!({ "choice_id": "d2" })));
    assert_eq!(ApiCall::CurrentScore.body(), None);
}

#[test]
fn test_envelope_failure_surfaces_message_verbatim() {
    assert_eq!(
        check_envelope(&json!({ "success": false, "message": "Phase2 must be completed first" })),
        Err(GameError::Rejected {
            message: "Phase2 must be completed first".into()
        })
    );
    assert_eq!(
        check_envelope(&json!({ "success": false })),
        Err(GameError::Rejected {
            message: "Unknown error".into()
        })
    );
    assert!(check_envelope(&json!({ "success": true })).is_ok());
    assert!(check_envelope(&json!({ "company_name": "TechCorp" })).is_ok());
}

#[test]
fn test_choose_reply_accepts_score_and_results_shapes() {
    let reply: ChooseReply =
        decode(json!({ "success": true, "score": { "scores": { "mot1": 2 }, "total": 2 } }))
            .unwrap();
    let record = reply.into_score().unwrap();
    assert_eq!(record.phase_score(Phase::One), 2);

    let reply: ChooseReply = decode(json!({
        "success": true,
        "results": { "scores": { "mot5": 3 }, "total": 12, "stars": 2 }
    }))
    .unwrap();
    let record = reply.into_score().unwrap();
    assert_eq!(record.total, 12);
    assert_eq!(record.phase_score(Phase::Five), 3);

    let reply: ChooseReply = decode(json!({ "success": true })).unwrap();
    assert!(matches!(
        reply.into_score(),
        Err(GameError::MalformedResponse { .. })
    ));
}

#[test]
fn test_choices_decode_list_and_category_shapes() {
    let list: PhaseChoices = serde_json::from_value(json!([{ "id": "elena" }])).unwrap();
    assert!(matches!(list, PhaseChoices::List(ref v) if v.len() == 1));

    let grouped: PhaseChoices =
        serde_json::from_value(json!({ "people_processes": [{ "id": "pp1" }] })).unwrap();
    assert!(matches!(grouped, PhaseChoices::ByCategory(ref m) if m.contains_key("people_processes")));
}

#[test]
fn test_malformed_reply_is_reported() {
    let result: Result<LeaderboardReply, _> = decode(json!({ "leaderboard": "nope" }));
    assert!(matches!(result, Err(GameError::MalformedResponse { .. })));
}

#[test]
fn test_dashboard_partitions_phase_items_into_three_columns() {
    let dashboard = decode_dashboard(json!({
        "success": true,
        "dashboard": {
            "enablers": [
                { "id": "cloud", "title": "Cloud platform", "category": "technology", "phase": 2 },
                { "id": "council", "title": "AI council", "category": "Governance", "phase": 2 },
                { "id": "old", "title": "Earlier", "category": "people", "phase": 1 },
                { "id": "mystery", "category": "finance", "phase": 2 }
            ],
            "use_cases": [
                { "id": "copilot", "category": "people_processes", "phase": 2 }
            ]
        }
    }))
    .unwrap();

    let summary = dashboard.unlocked_in(Phase::Two);
    let labels: Vec<_> = summary.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Technology", "Governance", "People"]);

    let tech = &summary.columns[0];
    assert_eq!(tech.category, DashboardCategory::Technology);
    assert_eq!(tech.entries.len(), 1);
    assert_eq!(tech.entries[0].title, "Cloud platform");

    let people = &summary.columns[2];
    assert_eq!(people.entries.len(), 1, "phase 1 items are excluded");
    assert_eq!(people.entries[0].kind, UnlockKind::UseCase);
    assert_eq!(people.entries[0].title, "copilot", "missing titles fall back to the id");

    let total: usize = summary.columns.iter().map(|c| c.entries.len()).sum();
    assert_eq!(total, 3, "unclassified categories are dropped");
}

#[test]
fn test_flat_dashboard_reply_decodes() {
    let dashboard = decode_dashboard(json!({ "enablers": [], "use_cases": [] })).unwrap();
    assert!(dashboard
        .unlocked_in(Phase::One)
        .columns
        .iter()
        .all(|c| c.entries.is_empty()));
}
