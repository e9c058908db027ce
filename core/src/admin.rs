//! Session creation panel
//!
//! An operator mints a joinable session; the join URL is then drawn as a QR
//! code by a script that may still be loading. The wait for that script is a
//! fixed-interval poll with a hard attempt limit. The raw URL stays available
//! whatever the poll outcome.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{decode, ApiCall, SessionInvite};
use crate::config::PollPolicy;
use crate::error::{GameError, GameResult, TransportError};
use crate::log;

/// Prefix of every session creation failure message
pub const CREATE_FAILED_PREFIX: &str = "Error while creating the session: ";

/// Progress of the QR rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum QrStatus {
    /// No invite to draw yet
    Idle,
    /// Polled `attempts` times for the rendering library
    Waiting { attempts: u32 },
    Ready,
    /// Terminal; share the raw URL instead
    Failed { reason: String },
}

impl QrStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, QrStatus::Ready | QrStatus::Failed { .. })
    }
}

pub struct AdminPanel {
    poll: PollPolicy,
    invite: Option<SessionInvite>,
    qr: QrStatus,
    // Bumped per minted invite; a poll loop only drives its own generation
    qr_generation: u32,
    pending: bool,
    error: Option<String>,
}

impl AdminPanel {
    pub fn new(poll: PollPolicy) -> Self {
        Self {
            poll,
            invite: None,
            qr: QrStatus::Idle,
            qr_generation: 0,
            pending: false,
            error: None,
        }
    }

    pub fn invite(&self) -> Option<&SessionInvite> {
        self.invite.as_ref()
    }

    pub fn qr_status(&self) -> &QrStatus {
        &self.qr
    }

    pub fn is_busy(&self) -> bool {
        self.pending
    }

    /// Identifies the invite the current QR poll belongs to
    pub fn qr_generation(&self) -> u32 {
        self.qr_generation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn create_session(&mut self) -> GameResult<ApiCall> {
        if self.pending {
            return Err(GameError::RequestInFlight);
        }
        log::action("create_session", "requesting a joinable session");
        self.pending = true;
        self.error = None;
        Ok(ApiCall::CreateSession)
    }

    pub fn handle_response(
        &mut self,
        call: &ApiCall,
        reply: Result<Value, TransportError>,
    ) -> GameResult<&SessionInvite> {
        if *call != ApiCall::CreateSession || !self.pending {
            return Err(GameError::UnexpectedResponse { path: call.path() });
        }
        self.pending = false;

        let decoded = reply
            .map_err(GameError::from)
            .and_then(decode::<SessionInvite>);
        match decoded {
            Ok(invite) => {
                log::info(&format!("session {} created", invite.session_code));
                self.qr = QrStatus::Waiting { attempts: 0 };
                self.qr_generation = self.qr_generation.wrapping_add(1);
                Ok(self.invite.insert(invite))
            }
            Err(err) => {
                log::result(false, &err.to_string());
                self.error = Some(format!("{}{}", CREATE_FAILED_PREFIX, err));
                Err(err)
            }
        }
    }

    /// One poll step. `library_ready` tells whether the QR script is loaded.
    pub fn qr_tick(&mut self, library_ready: bool) -> &QrStatus {
        if let QrStatus::Waiting { attempts } = self.qr {
            if library_ready {
                self.qr = QrStatus::Ready;
            } else if attempts + 1 >= self.poll.max_attempts {
                log::warn("QR library never loaded");
                self.qr = QrStatus::Failed {
                    reason: format!(
                        "QR code library failed to load after {} ms",
                        self.poll.timeout_ms()
                    ),
                };
            } else {
                self.qr = QrStatus::Waiting {
                    attempts: attempts + 1,
                };
            }
        }
        &self.qr
    }

    /// The library was there but drawing failed
    pub fn qr_render_failed(&mut self, reason: &str) {
        log::warn(&format!("QR rendering failed: {}", reason));
        self.qr = QrStatus::Failed {
            reason: reason.to_string(),
        };
    }
}
