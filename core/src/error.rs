//! Error types for game operations
//!
//! One enum covers the three failure families the player can hit: a selection or
//! form that fails client-side validation (never sent), a backend reply with
//! `success: false` (message surfaced verbatim), and a transport failure (generic
//! connection message). The `Display` text is what the player sees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown for every transport-level failure.
pub const CONNECTION_ERROR: &str = "Server connection error";

/// Game errors that can occur while driving the quest
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameError {
    /// Choice id is not part of the loaded choice set
    #[error("Unknown choice: {id}")]
    UnknownChoice { id: String },
    /// Priority slot index out of range
    #[error("Priority slot {slot} does not exist")]
    InvalidSlot { slot: usize },
    /// Priority slot already holds a solution
    #[error("Priority slot {slot} is already filled, clear it first")]
    SlotOccupied { slot: usize },
    /// Same solution assigned twice
    #[error("{id} is already one of your priorities")]
    DuplicateChoice { id: String },
    /// All slots are taken
    #[error("You can only select {max} solutions")]
    SelectionFull { max: usize },
    /// Category key is not offered for this phase
    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },
    /// Adding the enabler would go over the budget ceiling
    #[error("You cannot exceed {ceiling} points")]
    BudgetExceeded { spent: u32, cost: u32, ceiling: u32 },
    /// Confirm attempted before the selection satisfies its shape
    #[error("Please complete your selection first")]
    IncompleteSelection,
    /// Login or registration form field failed validation
    #[error("{reason}")]
    InvalidField { field: String, reason: String },
    /// Backend answered `success: false`
    #[error("{message}")]
    Rejected { message: String },
    /// Network failure, non-2xx status or unreadable body
    #[error("{}", CONNECTION_ERROR)]
    Connection { detail: String },
    /// Action not available on the current screen
    #[error("This action is not available right now")]
    WrongState,
    /// Another call is still in flight
    #[error("Please wait for the current request to finish")]
    RequestInFlight,
    /// Phase screen is shown but its choices have not arrived yet
    #[error("Choices are still loading")]
    ChoicesNotLoaded,
    /// Response does not belong to the call in flight
    #[error("Unexpected response for {path}")]
    UnexpectedResponse { path: String },
    /// Reply decoded as JSON but not in the expected shape
    #[error("Malformed server response: {detail}")]
    MalformedResponse { detail: String },
}

impl GameError {
    /// Client-side validation failures: the request was never sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GameError::UnknownChoice { .. }
                | GameError::InvalidSlot { .. }
                | GameError::SlotOccupied { .. }
                | GameError::DuplicateChoice { .. }
                | GameError::SelectionFull { .. }
                | GameError::UnknownCategory { .. }
                | GameError::BudgetExceeded { .. }
                | GameError::IncompleteSelection
                | GameError::InvalidField { .. }
        )
    }

    pub(crate) fn field(field: &str, reason: &str) -> Self {
        GameError::InvalidField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Failure reported by a transport before any reply could be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request never completed
    #[error("network failure: {0}")]
    Network(String),
    /// Server answered outside the 2xx range
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// Body could not be read or parsed as JSON
    #[error("unreadable response body: {0}")]
    Body(String),
}

impl From<TransportError> for GameError {
    fn from(err: TransportError) -> Self {
        GameError::Connection {
            detail: err.to_string(),
        }
    }
}
