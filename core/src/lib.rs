//! Core rules of The AI Quest
//!
//! Phase flow, choice collectors and the backend contract, with no I/O. The
//! browser client drives a `QuestEngine` and performs the `ApiCall`s it issues.

pub mod admin;
pub mod api;
pub mod auth;
pub mod collectors;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod kahoot;
pub mod log;
pub mod stars;
pub mod state;
pub mod types;
pub mod view;

#[cfg(test)]
mod tests;

pub use admin::{AdminPanel, QrStatus};
pub use api::ApiCall;
pub use config::{FlowConfig, FlowMode, PollPolicy};
pub use engine::QuestEngine;
pub use error::{GameError, GameResult, TransportError};
pub use state::{FlowState, Notice, NoticeLevel};
pub use view::{AdminView, GameView};
