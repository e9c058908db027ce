use serde::{Deserialize, Serialize};

use crate::types::Phase;

/// Number of phases in a run
pub const PHASE_COUNT: usize = 5;
/// Best score of a single phase
pub const MAX_PHASE_SCORE: u8 = 3;
/// Best cumulative score
pub const MAX_TOTAL_SCORE: u8 = 15;
/// Phase-4 budget ceiling
pub const DEFAULT_BUDGET_CEILING: u32 = 30;
/// Phase-2 priority slots
pub const PRIORITY_SLOTS: usize = 3;
/// Notice auto-dismiss delay
pub const DEFAULT_NOTICE_TTL_MS: u32 = 5000;
/// Leaderboard rows requested
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;
/// Background leaderboard check while it is on screen
pub const DEFAULT_LEADERBOARD_REFRESH_MS: u32 = 10_000;

/// Screen the flow controller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "phase", rename_all = "camelCase")]
pub enum FlowState {
    /// Entry screen, no session started yet
    Bootstrapping,
    /// Narrative introduction (standard mode only)
    Intro,
    /// Collecting the phase's selection
    Phase(Phase),
    /// Phase score reveal
    Scored(Phase),
    /// Executive dashboard after phases 1-4 (standard mode only)
    Dashboard(Phase),
    /// Cumulative breakdown after phase 5 (standard mode)
    FinalResults,
    /// Ranking after phase 5 (Kahoot mode)
    Leaderboard,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Bootstrapping => "bootstrapping",
            FlowState::Intro => "intro",
            FlowState::Phase(_) => "phase",
            FlowState::Scored(_) => "scored",
            FlowState::Dashboard(_) => "dashboard",
            FlowState::FinalResults => "finalResults",
            FlowState::Leaderboard => "leaderboard",
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match *self {
            FlowState::Phase(p) | FlowState::Scored(p) | FlowState::Dashboard(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::FinalResults | FlowState::Leaderboard)
    }

    /// Progress bar percentage for the screen
    pub fn progress(&self) -> u8 {
        match *self {
            FlowState::Bootstrapping => 0,
            FlowState::Intro => 10,
            FlowState::Phase(Phase::One) => 20,
            FlowState::Phase(p) => completed_progress(p.number() - 1),
            FlowState::Scored(p) | FlowState::Dashboard(p) => completed_progress(p.number()),
            FlowState::FinalResults | FlowState::Leaderboard => 100,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self.phase() {
            Some(p) => format!("{}[{}]", self.name(), p),
            None => self.name().to_string(),
        }
    }
}

fn completed_progress(completed: u8) -> u8 {
    match completed {
        0 => 20,
        1 => 40,
        2 => 60,
        3 => 80,
        4 => 90,
        _ => 100,
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

/// Player-facing message with an optional auto-dismiss delay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u32,
    pub level: NoticeLevel,
    pub message: String,
    pub ttl_ms: Option<u32>,
}
