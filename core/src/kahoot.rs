//! Kahoot mode stepping
//!
//! In Kahoot mode the intro and dashboards are skipped and each score screen
//! leads straight to the next phase. The next phase comes from the backend when
//! it can say so (`/api/next_step`); otherwise it is inferred from the choices
//! the backend has recorded.

use crate::api::NextStepReply;
use crate::engine::Leaderboard;
use crate::types::{GamePath, Phase};

/// Where the flow goes after a score screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget {
    LoadPhase(Phase),
    /// Every phase is done
    Terminal,
}

impl StepTarget {
    /// Step following a completed phase
    pub fn after(completed: Phase) -> Self {
        match completed.next() {
            Some(next) => StepTarget::LoadPhase(next),
            None => StepTarget::Terminal,
        }
    }
}

/// Last completed phase according to the recorded path: the highest populated
/// choice field, phase 1 when none is.
pub fn infer_completed_phase(path: &GamePath) -> Phase {
    Phase::ALL
        .iter()
        .rev()
        .copied()
        .find(|&phase| path.is_populated(phase))
        .unwrap_or(Phase::One)
}

/// Next step from the authoritative phase number when known, else from the path
pub fn step_after(authoritative: Option<Phase>, path: Option<&GamePath>) -> StepTarget {
    let completed = authoritative
        .or_else(|| path.map(infer_completed_phase))
        .unwrap_or(Phase::One);
    StepTarget::after(completed)
}

/// Decode `/api/next_step`. Out-of-range steps are clamped to 2..=5.
pub fn step_from_server(reply: &NextStepReply) -> StepTarget {
    if reply.completed || reply.next_step >= 6 {
        return StepTarget::Terminal;
    }
    let step = reply.next_step.clamp(2, 5);
    match Phase::from_number(step) {
        Some(phase) => StepTarget::LoadPhase(phase),
        None => StepTarget::Terminal,
    }
}

/// Whether another player finished since `previous` was fetched: the entry
/// count moved, or both boards carry a last completion time and it moved.
pub fn leaderboard_changed(previous: &Leaderboard, latest: &Leaderboard) -> bool {
    let count = |board: &Leaderboard| {
        board
            .total_entries
            .unwrap_or(board.entries.len() as u32)
    };
    let completion_moved = match (&previous.last_completion_time, &latest.last_completion_time) {
        (Some(before), Some(after)) => before != after,
        _ => false,
    };
    count(previous) != count(latest) || completion_moved
}
