//! Display-only star rating of a cumulative score
//!
//! Two threshold sets circulate for turning a 0-15 total into 1-3 stars. The
//! standard one (`>=14 / >=10`) is canonical; `Strict` (`>=14 / >=11`) is kept
//! selectable so the discrepancy stays visible instead of being folded away.

use serde::{Deserialize, Serialize};

use crate::state::MAX_PHASE_SCORE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StarBucketing {
    /// `total >= 14` three stars, `total >= 10` two, otherwise one
    #[default]
    Standard,
    /// `total >= 14` three stars, `total >= 11` two, otherwise one
    Strict,
}

impl StarBucketing {
    pub fn stars(self, total: u8) -> u8 {
        let two_star_floor = match self {
            StarBucketing::Standard => 10,
            StarBucketing::Strict => 11,
        };
        if total >= 14 {
            3
        } else if total >= two_star_floor {
            2
        } else {
            1
        }
    }
}

/// Canonical bucketing of a cumulative score. Never returns 0.
pub fn calculate_new_score(total: u8) -> u8 {
    StarBucketing::Standard.stars(total)
}

/// `filled` stars out of three, e.g. `★★☆`
pub fn star_string(filled: u8) -> String {
    let filled = filled.min(MAX_PHASE_SCORE) as usize;
    let empty = MAX_PHASE_SCORE as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
