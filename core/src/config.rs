//! Flow configuration
//!
//! Passed in from the page as a plain object; every field has a default so an
//! empty object yields the standard game.

use serde::{Deserialize, Serialize};

use crate::stars::StarBucketing;
use crate::state::{
    DEFAULT_BUDGET_CEILING, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_LEADERBOARD_REFRESH_MS,
    DEFAULT_NOTICE_TTL_MS, PRIORITY_SLOTS,
};

/// Which flow variant drives the phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowMode {
    /// Intro, score reveal, dashboard after phases 1-4, final results
    #[default]
    Standard,
    /// No intro or dashboards, leaderboard instead of final results
    Kahoot,
}

impl FlowMode {
    pub fn is_kahoot(self) -> bool {
        self == FlowMode::Kahoot
    }
}

/// Fixed-interval poll with a hard attempt limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u32,
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Time after which the poll reports failure
    pub fn timeout_ms(&self) -> u64 {
        self.interval_ms as u64 * self.max_attempts as u64
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub mode: FlowMode,
    /// Standard mode: go straight from session start to phase 1
    #[serde(default)]
    pub skip_intro: bool,
    #[serde(default)]
    pub star_bucketing: StarBucketing,
    #[serde(default = "default_budget_ceiling")]
    pub budget_ceiling: u32,
    #[serde(default = "default_priority_slots")]
    pub priority_slots: usize,
    #[serde(default = "default_notice_ttl_ms")]
    pub notice_ttl_ms: u32,
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: u32,
    /// Leaderboard re-check interval while it is shown, 0 disables
    #[serde(default = "default_leaderboard_refresh_ms")]
    pub leaderboard_refresh_ms: u32,
    #[serde(default)]
    pub qr_poll: PollPolicy,
}

impl FlowConfig {
    pub fn kahoot() -> Self {
        Self {
            mode: FlowMode::Kahoot,
            ..Self::default()
        }
    }

    /// Intro screen is shown after the session starts
    pub fn shows_intro(&self) -> bool {
        !self.mode.is_kahoot() && !self.skip_intro
    }

    /// Executive dashboard follows phases 1-4
    pub fn shows_dashboard(&self) -> bool {
        !self.mode.is_kahoot()
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            mode: FlowMode::Standard,
            skip_intro: false,
            star_bucketing: StarBucketing::default(),
            budget_ceiling: default_budget_ceiling(),
            priority_slots: default_priority_slots(),
            notice_ttl_ms: default_notice_ttl_ms(),
            leaderboard_limit: default_leaderboard_limit(),
            leaderboard_refresh_ms: default_leaderboard_refresh_ms(),
            qr_poll: PollPolicy::default(),
        }
    }
}

fn default_budget_ceiling() -> u32 {
    DEFAULT_BUDGET_CEILING
}

fn default_priority_slots() -> usize {
    PRIORITY_SLOTS
}

fn default_notice_ttl_ms() -> u32 {
    DEFAULT_NOTICE_TTL_MS
}

fn default_leaderboard_limit() -> u32 {
    DEFAULT_LEADERBOARD_LIMIT
}

fn default_leaderboard_refresh_ms() -> u32 {
    DEFAULT_LEADERBOARD_REFRESH_MS
}

fn default_poll_interval_ms() -> u32 {
    100
}

fn default_poll_attempts() -> u32 {
    100
}
