//! View types for UI serialization
//!
//! Rendering is a pure function of the engine: the page gets one `GameView`
//! snapshot after every change and draws from it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::admin::{AdminPanel, QrStatus};
use crate::api::SessionInvite;
use crate::collectors::{BudgetPicks, CategoryPicks, Collector, PrioritySlots, SingleSelect};
use crate::engine::{FinalResults, Leaderboard, QuestEngine, ScoreReveal};
use crate::feedback::phase_title;
use crate::state::{FlowState, Notice, MAX_TOTAL_SCORE};
use crate::types::{ChoiceOption, DashboardSummary, Phase};

/// A choice card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    pub selected: bool,
    /// Selecting it now would be refused
    pub disabled: bool,
}

impl OptionView {
    fn new(option: &ChoiceOption, selected: bool, disabled: bool) -> Self {
        Self {
            id: option.id.clone(),
            title: option.title.clone(),
            description: option.description.clone(),
            cost: option.cost,
            feasibility: option.feasibility.clone(),
            impact: option.impact.clone(),
            selected,
            disabled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub key: String,
    pub picked: Option<String>,
    pub options: Vec<OptionView>,
}

/// Collector-specific part of the phase screen
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CollectorView {
    Single {
        options: Vec<OptionView>,
    },
    #[serde(rename_all = "camelCase")]
    Priorities {
        options: Vec<OptionView>,
        slots: Vec<Option<String>>,
    },
    Categories {
        categories: Vec<CategoryView>,
    },
    Budget {
        options: Vec<OptionView>,
        spent: u32,
        ceiling: u32,
        remaining: u32,
    },
}

impl CollectorView {
    pub fn from_collector(collector: &Collector) -> Self {
        match collector {
            Collector::Single { picks, .. } => Self::single(picks),
            Collector::Priorities(slots) => Self::priorities(slots),
            Collector::Categories(picks) => Self::categories(picks),
            Collector::Budget(picks) => Self::budget(picks),
        }
    }

    fn single(picks: &SingleSelect) -> Self {
        CollectorView::Single {
            options: picks
                .options()
                .iter()
                .map(|o| OptionView::new(o, picks.selected() == Some(o.id.as_str()), false))
                .collect(),
        }
    }

    fn priorities(slots: &PrioritySlots) -> Self {
        let full = slots.is_full();
        CollectorView::Priorities {
            options: slots
                .options()
                .iter()
                .map(|o| {
                    let selected = slots.slot_of(&o.id).is_some();
                    OptionView::new(o, selected, full && !selected)
                })
                .collect(),
            slots: slots.slots().to_vec(),
        }
    }

    fn categories(picks: &CategoryPicks) -> Self {
        CollectorView::Categories {
            categories: picks
                .options()
                .iter()
                .map(|(key, options)| {
                    let picked = picks.pick(key);
                    CategoryView {
                        key: key.clone(),
                        picked: picked.map(str::to_string),
                        options: options
                            .iter()
                            .map(|o| OptionView::new(o, picked == Some(o.id.as_str()), false))
                            .collect(),
                    }
                })
                .collect(),
        }
    }

    fn budget(picks: &BudgetPicks) -> Self {
        CollectorView::Budget {
            options: picks
                .options()
                .iter()
                .map(|o| OptionView::new(o, picks.is_selected(&o.id), !picks.fits(&o.id)))
                .collect(),
            spent: picks.spent(),
            ceiling: picks.ceiling(),
            remaining: picks.remaining(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRowView {
    pub rank: u32,
    pub username: String,
    pub total_score: u32,
    pub stars: u8,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub rows: Vec<LeaderboardRowView>,
    pub player_count: usize,
    /// Rounded mean of all totals, 0 when empty
    pub average_score: u32,
    pub top_score: u32,
    pub user_rank: Option<u32>,
}

impl LeaderboardView {
    pub fn from_leaderboard(board: &Leaderboard, username: Option<&str>) -> Self {
        let me = board.current_username.as_deref().or(username);
        let rows: Vec<LeaderboardRowView> = board
            .entries
            .iter()
            .map(|e| LeaderboardRowView {
                rank: e.rank,
                username: e.username.clone(),
                total_score: e.total_score,
                stars: e.stars,
                is_current_user: me == Some(e.username.as_str()),
            })
            .collect();
        let player_count = rows.len();
        let sum: u32 = rows.iter().map(|r| r.total_score).sum();
        let average_score = if player_count == 0 {
            0
        } else {
            (sum as f64 / player_count as f64).round() as u32
        };
        let user_rank = board
            .user_rank
            .or_else(|| rows.iter().find(|r| r.is_current_user).map(|r| r.rank));
        Self {
            top_score: rows.iter().map(|r| r.total_score).max().unwrap_or(0),
            rows,
            player_count,
            average_score,
            user_rank,
        }
    }
}

/// The complete game view sent to the page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub screen: String,
    pub phase: Option<Phase>,
    pub phase_title: Option<String>,
    pub progress: u8,
    pub busy: bool,
    pub loading_choices: bool,
    pub can_confirm: bool,
    pub collector: Option<CollectorView>,
    pub reveal: Option<ScoreReveal>,
    pub phase_scores: BTreeMap<String, u8>,
    pub total: u8,
    pub max_total: u8,
    pub dashboard: Option<DashboardSummary>,
    pub final_results: Option<FinalResults>,
    pub leaderboard: Option<LeaderboardView>,
    pub notice: Option<Notice>,
    pub username: Option<String>,
    pub prefill_username: Option<String>,
    pub game_title: Option<String>,
}

impl GameView {
    pub fn from_engine(engine: &QuestEngine) -> Self {
        let state = engine.state();
        let phase = state.phase();
        let scores = engine.scores();
        Self {
            screen: state.name().to_string(),
            phase,
            phase_title: phase.map(|p| phase_title(p).to_string()),
            progress: state.progress(),
            busy: engine.is_busy(),
            loading_choices: matches!(
                engine.pending(),
                Some(crate::api::ApiCall::Choices { .. })
            ),
            can_confirm: engine.can_confirm(),
            collector: match state {
                FlowState::Phase(_) => engine.collector().map(CollectorView::from_collector),
                _ => None,
            },
            reveal: engine.reveal().cloned(),
            phase_scores: Phase::ALL
                .iter()
                .filter(|&&p| scores.scores.contains_key(p.score_key()))
                .map(|&p| (p.score_key().to_string(), scores.phase_score(p)))
                .collect(),
            total: scores.total,
            max_total: MAX_TOTAL_SCORE,
            dashboard: engine.dashboard().cloned(),
            final_results: engine.final_results().cloned(),
            leaderboard: engine
                .leaderboard()
                .map(|board| LeaderboardView::from_leaderboard(board, engine.username())),
            notice: engine.notice().cloned(),
            username: engine.username().map(str::to_string),
            prefill_username: engine.prefill_username().map(str::to_string),
            game_title: engine.game_config().and_then(|c| c.game_title.clone()),
        }
    }
}

/// Admin panel snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub busy: bool,
    pub invite: Option<SessionInvite>,
    pub qr: QrStatus,
    pub error: Option<String>,
}

impl AdminView {
    pub fn from_panel(panel: &AdminPanel) -> Self {
        Self {
            busy: panel.is_busy(),
            invite: panel.invite().cloned(),
            qr: panel.qr_status().clone(),
            error: panel.error().map(str::to_string),
        }
    }
}
