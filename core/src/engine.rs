//! Phase flow controller
//!
//! `QuestEngine` owns the whole game state and never performs I/O itself.
//! Every action that needs the backend returns the `ApiCall` to perform and
//! marks it pending; the transport hands the outcome to `handle_response`,
//! which may return a follow-up call. Only one call is in flight at a time.
//!
//! The flow only moves forward once the data for the next screen has arrived,
//! so a failed call always leaves the player on the screen they acted from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{
    check_envelope, decode, decode_dashboard, ApiCall, ChoicesReply, ChooseReply, GameConfig,
    GameStateReply, LeaderboardReply, LoginReply, MessageReply, NextStepReply, ScoreReply,
};
use crate::auth::{Credentials, Registration};
use crate::collectors::{Collector, PhaseSelection};
use crate::config::FlowConfig;
use crate::error::{GameError, GameResult, TransportError};
use crate::feedback::{performance_message, phase_title, score_message};
use crate::kahoot::{self, leaderboard_changed, StepTarget};
use crate::log;
use crate::state::{FlowState, Notice, NoticeLevel};
use crate::types::{DashboardSummary, GamePath, Phase, ScoreRecord};

/// What the score screen shows after a confirm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReveal {
    pub phase: Phase,
    pub phase_score: u8,
    pub title: String,
    pub message: String,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBreakdown {
    pub phase: Phase,
    pub title: String,
    pub score: u8,
}

/// Cumulative results after phase 5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResults {
    pub total: u8,
    pub stars: u8,
    pub breakdown: Vec<PhaseBreakdown>,
    pub performance_message: String,
}

/// Ranking as last fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<crate::types::LeaderboardEntry>,
    pub user_rank: Option<u32>,
    pub current_username: Option<String>,
    pub total_entries: Option<u32>,
    pub last_completion_time: Option<String>,
}

impl From<LeaderboardReply> for Leaderboard {
    fn from(reply: LeaderboardReply) -> Self {
        Self {
            entries: reply.leaderboard,
            user_rank: reply.user_rank,
            current_username: reply.current_username,
            total_entries: reply.total_entries,
            last_completion_time: reply.last_completion_time,
        }
    }
}

pub struct QuestEngine {
    config: FlowConfig,
    state: FlowState,
    collector: Option<Collector>,
    selections: BTreeMap<Phase, PhaseSelection>,
    scores: ScoreRecord,
    reveal: Option<ScoreReveal>,
    dashboard: Option<DashboardSummary>,
    final_results: Option<FinalResults>,
    leaderboard: Option<Leaderboard>,
    // Bumped whenever the shown leaderboard is replaced
    leaderboard_revision: u32,
    // The pending call is a background leaderboard check
    polling_leaderboard: bool,
    // Phase to load once the score mirror is restored on resume
    resume_phase: Option<Phase>,
    game_config: Option<GameConfig>,
    username: Option<String>,
    prefill_username: Option<String>,
    pending: Option<ApiCall>,
    notice: Option<Notice>,
    next_notice_id: u32,
}

impl QuestEngine {
    pub fn new(config: FlowConfig) -> Self {
        log::info(&format!("quest engine ready (mode {:?})", config.mode));
        Self {
            config,
            state: FlowState::Bootstrapping,
            collector: None,
            selections: BTreeMap::new(),
            scores: ScoreRecord::default(),
            reveal: None,
            dashboard: None,
            final_results: None,
            leaderboard: None,
            leaderboard_revision: 0,
            polling_leaderboard: false,
            resume_phase: None,
            game_config: None,
            username: None,
            prefill_username: None,
            pending: None,
            notice: None,
            next_notice_id: 0,
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn collector(&self) -> Option<&Collector> {
        self.collector.as_ref()
    }

    pub fn pending(&self) -> Option<&ApiCall> {
        self.pending.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scores(&self) -> &ScoreRecord {
        &self.scores
    }

    pub fn confirmed_selection(&self, phase: Phase) -> Option<&PhaseSelection> {
        self.selections.get(&phase)
    }

    pub fn reveal(&self) -> Option<&ScoreReveal> {
        self.reveal.as_ref()
    }

    pub fn dashboard(&self) -> Option<&DashboardSummary> {
        self.dashboard.as_ref()
    }

    pub fn final_results(&self) -> Option<&FinalResults> {
        self.final_results.as_ref()
    }

    pub fn leaderboard(&self) -> Option<&Leaderboard> {
        self.leaderboard.as_ref()
    }

    pub fn leaderboard_revision(&self) -> u32 {
        self.leaderboard_revision
    }

    pub fn game_config(&self) -> Option<&GameConfig> {
        self.game_config.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn prefill_username(&self) -> Option<&str> {
        self.prefill_username.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    // ==========================================
    // Session
    // ==========================================

    /// Start a guest session
    pub fn start_session(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| s == FlowState::Bootstrapping);
        self.guard("start_session", checked)?;
        Ok(self.issue(ApiCall::StartGame))
    }

    /// Log in, then start the game once the backend accepts
    pub fn login(&mut self, credentials: Credentials) -> GameResult<ApiCall> {
        let checked = self
            .ready_in(|s| s == FlowState::Bootstrapping)
            .and_then(|_| credentials.validate());
        let body = self.guard("login", checked)?;
        Ok(self.issue(ApiCall::Login(body)))
    }

    pub fn register(&mut self, form: Registration) -> GameResult<ApiCall> {
        let checked = self
            .ready_in(|s| s == FlowState::Bootstrapping)
            .and_then(|_| form.validate());
        let body = self.guard("register", checked)?;
        Ok(self.issue(ApiCall::Register(body)))
    }

    /// Leave the intro for phase 1
    pub fn finish_intro(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| s == FlowState::Intro);
        self.guard("finish_intro", checked)?;
        Ok(self.issue(ApiCall::Choices { phase: Phase::One }))
    }

    /// Pick the game up where the backend says it stands
    pub fn resume(&mut self) -> GameResult<ApiCall> {
        let checked =
            self.ready_in(|s| matches!(s, FlowState::Bootstrapping | FlowState::Intro));
        self.guard("resume", checked)?;
        let call = if self.config.mode.is_kahoot() {
            ApiCall::NextStep
        } else {
            ApiCall::GameState
        };
        Ok(self.issue(call))
    }

    pub fn logout(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|_| true);
        self.guard("logout", checked)?;
        Ok(self.issue(ApiCall::Logout))
    }

    /// Drop every local mirror and return to the entry screen
    pub fn reset(&mut self) {
        log::action("reset", "discarding local state");
        let from = self.state;
        self.collector = None;
        self.selections.clear();
        self.scores = ScoreRecord::default();
        self.reveal = None;
        self.dashboard = None;
        self.final_results = None;
        self.leaderboard = None;
        self.polling_leaderboard = false;
        self.resume_phase = None;
        self.username = None;
        self.pending = None;
        self.notice = None;
        self.goto(from, FlowState::Bootstrapping);
    }

    pub fn load_game_config(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|_| true);
        self.guard("load_game_config", checked)?;
        Ok(self.issue(ApiCall::GameConfig))
    }

    // ==========================================
    // Selection
    // ==========================================

    /// Select a choice by id. Toggles on multi-select phases; on phase 3 the
    /// category is looked up from the id.
    pub fn select(&mut self, id: &str) -> GameResult<()> {
        let result = self.with_collector(|collector| match collector {
            Collector::Single { picks, .. } => picks.select(id),
            Collector::Priorities(slots) => slots.toggle(id),
            Collector::Budget(picks) => picks.toggle(id),
            Collector::Categories(picks) => {
                let category = picks
                    .options()
                    .iter()
                    .find(|(_, options)| options.iter().any(|o| o.id == id))
                    .map(|(category, _)| category.clone())
                    .ok_or_else(|| GameError::UnknownChoice { id: id.to_string() })?;
                picks.select(&category, id)
            }
        });
        self.guard("select", result)
    }

    pub fn assign_slot(&mut self, slot: usize, id: &str) -> GameResult<()> {
        let result = self.with_collector(|collector| match collector {
            Collector::Priorities(slots) => slots.assign(slot, id),
            _ => Err(GameError::WrongState),
        });
        self.guard("assign_slot", result)
    }

    pub fn clear_slot(&mut self, slot: usize) -> GameResult<()> {
        let result = self.with_collector(|collector| match collector {
            Collector::Priorities(slots) => slots.clear_slot(slot).map(|_| ()),
            _ => Err(GameError::WrongState),
        });
        self.guard("clear_slot", result)
    }

    pub fn select_in_category(&mut self, category: &str, id: &str) -> GameResult<()> {
        let result = self.with_collector(|collector| match collector {
            Collector::Categories(picks) => picks.select(category, id),
            _ => Err(GameError::WrongState),
        });
        self.guard("select_in_category", result)
    }

    pub fn toggle_enabler(&mut self, id: &str) -> GameResult<()> {
        let result = self.with_collector(|collector| match collector {
            Collector::Budget(picks) => picks.toggle(id),
            _ => Err(GameError::WrongState),
        });
        self.guard("toggle_enabler", result)
    }

    /// Confirm is enabled iff the selection is complete and nothing is in flight
    pub fn can_confirm(&self) -> bool {
        matches!(self.state, FlowState::Phase(_))
            && self.pending.is_none()
            && self.collector.as_ref().is_some_and(Collector::is_valid)
    }

    pub fn confirm(&mut self) -> GameResult<ApiCall> {
        let checked = self
            .ready_in(|s| matches!(s, FlowState::Phase(_)))
            .and_then(|_| {
                self.collector
                    .as_ref()
                    .ok_or(GameError::ChoicesNotLoaded)?
                    .selection()
            });
        let selection = self.guard("confirm", checked)?;
        Ok(self.issue(ApiCall::Choose(selection)))
    }

    /// Fetch the current phase's choices again, dropping the unconfirmed selection
    pub fn reload_choices(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| matches!(s, FlowState::Phase(_)));
        self.guard("reload_choices", checked)?;
        let phase = self.state.phase().ok_or(GameError::WrongState)?;
        Ok(self.issue(ApiCall::Choices { phase }))
    }

    // ==========================================
    // Advancing
    // ==========================================

    /// Leave the score screen
    pub fn acknowledge_score(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| matches!(s, FlowState::Scored(_)));
        self.guard("acknowledge_score", checked)?;
        let phase = self.state.phase().ok_or(GameError::WrongState)?;

        let call = if self.config.mode.is_kahoot() {
            match kahoot::step_after(Some(phase), None) {
                StepTarget::LoadPhase(next) => ApiCall::Choices { phase: next },
                StepTarget::Terminal => self.leaderboard_call(),
            }
        } else if phase.is_last() {
            ApiCall::CurrentScore
        } else if self.config.shows_dashboard() {
            ApiCall::ExecutiveDashboard
        } else {
            ApiCall::Choices {
                phase: phase.next().unwrap_or(Phase::Five),
            }
        };
        Ok(self.issue(call))
    }

    /// Leave the dashboard for the next phase
    pub fn continue_from_dashboard(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| matches!(s, FlowState::Dashboard(_)));
        self.guard("continue_from_dashboard", checked)?;
        let next = self
            .state
            .phase()
            .and_then(Phase::next)
            .ok_or(GameError::WrongState)?;
        Ok(self.issue(ApiCall::Choices { phase: next }))
    }

    pub fn refresh_leaderboard(&mut self) -> GameResult<ApiCall> {
        let checked = self.ready_in(|s| s.is_terminal());
        self.guard("refresh_leaderboard", checked)?;
        let call = self.leaderboard_call();
        Ok(self.issue(call))
    }

    /// Background check of the shown leaderboard. `None` while another call
    /// is in flight or once the leaderboard is no longer on screen. The reply
    /// only replaces the ranking when another player has finished meanwhile,
    /// and a failure is logged without a notice.
    pub fn poll_leaderboard(&mut self) -> Option<ApiCall> {
        if self.state != FlowState::Leaderboard || self.pending.is_some() {
            return None;
        }
        self.polling_leaderboard = true;
        let call = self.leaderboard_call();
        Some(self.issue(call))
    }

    // ==========================================
    // Notices
    // ==========================================

    /// Clear the notice. With an id, only that notice is cleared.
    pub fn dismiss_notice(&mut self, id: Option<u32>) -> bool {
        match (&self.notice, id) {
            (Some(_), None) => {
                self.notice = None;
                true
            }
            (Some(notice), Some(id)) if notice.id == id => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }

    fn post_notice(&mut self, level: NoticeLevel, message: String) -> u32 {
        self.next_notice_id = self.next_notice_id.wrapping_add(1);
        let id = self.next_notice_id;
        self.notice = Some(Notice {
            id,
            level,
            message,
            ttl_ms: Some(self.config.notice_ttl_ms),
        });
        id
    }

    // ==========================================
    // Responses
    // ==========================================

    /// Feed back the outcome of `call`. Returns the follow-up call, if any.
    pub fn handle_response(
        &mut self,
        call: &ApiCall,
        reply: Result<Value, TransportError>,
    ) -> GameResult<Option<ApiCall>> {
        if self.pending.as_ref() != Some(call) {
            let err = GameError::UnexpectedResponse { path: call.path() };
            log::warn(&err.to_string());
            return Err(err);
        }
        self.pending = None;
        let polling = std::mem::take(&mut self.polling_leaderboard);

        let outcome = reply.map_err(GameError::from).and_then(|value| {
            if polling {
                self.apply_polled_leaderboard(value)
            } else {
                self.apply(call, value)
            }
        });
        match outcome {
            Ok(next) => {
                log::result(true, &call.path());
                Ok(next.map(|call| self.issue(call)))
            }
            Err(err) if polling => {
                log::warn(&format!("leaderboard check failed: {}", err));
                Err(err)
            }
            Err(err) if *call == ApiCall::NextStep => {
                log::result(false, &format!("{} ({}), using game_state", call.path(), err));
                Ok(Some(self.issue(ApiCall::GameState)))
            }
            Err(err) => {
                log::result(false, &format!("{}: {:?}", call.path(), err));
                self.resume_phase = None;
                if matches!(err, GameError::Connection { .. }) {
                    log::error(&err.to_string());
                }
                self.post_notice(NoticeLevel::Danger, err.to_string());
                Err(err)
            }
        }
    }

    fn apply(&mut self, call: &ApiCall, reply: Value) -> GameResult<Option<ApiCall>> {
        match call {
            ApiCall::Login(body) => {
                let reply: LoginReply = decode(reply)?;
                let username = reply
                    .user_info
                    .and_then(|info| info.username)
                    .unwrap_or_else(|| body.username.clone());
                log::info(&format!("logged in as {}", username));
                self.username = Some(username);
                Ok(Some(ApiCall::StartGame))
            }
            ApiCall::Register(body) => {
                let reply: MessageReply = decode(reply)?;
                self.prefill_username = Some(body.username.clone());
                let message = reply
                    .message
                    .unwrap_or_else(|| "Registration successful! You can now log in.".into());
                self.post_notice(NoticeLevel::Success, message);
                Ok(None)
            }
            ApiCall::Logout => {
                check_envelope(&reply)?;
                self.reset();
                Ok(None)
            }
            ApiCall::StartGame => {
                check_envelope(&reply)?;
                if self.config.shows_intro() {
                    self.goto(self.state, FlowState::Intro);
                    Ok(None)
                } else {
                    Ok(Some(ApiCall::Choices { phase: Phase::One }))
                }
            }
            ApiCall::Choices { phase } => {
                let reply: ChoicesReply = decode(reply)?;
                self.collector = Some(Collector::for_phase(*phase, reply.choices, &self.config));
                self.reveal = None;
                self.dashboard = None;
                self.goto(self.state, FlowState::Phase(*phase));
                Ok(None)
            }
            ApiCall::Choose(selection) => self.apply_score(selection, reply),
            ApiCall::ExecutiveDashboard => {
                let FlowState::Scored(phase) = self.state else {
                    return Err(GameError::WrongState);
                };
                let dashboard = decode_dashboard(reply)?;
                self.dashboard = Some(dashboard.unlocked_in(phase));
                self.goto(self.state, FlowState::Dashboard(phase));
                Ok(None)
            }
            ApiCall::CurrentScore => {
                let resuming = self.resume_phase.take();
                let reply: ScoreReply = decode(reply)?;
                self.scores = reply.score;
                if let Some(phase) = resuming {
                    return Ok(Some(ApiCall::Choices { phase }));
                }
                self.final_results = Some(self.build_final_results());
                self.goto(self.state, FlowState::FinalResults);
                Ok(None)
            }
            ApiCall::GameState => {
                let reply: GameStateReply = decode(reply)?;
                Ok(Some(self.resume_target(&reply.current_path)))
            }
            ApiCall::NextStep => {
                let reply: NextStepReply = decode(reply)?;
                if !reply.completed && reply.next_step <= 1 {
                    return Ok(Some(ApiCall::Choices { phase: Phase::One }));
                }
                Ok(Some(match kahoot::step_from_server(&reply) {
                    StepTarget::LoadPhase(phase) => self.resume_into(phase),
                    StepTarget::Terminal => self.leaderboard_call(),
                }))
            }
            ApiCall::GameConfig => {
                let config: GameConfig = decode(reply)?;
                self.game_config = Some(config);
                Ok(None)
            }
            ApiCall::Leaderboard { .. } => {
                let reply: LeaderboardReply = decode(reply)?;
                self.store_leaderboard(reply.into());
                if self.state != FlowState::FinalResults {
                    self.goto(self.state, FlowState::Leaderboard);
                }
                Ok(None)
            }
            ApiCall::CreateSession => Err(GameError::UnexpectedResponse { path: call.path() }),
        }
    }

    fn apply_score(
        &mut self,
        selection: &PhaseSelection,
        reply: Value,
    ) -> GameResult<Option<ApiCall>> {
        let phase = selection.phase();
        if self.state != FlowState::Phase(phase) {
            return Err(GameError::WrongState);
        }
        let reply: ChooseReply = decode(reply)?;
        let record = reply.into_score()?;

        let phase_score = record.phase_score(phase);
        self.reveal = Some(ScoreReveal {
            phase,
            phase_score,
            title: phase_title(phase).to_string(),
            message: score_message(phase, phase_score, selection.primary_choice()),
            total: record.total,
        });
        self.scores = record;
        self.selections.insert(phase, selection.clone());
        self.collector = None;
        self.goto(self.state, FlowState::Scored(phase));
        Ok(None)
    }

    fn apply_polled_leaderboard(&mut self, reply: Value) -> GameResult<Option<ApiCall>> {
        let latest: Leaderboard = decode::<LeaderboardReply>(reply)?.into();
        let changed = self
            .leaderboard
            .as_ref()
            .map_or(true, |shown| leaderboard_changed(shown, &latest));
        if changed {
            log::info("another player finished, refreshing leaderboard");
            self.store_leaderboard(latest);
        }
        Ok(None)
    }

    fn store_leaderboard(&mut self, board: Leaderboard) {
        self.leaderboard = Some(board);
        self.leaderboard_revision = self.leaderboard_revision.wrapping_add(1);
    }

    fn resume_target(&mut self, path: &GamePath) -> ApiCall {
        if path.is_empty() {
            return ApiCall::Choices { phase: Phase::One };
        }
        match kahoot::step_after(None, Some(path)) {
            StepTarget::LoadPhase(phase) => self.resume_into(phase),
            StepTarget::Terminal if self.config.mode.is_kahoot() => self.leaderboard_call(),
            StepTarget::Terminal => ApiCall::CurrentScore,
        }
    }

    /// Past phase 1 the score mirror is restored before the choices load
    fn resume_into(&mut self, phase: Phase) -> ApiCall {
        if phase == Phase::One {
            return ApiCall::Choices { phase };
        }
        self.resume_phase = Some(phase);
        ApiCall::CurrentScore
    }

    fn build_final_results(&self) -> FinalResults {
        let total = self.scores.total;
        let stars = self.config.star_bucketing.stars(total);
        FinalResults {
            total,
            stars,
            breakdown: Phase::ALL
                .iter()
                .map(|&phase| PhaseBreakdown {
                    phase,
                    title: phase_title(phase).to_string(),
                    score: self.scores.phase_score(phase),
                })
                .collect(),
            performance_message: performance_message(stars).to_string(),
        }
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn leaderboard_call(&self) -> ApiCall {
        ApiCall::Leaderboard {
            limit: self.config.leaderboard_limit,
        }
    }

    fn ready_in(&self, allowed: impl Fn(FlowState) -> bool) -> GameResult<()> {
        if self.pending.is_some() {
            return Err(GameError::RequestInFlight);
        }
        if !allowed(self.state) {
            return Err(GameError::WrongState);
        }
        Ok(())
    }

    fn with_collector(
        &mut self,
        f: impl FnOnce(&mut Collector) -> GameResult<()>,
    ) -> GameResult<()> {
        self.ready_in(|s| matches!(s, FlowState::Phase(_)))?;
        let collector = self.collector.as_mut().ok_or(GameError::ChoicesNotLoaded)?;
        f(collector)
    }

    /// Log a refused action and surface it as a notice
    fn guard<T>(&mut self, name: &str, result: GameResult<T>) -> GameResult<T> {
        if let Err(err) = &result {
            log::rejected(name, &err.to_string());
            let level = if err.is_validation() {
                NoticeLevel::Warning
            } else {
                NoticeLevel::Danger
            };
            self.post_notice(level, err.to_string());
        }
        result
    }

    fn issue(&mut self, call: ApiCall) -> ApiCall {
        log::action(call.name(), &format!("{} {}", call.method().as_str(), call.path()));
        self.pending = Some(call.clone());
        call
    }

    fn goto(&mut self, from: FlowState, to: FlowState) {
        if from != to {
            log::transition(&from.describe(), &to.describe());
        }
        self.state = to;
    }
}
