//! Backend contract
//!
//! `ApiCall` names every request the game makes. The transport only needs the
//! method, path and optional JSON body; replies come back as raw JSON and are
//! decoded here.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{LoginBody, RegisterBody};
use crate::collectors::PhaseSelection;
use crate::error::{GameError, GameResult};
use crate::types::{
    ExecutiveDashboard, GamePath, LeaderboardEntry, Phase, PhaseChoices, ScoreRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request the transport must perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum ApiCall {
    Login(LoginBody),
    Register(RegisterBody),
    Logout,
    StartGame,
    Choices { phase: Phase },
    Choose(PhaseSelection),
    ExecutiveDashboard,
    CurrentScore,
    GameState,
    GameConfig,
    Leaderboard { limit: u32 },
    NextStep,
    CreateSession,
}

impl ApiCall {
    pub fn method(&self) -> Method {
        match self {
            ApiCall::Login(_)
            | ApiCall::Register(_)
            | ApiCall::Logout
            | ApiCall::StartGame
            | ApiCall::Choose(_)
            | ApiCall::CreateSession => Method::Post,
            _ => Method::Get,
        }
    }

    pub fn path(&self) -> String {
        match self {
            ApiCall::Login(_) => "/api/login".into(),
            ApiCall::Register(_) => "/api/register".into(),
            ApiCall::Logout => "/api/logout".into(),
            ApiCall::StartGame => "/api/start_game".into(),
            ApiCall::Choices { phase } => format!("/api/phase{}/choices", phase),
            ApiCall::Choose(selection) => format!("/api/phase{}/choose", selection.phase()),
            ApiCall::ExecutiveDashboard => "/api/executive_dashboard".into(),
            ApiCall::CurrentScore => "/api/current_score".into(),
            ApiCall::GameState => "/api/game_state".into(),
            ApiCall::GameConfig => "/api/game_config".into(),
            ApiCall::Leaderboard { limit } => format!("/api/leaderboard?limit={}", limit),
            ApiCall::NextStep => "/api/next_step".into(),
            ApiCall::CreateSession => "/api/admin/create_session".into(),
        }
    }

    /// JSON body for POST requests
    pub fn body(&self) -> Option<Value> {
        match self {
            ApiCall::Login(body) => serde_json::to_value(body).ok(),
            ApiCall::Register(body) => serde_json::to_value(body).ok(),
            ApiCall::Choose(selection) => Some(selection.body()),
            ApiCall::Logout | ApiCall::StartGame | ApiCall::CreateSession => {
                Some(Value::Object(Default::default()))
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::Login(_) => "login",
            ApiCall::Register(_) => "register",
            ApiCall::Logout => "logout",
            ApiCall::StartGame => "start_game",
            ApiCall::Choices { .. } => "choices",
            ApiCall::Choose(_) => "choose",
            ApiCall::ExecutiveDashboard => "executive_dashboard",
            ApiCall::CurrentScore => "current_score",
            ApiCall::GameState => "game_state",
            ApiCall::GameConfig => "game_config",
            ApiCall::Leaderboard { .. } => "leaderboard",
            ApiCall::NextStep => "next_step",
            ApiCall::CreateSession => "create_session",
        }
    }
}

/// Fail with the backend's message when the reply says `success: false`.
/// Replies without a `success` field are accepted as they are.
pub fn check_envelope(reply: &Value) -> GameResult<()> {
    match reply.get("success").and_then(Value::as_bool) {
        Some(false) => Err(GameError::Rejected {
            message: reply
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Unknown error")
                .to_string(),
        }),
        _ => Ok(()),
    }
}

/// Envelope check followed by typed decoding
pub fn decode<T: DeserializeOwned>(reply: Value) -> GameResult<T> {
    check_envelope(&reply)?;
    serde_json::from_value(reply).map_err(|e| GameError::MalformedResponse {
        detail: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChoicesReply {
    pub choices: PhaseChoices,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhaseResults {
    #[serde(default)]
    pub scores: BTreeMap<String, u8>,
    #[serde(default)]
    pub total: u8,
    #[serde(default)]
    pub stars: Option<u8>,
}

/// `/api/phaseN/choose` reply. Phase 5 reports `results` instead of `score`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChooseReply {
    #[serde(default)]
    pub score: Option<ScoreRecord>,
    #[serde(default)]
    pub results: Option<PhaseResults>,
}

impl ChooseReply {
    pub fn into_score(self) -> GameResult<ScoreRecord> {
        match (self.score, self.results) {
            (Some(score), _) => Ok(score),
            (None, Some(results)) => Ok(ScoreRecord {
                scores: results.scores,
                total: results.total,
            }),
            (None, None) => Err(GameError::MalformedResponse {
                detail: "reply carries neither score nor results".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreReply {
    pub score: ScoreRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameStateReply {
    #[serde(default)]
    pub game_state: Option<String>,
    #[serde(default)]
    pub current_path: GamePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardReply {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub user_rank: Option<u32>,
    #[serde(default)]
    pub current_username: Option<String>,
    /// Players who finished, regardless of `limit`
    #[serde(default)]
    pub total_entries: Option<u32>,
    #[serde(default)]
    pub last_completion_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NextStepReply {
    pub next_step: u8,
    #[serde(default)]
    pub completed: bool,
}

/// A freshly minted joinable session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInvite {
    pub session_code: String,
    pub join_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Branding served by `/api/game_config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub game_title: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `/api/executive_dashboard`, either wrapped in `dashboard` or flat
pub fn decode_dashboard(reply: Value) -> GameResult<ExecutiveDashboard> {
    check_envelope(&reply)?;
    let body = match reply {
        Value::Object(mut map) => match map.remove("dashboard") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };
    serde_json::from_value(body).map_err(|e| GameError::MalformedResponse {
        detail: e.to_string(),
    })
}
