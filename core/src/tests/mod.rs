mod admin;
mod api;
mod auth;
mod log;
mod stars;
mod view;

use std::collections::{HashMap, VecDeque};

use serde_json::{json, Value};

use crate::api::ApiCall;
use crate::config::FlowConfig;
use crate::engine::QuestEngine;
use crate::error::{GameResult, TransportError};
use crate::state::FlowState;
use crate::types::{ChoiceOption, Phase, PhaseChoices};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

fn option(id: &str) -> ChoiceOption {
    ChoiceOption::new(id, &id.to_uppercase())
}

fn options(ids: &[&str]) -> PhaseChoices {
    PhaseChoices::List(ids.iter().map(|id| option(id)).collect())
}

fn costed(entries: &[(&str, u32)]) -> PhaseChoices {
    PhaseChoices::List(
        entries
            .iter()
            .map(|(id, cost)| option(id).with_cost(*cost))
            .collect(),
    )
}

fn phase_choices(phase: Phase) -> Value {
    let choices = match phase {
        Phase::One => json!([
            { "id": "elena", "title": "Elena" },
            { "id": "james", "title": "James" },
            { "id": "amira", "title": "Amira" },
        ]),
        Phase::Two => json!([
            { "id": "s1", "title": "Data platform" },
            { "id": "s2", "title": "Model hub" },
            { "id": "s3", "title": "Upskilling" },
            { "id": "s4", "title": "Guardrails" },
            { "id": "s5", "title": "Sandbox" },
        ]),
        Phase::Three => json!({
            "people_processes": [{ "id": "pp1" }, { "id": "pp2" }],
            "platform_partnerships": [{ "id": "pt1" }, { "id": "pt2" }],
            "policies_practices": [{ "id": "po1" }, { "id": "po2" }],
        }),
        Phase::Four => json!([
            { "id": "e1", "title": "Cloud", "cost": 10 },
            { "id": "e2", "title": "MLOps", "cost": 12 },
            { "id": "e3", "title": "Academy", "cost": 8 },
            { "id": "e4", "title": "Ethics board", "cost": 9 },
            { "id": "e5", "title": "Champions", "cost": 1 },
        ]),
        Phase::Five => json!([
            { "id": "d1", "title": "Scale fast" },
            { "id": "d2", "title": "Scale safe" },
        ]),
    };
    json!({ "success": true, "choices": choices })
}

fn score_reply(scores: &[(&str, u8)]) -> Value {
    let total: u8 = scores.iter().map(|(_, s)| s).sum();
    let map: serde_json::Map<String, Value> = scores
        .iter()
        .map(|(k, s)| (k.to_string(), json!(s)))
        .collect();
    json!({ "success": true, "score": { "scores": map, "total": total } })
}

/// Canned backend keyed by request path. The last reply for a path repeats.
struct ScriptedBackend {
    routes: HashMap<String, VecDeque<Result<Value, TransportError>>>,
    sent: Vec<ApiCall>,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self {
            routes: HashMap::new(),
            sent: Vec::new(),
        }
    }

    /// Session start and choices for every phase
    fn standard() -> Self {
        let mut backend = Self::new();
        backend.reply("/api/start_game", json!({ "success": true }));
        for phase in Phase::ALL {
            backend.reply(&format!("/api/phase{}/choices", phase), phase_choices(phase));
        }
        backend.reply(
            "/api/executive_dashboard",
            json!({ "success": true, "enablers": [], "use_cases": [] }),
        );
        backend
    }

    fn reply(&mut self, path: &str, value: Value) -> &mut Self {
        self.push(path, Ok(value))
    }

    fn fail(&mut self, path: &str, err: TransportError) -> &mut Self {
        self.push(path, Err(err))
    }

    fn push(&mut self, path: &str, reply: Result<Value, TransportError>) -> &mut Self {
        self.routes.entry(path.to_string()).or_default().push_back(reply);
        self
    }

    fn answer(&mut self, call: &ApiCall) -> Result<Value, TransportError> {
        let path = call.path();
        let queue = self
            .routes
            .get_mut(&path)
            .unwrap_or_else(|| panic!("no scripted reply for {}", path));
        if queue.len() > 1 {
            queue.pop_front().expect("queue is not empty")
        } else {
            queue.front().cloned().expect("queue is not empty")
        }
    }

    /// Perform `call` and every follow-up until the engine settles
    fn drive(&mut self, engine: &mut QuestEngine, call: ApiCall) -> GameResult<()> {
        let mut next = Some(call);
        while let Some(call) = next {
            let reply = self.answer(&call);
            self.sent.push(call.clone());
            next = engine.handle_response(&call, reply)?;
        }
        Ok(())
    }

    fn paths(&self) -> Vec<String> {
        self.sent.iter().map(ApiCall::path).collect()
    }

    fn was_sent(&self, path: &str) -> bool {
        self.sent.iter().any(|c| c.path() == path)
    }
}

/// Engine sitting on phase 1 with its choices loaded
fn engine_at_phase_one(config: FlowConfig) -> (QuestEngine, ScriptedBackend) {
    let mut engine = QuestEngine::new(config);
    let mut backend = ScriptedBackend::standard();
    let call = engine.start_session().unwrap();
    backend.drive(&mut engine, call).unwrap();
    if engine.state() == FlowState::Intro {
        let call = engine.finish_intro().unwrap();
        backend.drive(&mut engine, call).unwrap();
    }
    assert_eq!(engine.state(), FlowState::Phase(Phase::One));
    (engine, backend)
}

/// Fill the current phase with a valid selection
fn make_valid_selection(engine: &mut QuestEngine) {
    match engine.state().phase().unwrap() {
        Phase::One => engine.select("elena").unwrap(),
        Phase::Two => {
            engine.assign_slot(0, "s1").unwrap();
            engine.assign_slot(1, "s2").unwrap();
            engine.assign_slot(2, "s3").unwrap();
        }
        Phase::Three => {
            engine.select_in_category("people_processes", "pp1").unwrap();
            engine.select_in_category("platform_partnerships", "pt1").unwrap();
            engine.select_in_category("policies_practices", "po1").unwrap();
        }
        Phase::Four => {
            engine.toggle_enabler("e1").unwrap();
            engine.toggle_enabler("e2").unwrap();
            engine.toggle_enabler("e3").unwrap();
        }
        Phase::Five => engine.select("d1").unwrap(),
    }
}
