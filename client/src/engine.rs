//! Game engine for browser WASM builds
//!
//! Wraps `QuestEngine` for JavaScript. Selection edits are synchronous; every
//! action that talks to the backend returns a Promise that settles once the
//! engine has processed the reply and any follow-up calls, resolving with the
//! fresh view. Notices are cleared by a timer after their display time, and
//! the leaderboard is re-checked in the background while it is on screen.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use aiquest_core::api::ApiCall;
use aiquest_core::auth::{Credentials, Registration};
use aiquest_core::error::GameResult;
use aiquest_core::log;
use aiquest_core::{FlowConfig, FlowState, GameView, QuestEngine};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::{to_js, transport};

/// State shared between the exported handle and in-flight futures
#[derive(Clone)]
struct Shared {
    engine: Rc<RefCell<QuestEngine>>,
    base_url: Rc<str>,
    on_change: Rc<RefCell<Option<Function>>>,
    // Last notice that has a dismissal timer
    timed_notice: Rc<Cell<u32>>,
    // A leaderboard refresh loop is running
    refreshing: Rc<Cell<bool>>,
}

impl Shared {
    fn view(&self) -> Result<JsValue, String> {
        to_js(&GameView::from_engine(&self.engine.borrow()))
    }

    /// Push the view to the page and arm the notice timer
    fn changed(&self) {
        self.schedule_notice_dismissal();
        self.schedule_leaderboard_refresh();
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            match self.view() {
                Ok(view) => {
                    if let Err(err) = callback.call1(&JsValue::NULL, &view) {
                        log::warn(&format!("on_change callback failed: {:?}", err));
                    }
                }
                Err(err) => log::error(&err),
            }
        }
    }

    fn schedule_notice_dismissal(&self) {
        let Some((id, ttl_ms)) = self
            .engine
            .borrow()
            .notice()
            .and_then(|n| n.ttl_ms.map(|ttl| (n.id, ttl)))
        else {
            return;
        };
        if self.timed_notice.get() == id {
            return;
        }
        self.timed_notice.set(id);

        let shared = self.clone();
        spawn_local(async move {
            TimeoutFuture::new(ttl_ms).await;
            let dismissed = shared.engine.borrow_mut().dismiss_notice(Some(id));
            if dismissed {
                shared.changed();
            }
        });
    }

    /// Re-check the leaderboard every `leaderboard_refresh_ms` until it leaves
    /// the screen. The page is only notified when the ranking was replaced.
    fn schedule_leaderboard_refresh(&self) {
        let interval_ms = {
            let engine = self.engine.borrow();
            if engine.state() != FlowState::Leaderboard {
                return;
            }
            engine.config().leaderboard_refresh_ms
        };
        if interval_ms == 0 || self.refreshing.replace(true) {
            return;
        }

        let shared = self.clone();
        spawn_local(async move {
            log::info("leaderboard auto-refresh started");
            loop {
                TimeoutFuture::new(interval_ms).await;
                if shared.engine.borrow().state() != FlowState::Leaderboard {
                    break;
                }
                let Some(call) = shared.engine.borrow_mut().poll_leaderboard() else {
                    continue;
                };
                let revision = shared.engine.borrow().leaderboard_revision();
                let reply = transport::send(&shared.base_url, &call).await;
                // Failures are logged by the engine; the next tick retries
                let _ = shared.engine.borrow_mut().handle_response(&call, reply);
                if shared.engine.borrow().leaderboard_revision() != revision {
                    shared.changed();
                }
            }
            shared.refreshing.set(false);
            log::info("leaderboard auto-refresh stopped");
        });
    }

    /// Perform `call` and every follow-up the engine asks for
    async fn run(&self, call: ApiCall) -> GameResult<()> {
        let mut next = Some(call);
        while let Some(call) = next {
            let reply = transport::send(&self.base_url, &call).await;
            let outcome = self.engine.borrow_mut().handle_response(&call, reply);
            self.changed();
            next = outcome?;
        }
        Ok(())
    }
}

/// The main game engine exposed to WASM
#[wasm_bindgen]
pub struct GameEngine {
    shared: Shared,
}

#[wasm_bindgen]
impl GameEngine {
    /// Create an engine. `config` is a `FlowConfig`-shaped object or undefined;
    /// `base_url` prefixes every `/api` path (same origin when omitted).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, base_url: Option<String>) -> Result<GameEngine, String> {
        let config: FlowConfig = if config.is_undefined() || config.is_null() {
            FlowConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| format!("Failed to parse config: {:?}", e))?
        };
        log::info("=== AI QUEST ENGINE INITIALIZED ===");
        Ok(Self {
            shared: Shared {
                engine: Rc::new(RefCell::new(QuestEngine::new(config))),
                base_url: Rc::from(base_url.unwrap_or_default()),
                on_change: Rc::new(RefCell::new(None)),
                timed_notice: Rc::new(Cell::new(0)),
                refreshing: Rc::new(Cell::new(false)),
            },
        })
    }

    /// Called with the new view after every change, including timer dismissals
    #[wasm_bindgen]
    pub fn set_on_change(&self, callback: Option<Function>) {
        *self.shared.on_change.borrow_mut() = callback;
    }

    #[wasm_bindgen]
    pub fn get_view(&self) -> Result<JsValue, String> {
        self.shared.view()
    }

    #[wasm_bindgen]
    pub fn can_confirm(&self) -> bool {
        self.shared.engine.borrow().can_confirm()
    }

    // ==========================================
    // Synchronous edits
    // ==========================================

    #[wasm_bindgen]
    pub fn select(&self, id: &str) -> Result<(), String> {
        self.edit(|engine| engine.select(id))
    }

    #[wasm_bindgen]
    pub fn assign_slot(&self, slot: usize, id: &str) -> Result<(), String> {
        self.edit(|engine| engine.assign_slot(slot, id))
    }

    #[wasm_bindgen]
    pub fn clear_slot(&self, slot: usize) -> Result<(), String> {
        self.edit(|engine| engine.clear_slot(slot))
    }

    #[wasm_bindgen]
    pub fn select_in_category(&self, category: &str, id: &str) -> Result<(), String> {
        self.edit(|engine| engine.select_in_category(category, id))
    }

    #[wasm_bindgen]
    pub fn toggle_enabler(&self, id: &str) -> Result<(), String> {
        self.edit(|engine| engine.toggle_enabler(id))
    }

    #[wasm_bindgen]
    pub fn dismiss_notice(&self, id: Option<u32>) {
        if self.shared.engine.borrow_mut().dismiss_notice(id) {
            self.shared.changed();
        }
    }

    #[wasm_bindgen]
    pub fn reset(&self) {
        self.shared.engine.borrow_mut().reset();
        self.shared.changed();
    }

    // ==========================================
    // Backend actions (Promise resolving with the view)
    // ==========================================

    #[wasm_bindgen]
    pub fn start_session(&self) -> Promise {
        self.dispatch(QuestEngine::start_session)
    }

    /// `credentials`: `{kind: "account", username, password}` or
    /// `{kind: "player", username, sessionCode}`
    #[wasm_bindgen]
    pub fn login(&self, credentials: JsValue) -> Promise {
        match serde_wasm_bindgen::from_value::<Credentials>(credentials) {
            Ok(credentials) => self.dispatch(move |engine| engine.login(credentials)),
            Err(e) => reject(format!("Failed to parse credentials: {:?}", e)),
        }
    }

    #[wasm_bindgen]
    pub fn register(&self, form: JsValue) -> Promise {
        match serde_wasm_bindgen::from_value::<Registration>(form) {
            Ok(form) => self.dispatch(move |engine| engine.register(form)),
            Err(e) => reject(format!("Failed to parse registration: {:?}", e)),
        }
    }

    #[wasm_bindgen]
    pub fn finish_intro(&self) -> Promise {
        self.dispatch(QuestEngine::finish_intro)
    }

    #[wasm_bindgen]
    pub fn resume(&self) -> Promise {
        self.dispatch(QuestEngine::resume)
    }

    #[wasm_bindgen]
    pub fn confirm(&self) -> Promise {
        self.dispatch(QuestEngine::confirm)
    }

    #[wasm_bindgen]
    pub fn reload_choices(&self) -> Promise {
        self.dispatch(QuestEngine::reload_choices)
    }

    #[wasm_bindgen]
    pub fn acknowledge_score(&self) -> Promise {
        self.dispatch(QuestEngine::acknowledge_score)
    }

    #[wasm_bindgen]
    pub fn continue_from_dashboard(&self) -> Promise {
        self.dispatch(QuestEngine::continue_from_dashboard)
    }

    #[wasm_bindgen]
    pub fn refresh_leaderboard(&self) -> Promise {
        self.dispatch(QuestEngine::refresh_leaderboard)
    }

    #[wasm_bindgen]
    pub fn load_game_config(&self) -> Promise {
        self.dispatch(QuestEngine::load_game_config)
    }

    #[wasm_bindgen]
    pub fn logout(&self) -> Promise {
        self.dispatch(QuestEngine::logout)
    }
}

impl GameEngine {
    fn edit(&self, f: impl FnOnce(&mut QuestEngine) -> GameResult<()>) -> Result<(), String> {
        let result = f(&mut *self.shared.engine.borrow_mut());
        self.shared.changed();
        result.map_err(|e| e.to_string())
    }

    /// Start an action and drive its calls to completion
    fn dispatch(&self, action: impl FnOnce(&mut QuestEngine) -> GameResult<ApiCall>) -> Promise {
        let started = action(&mut *self.shared.engine.borrow_mut());
        self.shared.changed();
        let shared = self.shared.clone();
        future_to_promise(async move {
            let call = started.map_err(|e| JsValue::from_str(&e.to_string()))?;
            shared
                .run(call)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            shared.view().map_err(|e| JsValue::from_str(&e))
        })
    }
}

fn reject(message: String) -> Promise {
    Promise::reject(&JsValue::from_str(&message))
}
