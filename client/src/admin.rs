//! Session creation console for operators

use std::cell::RefCell;
use std::rc::Rc;

use aiquest_core::log;
use aiquest_core::{AdminPanel, AdminView, PollPolicy, QrStatus};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Function, Promise, Reflect};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

use crate::{js_error_message, to_js, transport};

/// Global installed by the QR code script
const QR_LIBRARY: &str = "QRCode";
const QR_SIZE: u32 = 256;

#[wasm_bindgen]
pub struct AdminConsole {
    panel: Rc<RefCell<AdminPanel>>,
    base_url: Rc<str>,
}

#[wasm_bindgen]
impl AdminConsole {
    /// `poll` overrides the QR library wait (`{interval_ms, max_attempts}`)
    #[wasm_bindgen(constructor)]
    pub fn new(poll: JsValue, base_url: Option<String>) -> Result<AdminConsole, String> {
        let poll: PollPolicy = if poll.is_undefined() || poll.is_null() {
            PollPolicy::default()
        } else {
            serde_wasm_bindgen::from_value(poll)
                .map_err(|e| format!("Failed to parse poll policy: {:?}", e))?
        };
        Ok(Self {
            panel: Rc::new(RefCell::new(AdminPanel::new(poll))),
            base_url: Rc::from(base_url.unwrap_or_default()),
        })
    }

    #[wasm_bindgen]
    pub fn get_view(&self) -> Result<JsValue, String> {
        to_js(&AdminView::from_panel(&self.panel.borrow()))
    }

    /// Mint a session, then draw its join URL into the element `container_id`.
    /// Resolves with the admin view once the QR code is drawn or has failed.
    #[wasm_bindgen]
    pub fn create_session(&self, container_id: String) -> Promise {
        let panel = self.panel.clone();
        let base_url = self.base_url.clone();
        future_to_promise(async move {
            let call = panel
                .borrow_mut()
                .create_session()
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let reply = transport::send(&base_url, &call).await;
            let join_url = panel
                .borrow_mut()
                .handle_response(&call, reply)
                .map(|invite| invite.join_url.clone());
            let join_url = match join_url {
                Ok(url) => url,
                Err(_) => {
                    let message = panel.borrow().error().unwrap_or_default().to_string();
                    return Err(JsValue::from_str(&message));
                }
            };

            let generation = panel.borrow().qr_generation();
            wait_and_render(&panel, generation, &container_id, &join_url).await;
            to_js(&AdminView::from_panel(&panel.borrow())).map_err(|e| JsValue::from_str(&e))
        })
    }
}

fn qr_library() -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(QR_LIBRARY))
        .ok()
        .filter(|lib| !lib.is_undefined() && !lib.is_null())
}

/// Poll for the QR library, then draw. Stops early once a newer invite has
/// started its own poll.
async fn wait_and_render(
    panel: &Rc<RefCell<AdminPanel>>,
    generation: u32,
    container_id: &str,
    join_url: &str,
) {
    let interval = panel.borrow().poll_policy().interval_ms;
    loop {
        if panel.borrow().qr_generation() != generation {
            log::debug("qr", "superseded by a newer session");
            return;
        }
        let status = panel.borrow_mut().qr_tick(qr_library().is_some()).clone();
        match status {
            QrStatus::Ready => break,
            QrStatus::Failed { .. } | QrStatus::Idle => return,
            QrStatus::Waiting { .. } => TimeoutFuture::new(interval).await,
        }
    }

    if let Err(reason) = render_qr(panel, container_id, join_url) {
        panel.borrow_mut().qr_render_failed(&reason);
    }
}

fn render_qr(
    panel: &Rc<RefCell<AdminPanel>>,
    container_id: &str,
    join_url: &str,
) -> Result<(), String> {
    let library = qr_library().ok_or("QR code library unavailable")?;
    let to_canvas: Function = Reflect::get(&library, &JsValue::from_str("toCanvas"))
        .map_err(|e| js_error_message(&e))?
        .dyn_into()
        .map_err(|_| "QRCode.toCanvas is not a function".to_string())?;
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id))
        .ok_or_else(|| format!("no element #{}", container_id))?;
    let options = to_js(&json!({
        "width": QR_SIZE,
        "margin": 2,
        "color": { "dark": "#000000", "light": "#ffffff" }
    }))?;

    let panel = panel.clone();
    let done = Closure::once_into_js(move |err: JsValue| {
        if !err.is_null() && !err.is_undefined() {
            panel.borrow_mut().qr_render_failed(&js_error_message(&err));
        } else {
            log::debug("qr", "join URL rendered");
        }
    });

    let args = Array::of4(&container, &JsValue::from_str(join_url), &options, &done);
    to_canvas
        .apply(&library, &args)
        .map(|_| ())
        .map_err(|e| js_error_message(&e))
}
