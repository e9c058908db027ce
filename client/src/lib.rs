pub mod admin;
pub mod engine;
mod transport;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use admin::AdminConsole;
pub use engine::GameEngine;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "browser_log")]
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Serialize for the page: plain objects instead of JS `Map`s
pub(crate) fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize view: {:?}", e))
}

/// Best-effort text of a thrown JS value
pub(crate) fn js_error_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{:?}", err))
}
