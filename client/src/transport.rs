//! `fetch` transport
//!
//! Sends an `ApiCall` with the session cookie and hands back the parsed JSON.
//! Anything that is not a readable 2xx JSON reply becomes a `TransportError`.

use aiquest_core::api::ApiCall;
use aiquest_core::error::TransportError;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

use crate::js_error_message;

fn network(err: JsValue) -> TransportError {
    TransportError::Network(js_error_message(&err))
}

fn body(err: JsValue) -> TransportError {
    TransportError::Body(js_error_message(&err))
}

pub async fn send(base_url: &str, call: &ApiCall) -> Result<Value, TransportError> {
    let window = web_sys::window().ok_or_else(|| TransportError::Network("no window".into()))?;

    let init = RequestInit::new();
    init.set_method(call.method().as_str());
    init.set_credentials(RequestCredentials::Include);
    let payload = call.body();
    if let Some(payload) = &payload {
        init.set_body(&JsValue::from_str(&payload.to_string()));
    }

    let url = format!("{}{}", base_url, call.path());
    let request = Request::new_with_str_and_init(&url, &init).map_err(network)?;
    if payload.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(network)?;
    }

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    if !response.ok() {
        return Err(TransportError::Status {
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(body)?)
        .await
        .map_err(body)?
        .as_string()
        .ok_or_else(|| TransportError::Body("response body is not text".into()))?;
    serde_json::from_str(&text).map_err(|e| TransportError::Body(e.to_string()))
}
