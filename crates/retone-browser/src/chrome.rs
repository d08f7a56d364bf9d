//! `chrome.*` extension API bindings.
//!
//! Custom wasm_bindgen bindings since web-sys doesn't cover extension APIs.
//! Every import uses `catch`, so calling into a context where the API is
//! missing yields an `Err` instead of a thrown exception.

use js_sys::{Function, Promise};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use retone_core::{ChannelError, PlatformError};

use crate::host::{js_err, js_error_message};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    fn tabs_send_message(tab_id: f64, message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message(callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    fn storage_sync_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    fn storage_sync_set(items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_local_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn storage_on_changed(callback: &Function) -> Result<(), JsValue>;
}

/// Convert a JSON value into a plain JS object (not a `Map`).
pub fn to_js(value: &Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// Convert a structured-clone JS value into JSON. Anything that does not
/// convert (functions, symbols) becomes `null`.
pub fn from_js(value: JsValue) -> Value {
    serde_wasm_bindgen::from_value(value).unwrap_or(Value::Null)
}

fn unreachable(e: JsValue) -> ChannelError {
    ChannelError::Unreachable(js_error_message(&e))
}

async fn query_tab_ids(query: Value) -> Result<Vec<f64>, ChannelError> {
    let promise = tabs_query(&to_js(&query)).map_err(|_| ChannelError::Unavailable)?;
    let tabs = JsFuture::from(promise).await.map_err(unreachable)?;
    let ids = js_sys::Array::from(&tabs)
        .iter()
        .filter_map(|tab| js_sys::Reflect::get(&tab, &JsValue::from_str("id")).ok())
        .filter_map(|id| id.as_f64())
        .collect();
    Ok(ids)
}

/// Id of the focused tab in the current window.
pub async fn active_tab_id() -> Result<f64, ChannelError> {
    query_tab_ids(serde_json::json!({ "active": true, "currentWindow": true }))
        .await?
        .first()
        .copied()
        .ok_or(ChannelError::NoActiveTab)
}

/// Ids of every open tab.
pub async fn all_tab_ids() -> Result<Vec<f64>, ChannelError> {
    query_tab_ids(serde_json::json!({})).await
}

/// Send to one tab's content script and wait for the reply.
pub async fn send_to_tab(tab_id: f64, message: &Value) -> Result<Value, ChannelError> {
    let promise = tabs_send_message(tab_id, &to_js(message)).map_err(|_| ChannelError::Unavailable)?;
    let reply = JsFuture::from(promise).await.map_err(unreachable)?;
    Ok(from_js(reply))
}

/// Send to one tab without waiting. Delivery failures are dropped.
pub fn notify_tab(tab_id: f64, message: &Value) {
    let Ok(promise) = tabs_send_message(tab_id, &to_js(message)) else {
        return;
    };
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            tracing::trace!(target: "retone::chrome", tab_id, "tab not listening: {}", js_error_message(&e));
        }
    });
}

/// Send to the extension's own runtime (background) and wait for the reply.
pub async fn send_to_runtime(message: &Value) -> Result<Value, ChannelError> {
    let promise = runtime_send_message(&to_js(message)).map_err(|_| ChannelError::Unavailable)?;
    let reply = JsFuture::from(promise).await.map_err(unreachable)?;
    Ok(from_js(reply))
}

/// Reply callback handed to a runtime message listener.
pub struct Responder(Function);

impl Responder {
    pub fn send(&self, reply: &Value) {
        if let Err(e) = self.0.call1(&JsValue::NULL, &to_js(reply)) {
            tracing::debug!(target: "retone::chrome", "reply dropped: {}", js_error_message(&e));
        }
    }
}

/// What a message handler did with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Not ours; let other listeners answer.
    Ignored,
    /// The reply was sent synchronously.
    Replied,
}

/// Register a `chrome.runtime.onMessage` listener for the lifetime of the
/// context.
pub fn on_runtime_message(
    mut handler: impl FnMut(Value, Responder) -> Handled + 'static,
) -> Result<(), PlatformError> {
    let closure = Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: Function| {
            // Replies are synchronous, so the channel never needs holding open.
            if handler(from_js(message), Responder(send_response)) == Handled::Ignored {
                tracing::trace!(target: "retone::chrome", "message left for other listeners");
            }
            JsValue::UNDEFINED
        },
    );
    runtime_on_message(closure.as_ref().unchecked_ref()).map_err(js_err)?;
    closure.forget();
    Ok(())
}

/// Register a `chrome.storage.onChanged` listener for synced storage.
pub fn on_sync_storage_changed(
    mut handler: impl FnMut(Value) + 'static,
) -> Result<(), PlatformError> {
    let closure = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() == Some("sync") {
            handler(from_js(changes));
        }
    });
    storage_on_changed(closure.as_ref().unchecked_ref()).map_err(js_err)?;
    closure.forget();
    Ok(())
}

pub async fn sync_get(keys: &[&str]) -> Result<Value, PlatformError> {
    let keys = to_js(&Value::from(keys.to_vec()));
    let promise = storage_sync_get(&keys).map_err(js_err)?;
    let items = JsFuture::from(promise).await.map_err(js_err)?;
    Ok(from_js(items))
}

pub async fn sync_set(items: &Value) -> Result<(), PlatformError> {
    let promise = storage_sync_set(&to_js(items)).map_err(js_err)?;
    JsFuture::from(promise).await.map_err(js_err)?;
    Ok(())
}

pub async fn local_get(keys: &[&str]) -> Result<Value, PlatformError> {
    let keys = to_js(&Value::from(keys.to_vec()));
    let promise = storage_local_get(&keys).map_err(js_err)?;
    let items = JsFuture::from(promise).await.map_err(js_err)?;
    Ok(from_js(items))
}
