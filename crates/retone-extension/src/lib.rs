//! WASM entry points for the retone browser extension.
//!
//! One module serves all three contexts. The JS loaders in `static/` call
//! the matching entry point:
//!
//! - `startContent()` from the content script
//! - `handleBackgroundMessage(message)` from the service worker's
//!   `onMessage` listener
//! - `new PopupController()` from the popup page

mod popup;
mod types;

pub use popup::*;
pub use types::*;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use retone_browser::chrome::{from_js, to_js};
use retone_browser::{ContentScript, RewriteConfig, handle_background_message};

/// Key embedded by `build.rs` from `.env`, if one was present.
const EMBEDDED_API_KEY: Option<&str> = option_env!("RETONE_GEMINI_API_KEY");

thread_local! {
    static CONTENT: RefCell<Option<ContentScript>> = const { RefCell::new(None) };
}

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let filter = EnvFilter::new("info,retone=debug");
    let reg = Registry::default().with(filter).with(wasm_layer);

    let _ = set_global_default(reg);
}

/// Start the content script for this page. Idempotent.
#[wasm_bindgen(js_name = startContent)]
pub fn start_content() -> Result<(), JsError> {
    CONTENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            let script = ContentScript::start().map_err(|e| JsError::new(&e.to_string()))?;
            *slot = Some(script);
        }
        Ok(())
    })
}

/// Answer a runtime message in the background worker.
///
/// Resolves to the reply, or `undefined` when the message is not a rewrite
/// request and should be left for other listeners.
#[wasm_bindgen(js_name = handleBackgroundMessage)]
pub async fn handle_background(message: JsValue) -> JsValue {
    let config = RewriteConfig::default().with_api_key(EMBEDDED_API_KEY);
    match handle_background_message(config, from_js(message)).await {
        Some(reply) => to_js(&reply),
        None => JsValue::UNDEFINED,
    }
}
