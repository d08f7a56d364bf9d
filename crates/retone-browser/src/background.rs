//! Background (service worker) handling for the rewrite mediator.
//!
//! The `chrome.runtime.onMessage` listener lives in the worker's JS loader:
//! it has to be registered synchronously during the first evaluation of the
//! worker script, before the WASM module has finished instantiating, or the
//! message that woke the worker is lost. The loader keeps the channel open,
//! waits for the module and hands the message to
//! [`handle_background_message`].

use serde_json::Value;

use retone_core::{GeminiRewriter, Mediator, Request, RewriteConfig};

use crate::transport::load_rewrite_config;

/// Answer one runtime message. Resolves to `None` for messages the mediator
/// does not own, so the caller can leave them unanswered.
///
/// Stored overrides are read per request, so a key saved while the worker
/// is alive takes effect immediately.
pub async fn handle_background_message(base: RewriteConfig, message: Value) -> Option<Value> {
    let request = Request::from_value(&message)?;
    if !Mediator::<GeminiRewriter>::accepts(&request) {
        tracing::trace!(target: "retone::background", ?request, "not ours");
        return None;
    }

    let config = load_rewrite_config(base).await;
    let mediator = Mediator::new(GeminiRewriter::new(config));
    let reply = mediator.handle(request).await?;
    Some(reply.to_value())
}
