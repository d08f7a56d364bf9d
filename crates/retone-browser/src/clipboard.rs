//! Browser clipboard implementation.
//!
//! Implements `ClipboardPlatform` with the async Clipboard API
//! (`navigator.clipboard.writeText`). Extension pages are allowed to write
//! without a clipboard event.

use wasm_bindgen_futures::JsFuture;

use retone_core::{ClipboardPlatform, PlatformError};

use crate::host::js_err;

/// `navigator.clipboard` for the current window.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClipboard;

impl ClipboardPlatform for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        let window = web_sys::window().ok_or_else(|| PlatformError::from("no window"))?;
        let clipboard = window.navigator().clipboard();
        JsFuture::from(clipboard.write_text(text))
            .await
            .map_err(js_err)?;
        Ok(())
    }
}
