//! PopupController - the popup's bridge to the page and the background.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use retone_browser::control::COPIED_RESET_MS;
use retone_browser::surface::STATUS_REWRITING;
use retone_browser::{
    BrowserClipboard, ChromeStore, ChromeTransport, ControlSurface, RewriteMode, TimerSlot,
    copy_output,
};

use crate::types::{JsModeOption, JsReplaceOutcome, JsRewriteOutcome, JsSelectionOutcome};

type Control = ControlSurface<ChromeTransport, ChromeStore>;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

/// "Copied" feedback for the output box. Dropping it cancels the pending
/// reset, so a closed popup leaves no timer behind.
#[derive(Default)]
struct CopyIndicator {
    copied: Cell<bool>,
    reset: RefCell<TimerSlot>,
    on_change: RefCell<Option<Function>>,
}

impl CopyIndicator {
    fn set(&self, copied: bool) {
        self.copied.set(copied);
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(copied)) {
                tracing::debug!(target: "retone::popup", "copied callback threw: {e:?}");
            }
        }
    }

    fn flash(self: &Rc<Self>) {
        self.set(true);
        let weak = Rc::downgrade(self);
        self.reset.borrow_mut().arm(COPIED_RESET_MS, move || {
            if let Some(indicator) = weak.upgrade() {
                indicator.set(false);
            }
        });
    }
}

/// Popup control surface exposed to JavaScript.
///
/// Every method returns a promise so the popup UI can await it. Status
/// strings are ready to show as-is.
#[wasm_bindgen]
pub struct PopupController {
    control: Rc<Control>,
    copy: Rc<CopyIndicator>,
}

#[wasm_bindgen]
impl PopupController {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            control: Rc::new(ControlSurface::new(ChromeTransport, ChromeStore)),
            copy: Rc::new(CopyIndicator::default()),
        }
    }

    /// Modes in display order, as `{ value, label }`.
    pub fn modes() -> Result<JsValue, JsError> {
        let modes: Vec<JsModeOption> = RewriteMode::ALL.into_iter().map(Into::into).collect();
        serde_wasm_bindgen::to_value(&modes).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Status line shown while a rewrite is in flight, shared with the
    /// inline surface.
    #[wasm_bindgen(js_name = rewritingStatus)]
    pub fn rewriting_status() -> String {
        STATUS_REWRITING.to_string()
    }

    /// Import the active tab's selection. Resolves to `JsSelectionOutcome`.
    #[wasm_bindgen(js_name = usePageSelection)]
    pub fn use_page_selection(&self) -> Promise {
        let control = self.control.clone();
        future_to_promise(async move {
            let outcome = control.use_page_selection().await;
            to_js(&JsSelectionOutcome::from(outcome))
        })
    }

    /// Write `text` over the page's captured selection. Resolves to
    /// `JsReplaceOutcome`.
    #[wasm_bindgen(js_name = replaceSelection)]
    pub fn replace_selection(&self, text: String) -> Promise {
        let control = self.control.clone();
        future_to_promise(async move {
            let outcome = control.replace_selection(&text).await;
            to_js(&JsReplaceOutcome::from(outcome))
        })
    }

    /// Rewrite `text` in `mode` through the background. Resolves to
    /// `JsRewriteOutcome`; rejects on an unknown mode.
    pub fn rewrite(&self, text: String, mode: &str) -> Result<Promise, JsError> {
        let mode: RewriteMode = mode.parse().map_err(|e| JsError::new(&format!("{e}")))?;
        let control = self.control.clone();
        Ok(future_to_promise(async move {
            let outcome = control.rewrite(&text, mode).await;
            to_js(&JsRewriteOutcome::from(outcome))
        }))
    }

    /// Copy the rewritten output. Resolves to `true` when something was
    /// copied; blank output and clipboard failures resolve to `false`.
    /// The copied flag resets after a short delay.
    #[wasm_bindgen(js_name = copyOutput)]
    pub fn copy_output(&self, output: String) -> Promise {
        let copy = self.copy.clone();
        future_to_promise(async move {
            let copied = match copy_output(&BrowserClipboard, &output).await {
                Ok(copied) => copied,
                Err(e) => {
                    tracing::warn!(target: "retone::popup", "failed to copy rewritten text: {e}");
                    false
                }
            };
            if copied {
                copy.flash();
            }
            Ok(JsValue::from_bool(copied))
        })
    }

    /// Whether the "copied" feedback is currently showing.
    #[wasm_bindgen(getter)]
    pub fn copied(&self) -> bool {
        self.copy.copied.get()
    }

    /// Register `callback(copied: boolean)`, called whenever the copied
    /// flag changes.
    #[wasm_bindgen(js_name = onCopiedChange)]
    pub fn on_copied_change(&self, callback: Function) {
        *self.copy.on_change.borrow_mut() = Some(callback);
    }

    /// Resolves to the stored inline surface preference.
    #[wasm_bindgen(js_name = loadInlineEnabled)]
    pub fn load_inline_enabled(&self) -> Promise {
        let control = self.control.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(control.load_inline_enabled().await)) })
    }

    /// Persist the preference and notify every open page.
    #[wasm_bindgen(js_name = setInlineEnabled)]
    pub fn set_inline_enabled(&self, enabled: bool) -> Promise {
        let control = self.control.clone();
        future_to_promise(async move {
            control
                .set_inline_enabled(enabled)
                .await
                .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;
            Ok(JsValue::UNDEFINED)
        })
    }
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}
