//! Popup control surface.
//!
//! The popup reads the page selection, asks the background for rewrites and
//! pushes results back into the page. Every operation resolves to a status
//! line for the user. Channel failures (nobody listening) and application
//! failures (`ok: false`) always produce different messages.

use std::future::Future;

use serde_json::Value;

use crate::config::{PreferenceStore, Preferences, StoreError};
use crate::error::ChannelError;
use crate::platform::{ClipboardPlatform, PlatformError};
use crate::protocol::{
    NO_SELECTION_TO_REPLACE, REWRITE_FAILED, ReplaceReply, Request, RewriteReply, SelectionReply,
};
use crate::types::RewriteMode;

pub const STATUS_TABS_UNAVAILABLE: &str = "Chrome tabs API unavailable.";
pub const STATUS_NO_ACTIVE_TAB: &str = "No active tab found.";
pub const STATUS_READ_FAILED: &str = "Could not read selection on this page.";
pub const STATUS_NO_SELECTION: &str = "No selection detected.";
pub const STATUS_SELECT_FIRST: &str = "Please select some text first.";
pub const STATUS_IMPORTED: &str = "Selected text imported from page ✅";

pub const STATUS_NOTHING_TO_REPLACE: &str = "Rewrite something first.";
pub const STATUS_REPLACE_FAILED: &str = "Could not replace text on this page.";
pub const STATUS_REPLACED_ON_PAGE: &str = "Replaced selection on page ✅";

pub const STATUS_SERVICE_UNREACHABLE: &str =
    "Could not reach the rewrite service. Please try again.";

/// How long the popup keeps showing "copied" after a copy.
pub const COPIED_RESET_MS: u32 = 1500;

/// How the popup reaches other contexts.
pub trait TabTransport {
    /// Send to the content script of the focused tab and wait for its reply.
    fn send_to_active_tab(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Value, ChannelError>>;

    /// Send to the background context and wait for its reply.
    fn send_to_runtime(&self, request: Request)
    -> impl Future<Output = Result<Value, ChannelError>>;

    /// Fire-and-forget to every tab. Tabs without a listener are skipped.
    fn broadcast_to_tabs(&self, request: Request) -> impl Future<Output = ()>;
}

/// Result of importing the page selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub text: Option<String>,
    pub status: &'static str,
}

impl SelectionOutcome {
    fn failed(status: &'static str) -> Self {
        Self { text: None, status }
    }
}

/// Result of pushing text back into the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub ok: bool,
    pub status: String,
}

impl ReplaceOutcome {
    fn failed(status: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: status.into(),
        }
    }
}

fn channel_status(err: &ChannelError, unreachable: &'static str) -> &'static str {
    match err {
        ChannelError::Unavailable => STATUS_TABS_UNAVAILABLE,
        ChannelError::NoActiveTab => STATUS_NO_ACTIVE_TAB,
        ChannelError::Unreachable(_) => unreachable,
    }
}

pub struct ControlSurface<T, P> {
    transport: T,
    store: P,
}

impl<T: TabTransport, P: PreferenceStore> ControlSurface<T, P> {
    pub fn new(transport: T, store: P) -> Self {
        Self { transport, store }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Import the active tab's selection.
    pub async fn use_page_selection(&self) -> SelectionOutcome {
        let reply = match self.transport.send_to_active_tab(Request::GetSelection).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(target: "retone::control", "get selection failed: {e}");
                return SelectionOutcome::failed(channel_status(&e, STATUS_READ_FAILED));
            }
        };

        let Ok(SelectionReply { text }) = serde_json::from_value::<SelectionReply>(reply) else {
            return SelectionOutcome::failed(STATUS_NO_SELECTION);
        };
        if text.trim().is_empty() {
            return SelectionOutcome::failed(STATUS_SELECT_FIRST);
        }

        SelectionOutcome {
            text: Some(text),
            status: STATUS_IMPORTED,
        }
    }

    /// Write `text` over the selection the page captured last.
    pub async fn replace_selection(&self, text: &str) -> ReplaceOutcome {
        if text.trim().is_empty() {
            return ReplaceOutcome::failed(STATUS_NOTHING_TO_REPLACE);
        }

        let reply = match self.transport.send_to_active_tab(Request::replace(text)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(target: "retone::control", "replace failed: {e}");
                return ReplaceOutcome::failed(channel_status(&e, STATUS_REPLACE_FAILED));
            }
        };

        match serde_json::from_value::<ReplaceReply>(reply) {
            Ok(ReplaceReply { ok: true, .. }) => ReplaceOutcome {
                ok: true,
                status: STATUS_REPLACED_ON_PAGE.to_string(),
            },
            Ok(ReplaceReply {
                error: Some(error), ..
            }) if !error.is_empty() => ReplaceOutcome::failed(error),
            _ => ReplaceOutcome::failed(NO_SELECTION_TO_REPLACE),
        }
    }

    /// Rewrite through the background mediator. Blank input is a no-op
    /// and yields `None`.
    pub async fn rewrite(&self, text: &str, mode: RewriteMode) -> Option<Result<String, String>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let reply = match self.transport.send_to_runtime(Request::rewrite(text, mode)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(target: "retone::control", "rewrite channel failed: {e}");
                return Some(Err(STATUS_SERVICE_UNREACHABLE.to_string()));
            }
        };

        let reply = serde_json::from_value::<RewriteReply>(reply)
            .unwrap_or_else(|_| RewriteReply::failed(REWRITE_FAILED));
        Some(reply.into_result())
    }

    /// Read the stored preference. Storage failures fall back to the default.
    pub async fn load_inline_enabled(&self) -> bool {
        match self.store.load().await {
            Ok(prefs) => prefs.inline_bubble_enabled,
            Err(e) => {
                tracing::warn!(target: "retone::control", "{e}");
                Preferences::default().inline_bubble_enabled
            }
        }
    }

    /// Persist the preference, then tell every page about it.
    pub async fn set_inline_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.store
            .save(&Preferences {
                inline_bubble_enabled: enabled,
            })
            .await?;
        self.transport
            .broadcast_to_tabs(Request::InlineBubbleSettingChanged { enabled })
            .await;
        tracing::debug!(target: "retone::control", enabled, "inline surface preference saved");
        Ok(())
    }
}

/// Copy the rewritten output to the clipboard.
///
/// Blank output is skipped and resolves to `Ok(false)` without touching the
/// clipboard; `Ok(true)` means the text was written.
pub async fn copy_output<C: ClipboardPlatform>(
    clipboard: &C,
    output: &str,
) -> Result<bool, PlatformError> {
    if output.trim().is_empty() {
        return Ok(false);
    }
    clipboard.write_text(output).await?;
    tracing::debug!(target: "retone::control", chars = output.chars().count(), "output copied");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeTransport {
        tab_reply: RefCell<Option<Result<Value, ChannelError>>>,
        runtime_reply: RefCell<Option<Result<Value, ChannelError>>>,
        sent: RefCell<Vec<Request>>,
        broadcasts: RefCell<Vec<Request>>,
    }

    impl FakeTransport {
        fn tab(reply: Result<Value, ChannelError>) -> Self {
            let t = Self::default();
            *t.tab_reply.borrow_mut() = Some(reply);
            t
        }

        fn runtime(reply: Result<Value, ChannelError>) -> Self {
            let t = Self::default();
            *t.runtime_reply.borrow_mut() = Some(reply);
            t
        }
    }

    impl TabTransport for FakeTransport {
        async fn send_to_active_tab(&self, request: Request) -> Result<Value, ChannelError> {
            self.sent.borrow_mut().push(request);
            self.tab_reply
                .borrow_mut()
                .take()
                .unwrap_or(Err(ChannelError::NoActiveTab))
        }

        async fn send_to_runtime(&self, request: Request) -> Result<Value, ChannelError> {
            self.sent.borrow_mut().push(request);
            self.runtime_reply
                .borrow_mut()
                .take()
                .unwrap_or(Err(ChannelError::Unavailable))
        }

        async fn broadcast_to_tabs(&self, request: Request) {
            self.broadcasts.borrow_mut().push(request);
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Cell<Option<Preferences>>,
        fail: bool,
    }

    impl PreferenceStore for MemoryStore {
        async fn load(&self) -> Result<Preferences, StoreError> {
            if self.fail {
                return Err(StoreError("sync storage unavailable".into()));
            }
            Ok(self.saved.get().unwrap_or_default())
        }

        async fn save(&self, prefs: &Preferences) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError("quota".into()));
            }
            self.saved.set(Some(*prefs));
            Ok(())
        }
    }

    fn control(transport: FakeTransport) -> ControlSurface<FakeTransport, MemoryStore> {
        ControlSurface::new(transport, MemoryStore::default())
    }

    #[tokio::test]
    async fn test_selection_imported() {
        let surface = control(FakeTransport::tab(Ok(json!({ "text": "hello world" }))));
        let outcome = surface.use_page_selection().await;
        assert_eq!(outcome.text.as_deref(), Some("hello world"));
        assert_eq!(outcome.status, STATUS_IMPORTED);
        assert_eq!(surface.transport().sent.borrow()[0], Request::GetSelection);
    }

    #[tokio::test]
    async fn test_empty_selection_asks_to_select() {
        let surface = control(FakeTransport::tab(Ok(json!({ "text": "" }))));
        assert_eq!(
            surface.use_page_selection().await,
            SelectionOutcome::failed(STATUS_SELECT_FIRST)
        );
    }

    #[tokio::test]
    async fn test_selection_failures_are_distinct() {
        let cases = [
            (Err(ChannelError::Unavailable), STATUS_TABS_UNAVAILABLE),
            (Err(ChannelError::NoActiveTab), STATUS_NO_ACTIVE_TAB),
            (
                Err(ChannelError::Unreachable("Receiving end does not exist.".into())),
                STATUS_READ_FAILED,
            ),
            (Ok(Value::Null), STATUS_NO_SELECTION),
            (Ok(json!({ "text": 3 })), STATUS_NO_SELECTION),
        ];
        for (reply, status) in cases {
            let surface = control(FakeTransport::tab(reply));
            assert_eq!(surface.use_page_selection().await.status, status);
        }
    }

    #[tokio::test]
    async fn test_replace_success() {
        let surface = control(FakeTransport::tab(Ok(json!({ "ok": true }))));
        let outcome = surface.replace_selection("hi world").await;
        assert!(outcome.ok);
        assert_eq!(outcome.status, STATUS_REPLACED_ON_PAGE);
        assert_eq!(surface.transport().sent.borrow()[0], Request::replace("hi world"));
    }

    #[tokio::test]
    async fn test_replace_blank_skips_page() {
        let surface = control(FakeTransport::default());
        assert_eq!(
            surface.replace_selection("  ").await,
            ReplaceOutcome::failed(STATUS_NOTHING_TO_REPLACE)
        );
        assert!(surface.transport().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_replace_page_error_vs_channel_error() {
        let surface = control(FakeTransport::tab(Ok(
            json!({ "ok": false, "error": "The selected text is no longer on the page." }),
        )));
        assert_eq!(
            surface.replace_selection("x").await.status,
            "The selected text is no longer on the page."
        );

        let surface = control(FakeTransport::tab(Ok(json!({ "ok": false }))));
        assert_eq!(
            surface.replace_selection("x").await.status,
            NO_SELECTION_TO_REPLACE
        );

        let surface = control(FakeTransport::tab(Err(ChannelError::Unreachable(
            "closed".into(),
        ))));
        assert_eq!(
            surface.replace_selection("x").await.status,
            STATUS_REPLACE_FAILED
        );
    }

    #[tokio::test]
    async fn test_rewrite_through_runtime() {
        let surface = control(FakeTransport::runtime(Ok(
            json!({ "ok": true, "result": "Hi there." }),
        )));
        let result = surface.rewrite("  hey there  ", RewriteMode::Formal).await;
        assert_eq!(result, Some(Ok("Hi there.".into())));
        assert_eq!(
            surface.transport().sent.borrow()[0],
            Request::rewrite("hey there", RewriteMode::Formal)
        );
    }

    #[tokio::test]
    async fn test_rewrite_failures() {
        let surface = control(FakeTransport::default());
        assert_eq!(surface.rewrite(" ", RewriteMode::Fix).await, None);
        assert!(surface.transport().sent.borrow().is_empty());

        let surface = control(FakeTransport::runtime(Ok(
            json!({ "ok": false, "error": "Empty response from Gemini." }),
        )));
        assert_eq!(
            surface.rewrite("x", RewriteMode::Fix).await,
            Some(Err("Empty response from Gemini.".into()))
        );

        let surface = control(FakeTransport::runtime(Err(ChannelError::Unreachable(
            "no listener".into(),
        ))));
        assert_eq!(
            surface.rewrite("x", RewriteMode::Fix).await,
            Some(Err(STATUS_SERVICE_UNREACHABLE.into()))
        );
    }

    #[tokio::test]
    async fn test_toggle_saves_then_broadcasts() {
        let surface = control(FakeTransport::default());
        assert!(surface.load_inline_enabled().await);

        surface.set_inline_enabled(false).await.unwrap();
        assert!(!surface.load_inline_enabled().await);
        assert_eq!(
            surface.transport().broadcasts.borrow().as_slice(),
            &[Request::InlineBubbleSettingChanged { enabled: false }]
        );
    }

    #[tokio::test]
    async fn test_toggle_save_failure_skips_broadcast() {
        let surface = ControlSurface::new(
            FakeTransport::default(),
            MemoryStore {
                fail: true,
                ..Default::default()
            },
        );
        assert!(surface.set_inline_enabled(false).await.is_err());
        assert!(surface.transport().broadcasts.borrow().is_empty());
        // unreadable storage still defaults to enabled
        assert!(surface.load_inline_enabled().await);
    }

    #[derive(Default)]
    struct FakeClipboard {
        written: RefCell<Vec<String>>,
        fail: bool,
    }

    impl ClipboardPlatform for FakeClipboard {
        async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
            if self.fail {
                return Err("Document is not focused.".into());
            }
            self.written.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn copy_skips_blank_output() {
        let clipboard = FakeClipboard::default();
        assert_eq!(copy_output(&clipboard, "").await, Ok(false));
        assert_eq!(copy_output(&clipboard, "  \n\t").await, Ok(false));
        assert!(clipboard.written.borrow().is_empty());
    }

    #[tokio::test]
    async fn copy_writes_output_untrimmed() {
        let clipboard = FakeClipboard::default();
        assert_eq!(copy_output(&clipboard, " hi world\n").await, Ok(true));
        assert_eq!(*clipboard.written.borrow(), vec![" hi world\n".to_string()]);
    }

    #[tokio::test]
    async fn copy_failure_propagates() {
        let clipboard = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(copy_output(&clipboard, "text").await.is_err());
    }
}
