//! Per-page context: the selection state and the inline surface together.
//!
//! The content script owns exactly one `PageContext`. Page events and
//! incoming messages are routed through it so the surface's capture and
//! replace callbacks always hit the same selection state the popup sees.

use crate::platform::SelectionHost;
use crate::protocol::{NO_TEXT_PROVIDED, ReplaceReply, Request, Response, SelectionReply};
use crate::selection::SelectionState;
use crate::surface::{Effects, InlineSurface, SelectionTrigger};
use crate::types::{RewriteMode, Viewport};

pub struct PageContext<H: SelectionHost> {
    pub selection: SelectionState<H>,
    pub surface: InlineSurface,
}

impl<H: SelectionHost> PageContext<H> {
    pub fn new(host: H, enabled: bool, viewport: Viewport) -> Self {
        Self {
            selection: SelectionState::new(host),
            surface: InlineSurface::new(enabled, viewport),
        }
    }

    /// Answer a message addressed to this page.
    ///
    /// Returns the reply (if the message expects one) and whatever the
    /// surface needs done as a result.
    pub fn handle_message(&mut self, request: Request) -> (Option<Response>, Effects) {
        match request {
            Request::GetSelection => {
                let text = self.selection.capture().text;
                (Some(SelectionReply { text }.into()), Vec::new())
            }
            Request::ReplaceSelection { new_text: None } => {
                (Some(ReplaceReply::failed(NO_TEXT_PROVIDED).into()), Vec::new())
            }
            Request::ReplaceSelection {
                new_text: Some(text),
            } => {
                let result = self.selection.replace(&text).map(|_| ());
                if let Err(e) = &result {
                    tracing::info!(target: "retone::page", "replace request failed: {e}");
                }
                (Some(ReplaceReply::from(result).into()), Vec::new())
            }
            Request::InlineBubbleSettingChanged { enabled } => {
                tracing::debug!(target: "retone::page", enabled, "inline surface preference changed");
                (None, self.surface.set_enabled(enabled))
            }
            // Rewrites are for the background.
            Request::BubbleRewrite { .. } => (None, Vec::new()),
        }
    }

    pub fn on_selection_event(&mut self, trigger: SelectionTrigger) -> Effects {
        let selection = &mut self.selection;
        self.surface
            .on_selection_event(trigger, || selection.capture())
    }

    /// `keyup` anywhere on the page. Escape hides; any other key may have
    /// changed the selection.
    pub fn on_key_up(&mut self, key: &str) -> Effects {
        if key == "Escape" {
            return self.surface.on_escape();
        }
        self.on_selection_event(SelectionTrigger::KeyUp)
    }

    pub fn on_debounce_elapsed(&mut self) -> Effects {
        let selection = &mut self.selection;
        self.surface.on_debounce_elapsed(|| selection.capture())
    }

    pub fn on_rewrite_clicked(&mut self) -> Effects {
        self.surface.on_rewrite_clicked()
    }

    pub fn on_mode_selected(&mut self, mode: RewriteMode) -> Effects {
        self.surface.on_mode_selected(mode)
    }

    pub fn on_close(&mut self) -> Effects {
        self.surface.on_close()
    }

    pub fn on_hide_elapsed(&mut self) -> Effects {
        self.surface.on_hide_elapsed()
    }

    /// The background answered a rewrite. Success is written straight over
    /// the captured selection.
    pub fn on_rewrite_response(&mut self, outcome: Result<String, String>) -> Effects {
        let selection = &mut self.selection;
        self.surface
            .on_rewrite_response(outcome, |text| selection.replace(text).map(|_| ()))
    }

    pub fn on_viewport_change(&mut self, viewport: Viewport) -> Effects {
        let rect = if self.surface.state().is_shown() {
            self.selection.refresh_rect()
        } else {
            None
        };
        self.surface.on_viewport_change(viewport, rect)
    }

    pub fn teardown(&mut self) -> Effects {
        self.surface.teardown()
    }
}
