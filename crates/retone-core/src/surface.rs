//! Inline suggestion surface state machine.
//!
//! The bubble that appears next to a page selection. Every transition mutates
//! the single `BubbleState` and returns the side effects the platform layer
//! has to carry out (re-render, arm or cancel a timer, send a rewrite
//! request). Nothing here touches the DOM or the clock, so the whole
//! lifecycle can be driven from tests.
//!
//! # Lifecycle
//!
//! ```text
//! hidden ─select─▶ analyzing ─300ms─▶ ready ─click─▶ ready+loading
//!    ▲                 │                ▲                │
//!    └──── empty ──────┘                └── error/stale ─┤
//!    └──────────── 1.5s ◀── replaced ◀──── success ──────┘
//! ```

use smol_str::SmolStr;

use crate::error::ReplaceError;
use crate::selection::Capture;
use crate::text::truncate_snippet;
use crate::types::{RewriteMode, SelectionRect, Viewport};

/// Quiet period after the last selection event before the bubble shows.
pub const DEBOUNCE_MS: u32 = 300;
/// How long the "replaced" confirmation stays up.
pub const REPLACED_HIDE_MS: u32 = 1500;
/// Preview length in the bubble, in UTF-16 units.
pub const SNIPPET_MAX_UNITS: usize = 160;

pub const BUBBLE_WIDTH: f64 = 320.0;
/// Used to decide whether the bubble fits below the selection.
pub const BUBBLE_HEIGHT: f64 = 180.0;
pub const SPINNER_SIZE: f64 = 28.0;
pub const ANCHOR_GAP: f64 = 8.0;
pub const VIEWPORT_MARGIN: f64 = 8.0;

pub const STATUS_REWRITING: &str = "Rewriting…";
pub const STATUS_REPLACED: &str = "Replaced ✅";
pub const STATUS_RESELECT: &str = "Could not replace. Please reselect the text and try again.";

/// Which face of the surface is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BubblePhase {
    #[default]
    Hidden,
    /// Spinner while the selection settles.
    Analyzing,
    /// Full bubble, rewrite available (or in flight when `loading`).
    Ready,
    /// Rewrite applied; hides itself after [`REPLACED_HIDE_MS`].
    Replaced,
}

/// View-model for the surface. Re-rendered in full after every change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BubbleState {
    pub phase: BubblePhase,
    /// A rewrite request is outstanding.
    pub loading: bool,
    pub status: Option<SmolStr>,
    pub error: Option<String>,
    pub mode: RewriteMode,
    /// Truncated preview of the captured text.
    pub snippet: String,
    pub top: f64,
    pub left: f64,
}

impl BubbleState {
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, BubblePhase::Ready | BubblePhase::Replaced)
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == BubblePhase::Analyzing
    }

    /// Visible in any form, spinner included.
    pub fn is_shown(&self) -> bool {
        self.phase != BubblePhase::Hidden
    }
}

/// Page event that may change the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionTrigger {
    MouseUp,
    /// Any key other than Escape.
    KeyUp,
    SelectionChange,
}

impl SelectionTrigger {
    /// Whether an empty selection after this event hides the surface even
    /// when nothing is showing yet.
    pub fn forces_hide(self) -> bool {
        matches!(self, SelectionTrigger::MouseUp)
    }
}

/// Work for the platform layer.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEffect {
    /// Re-render the surface from the current state.
    Render,
    /// Cancel any pending debounce timer and start a new one.
    ArmDebounce(u32),
    CancelDebounce,
    /// Cancel any pending hide timer and start a new one.
    ArmHide(u32),
    CancelHide,
    /// Send a rewrite request to the background mediator.
    RequestRewrite { text: String, mode: RewriteMode },
}

pub type Effects = Vec<SurfaceEffect>;

/// Compute the viewport-relative top/left for the surface.
///
/// Places it below the selection, flips above when it would overflow the
/// bottom edge and clamps horizontally into the viewport.
pub fn anchor_position(rect: SelectionRect, viewport: Viewport, phase: BubblePhase) -> (f64, f64) {
    let (width, height) = match phase {
        BubblePhase::Analyzing => (SPINNER_SIZE, SPINNER_SIZE),
        _ => (BUBBLE_WIDTH, BUBBLE_HEIGHT),
    };

    let below = rect.bottom() + ANCHOR_GAP;
    let top = if below + height <= viewport.height - VIEWPORT_MARGIN {
        below
    } else {
        let above = rect.y - ANCHOR_GAP - height;
        if above >= VIEWPORT_MARGIN {
            above
        } else {
            (viewport.height - VIEWPORT_MARGIN - height).max(VIEWPORT_MARGIN)
        }
    };

    let max_left = (viewport.width - VIEWPORT_MARGIN - width).max(VIEWPORT_MARGIN);
    let left = rect.x.clamp(VIEWPORT_MARGIN, max_left);

    (top, left)
}

/// The surface state machine for one page context.
#[derive(Debug)]
pub struct InlineSurface {
    state: BubbleState,
    enabled: bool,
    /// Full captured text; `state.snippet` is only the preview.
    text: String,
    anchor: Option<SelectionRect>,
    viewport: Viewport,
}

impl InlineSurface {
    pub fn new(enabled: bool, viewport: Viewport) -> Self {
        Self {
            state: BubbleState::default(),
            enabled,
            text: String::new(),
            anchor: None,
            viewport,
        }
    }

    pub fn state(&self) -> &BubbleState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Text that a rewrite would send.
    pub fn captured_text(&self) -> &str {
        &self.text
    }

    /// A page event that may have changed the selection.
    ///
    /// `capture` re-runs the selection tracker; it is only invoked when the
    /// surface is enabled and not waiting on a rewrite, so a suppressed event
    /// never overwrites the held reference.
    pub fn on_selection_event(
        &mut self,
        trigger: SelectionTrigger,
        capture: impl FnOnce() -> Capture,
    ) -> Effects {
        if !self.enabled || self.state.loading || self.state.phase == BubblePhase::Replaced {
            return Vec::new();
        }

        let captured = capture();
        if !captured.is_blank() {
            if captured.rect.is_some() {
                self.anchor = captured.rect;
            }
            self.state.phase = BubblePhase::Analyzing;
            self.state.status = None;
            self.state.error = None;
            self.reposition();
            tracing::trace!(target: "retone::surface", ?trigger, "selection settling");
            return vec![SurfaceEffect::ArmDebounce(DEBOUNCE_MS), SurfaceEffect::Render];
        }

        if trigger.forces_hide() || self.state.is_shown() {
            return self.hide();
        }
        Vec::new()
    }

    /// The debounce timer fired.
    pub fn on_debounce_elapsed(&mut self, capture: impl FnOnce() -> Capture) -> Effects {
        if !self.enabled || self.state.loading || self.state.phase != BubblePhase::Analyzing {
            return Vec::new();
        }

        let captured = capture();
        if captured.is_blank() {
            return self.hide();
        }

        if captured.rect.is_some() {
            self.anchor = captured.rect;
        }
        self.state.phase = BubblePhase::Ready;
        self.state.snippet = truncate_snippet(&captured.text, SNIPPET_MAX_UNITS);
        self.state.status = None;
        self.state.error = None;
        self.text = captured.text;
        self.reposition();
        tracing::debug!(
            target: "retone::surface",
            chars = self.text.chars().count(),
            "showing inline surface"
        );
        vec![SurfaceEffect::Render]
    }

    /// Escape pressed: hide no matter what.
    pub fn on_escape(&mut self) -> Effects {
        self.hide()
    }

    /// Close button in the surface.
    pub fn on_close(&mut self) -> Effects {
        self.hide()
    }

    pub fn on_mode_selected(&mut self, mode: RewriteMode) -> Effects {
        if self.state.loading || self.state.mode == mode {
            return Vec::new();
        }
        self.state.mode = mode;
        if self.state.is_visible() {
            vec![SurfaceEffect::Render]
        } else {
            Vec::new()
        }
    }

    /// Rewrite button pressed.
    pub fn on_rewrite_clicked(&mut self) -> Effects {
        if self.state.phase != BubblePhase::Ready || self.state.loading || self.text.trim().is_empty()
        {
            return Vec::new();
        }

        self.state.loading = true;
        self.state.status = Some(SmolStr::new_static(STATUS_REWRITING));
        self.state.error = None;
        tracing::debug!(target: "retone::surface", mode = %self.state.mode, "requesting rewrite");
        vec![
            SurfaceEffect::Render,
            SurfaceEffect::RequestRewrite {
                text: self.text.clone(),
                mode: self.state.mode,
            },
        ]
    }

    /// The rewrite request finished.
    ///
    /// `outcome` carries the rewritten text or a user-facing error message.
    /// On success `replace` writes the text into the page.
    pub fn on_rewrite_response(
        &mut self,
        outcome: Result<String, String>,
        replace: impl FnOnce(&str) -> Result<(), ReplaceError>,
    ) -> Effects {
        if !self.state.loading {
            tracing::warn!(target: "retone::surface", "rewrite response with no request outstanding");
            return Vec::new();
        }
        self.state.loading = false;

        if self.state.phase != BubblePhase::Ready {
            // Dismissed while waiting; leave the page alone.
            tracing::debug!(target: "retone::surface", "dropping rewrite for dismissed surface");
            return Vec::new();
        }

        match outcome {
            Ok(result) => match replace(&result) {
                Ok(()) => {
                    self.state.phase = BubblePhase::Replaced;
                    self.state.status = Some(SmolStr::new_static(STATUS_REPLACED));
                    self.state.error = None;
                    vec![
                        SurfaceEffect::Render,
                        SurfaceEffect::ArmHide(REPLACED_HIDE_MS),
                    ]
                }
                Err(e) => {
                    tracing::info!(target: "retone::surface", "replace failed: {e}");
                    self.state.status = Some(SmolStr::new_static(STATUS_RESELECT));
                    self.state.error = None;
                    vec![SurfaceEffect::Render]
                }
            },
            Err(message) => {
                self.state.status = None;
                self.state.error = Some(message);
                vec![SurfaceEffect::Render]
            }
        }
    }

    /// The post-replace hide timer fired.
    pub fn on_hide_elapsed(&mut self) -> Effects {
        if self.state.phase != BubblePhase::Replaced {
            return Vec::new();
        }
        self.hide()
    }

    /// Scroll or resize. Only the position changes.
    pub fn on_viewport_change(
        &mut self,
        viewport: Viewport,
        rect: Option<SelectionRect>,
    ) -> Effects {
        self.viewport = viewport;
        if !self.state.is_shown() {
            return Vec::new();
        }
        if rect.is_some() {
            self.anchor = rect;
        }
        self.reposition();
        vec![SurfaceEffect::Render]
    }

    /// Preference flag changed.
    pub fn set_enabled(&mut self, enabled: bool) -> Effects {
        self.enabled = enabled;
        if enabled {
            return Vec::new();
        }
        if self.state.is_shown() {
            self.hide()
        } else {
            vec![SurfaceEffect::CancelDebounce]
        }
    }

    /// Page unload: cancel every timer.
    pub fn teardown(&mut self) -> Effects {
        self.state.phase = BubblePhase::Hidden;
        vec![SurfaceEffect::CancelDebounce, SurfaceEffect::CancelHide]
    }

    fn hide(&mut self) -> Effects {
        self.state.phase = BubblePhase::Hidden;
        self.state.status = None;
        self.state.error = None;
        self.state.snippet.clear();
        self.text.clear();
        vec![
            SurfaceEffect::CancelDebounce,
            SurfaceEffect::CancelHide,
            SurfaceEffect::Render,
        ]
    }

    fn reposition(&mut self) {
        let Some(rect) = self.anchor else {
            self.state.top = VIEWPORT_MARGIN;
            self.state.left = VIEWPORT_MARGIN;
            return;
        };
        let (top, left) = anchor_position(rect, self.viewport, self.state.phase);
        self.state.top = top;
        self.state.left = left;
    }
}
