//! The captured-selection model.
//!
//! A page context holds exactly one `SelectionState`. Capturing overwrites
//! the previous reference; replacing reads (and consumes) it. There is no
//! stack or history: the most recent capture always wins.

use crate::platform::SelectionHost;
use crate::types::SelectionRect;

/// Where to write text back later.
#[derive(Debug, Clone, Default)]
pub enum SelectionReference<F, S> {
    /// Nothing capturable was selected.
    #[default]
    None,
    /// A plain-text control, with UTF-16 offsets into its value at capture time.
    TextField { field: F, start: usize, end: usize },
    /// A frozen copy of a document range.
    Span(S),
}

impl<F, S> SelectionReference<F, S> {
    pub fn is_none(&self) -> bool {
        matches!(self, SelectionReference::None)
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionReference::None => "none",
            SelectionReference::TextField { .. } => "text-field",
            SelectionReference::Span(_) => "span",
        }
    }
}

/// Reference type for a given host.
pub type HostReference<H> =
    SelectionReference<<H as SelectionHost>::Field, <H as SelectionHost>::Span>;

/// Text returned by a capture, with the anchor rect for the inline surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    pub text: String,
    pub rect: Option<SelectionRect>,
}

impl Capture {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing worth rewriting (empty or whitespace).
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Single-writer selection state for one page context.
///
/// Owns the host handle, the last captured reference and its bounding rect.
/// `capture` lives in `tracker`, `replace` in `replace`.
pub struct SelectionState<H: SelectionHost> {
    pub(crate) host: H,
    pub(crate) last: HostReference<H>,
    pub(crate) last_rect: Option<SelectionRect>,
}

impl<H: SelectionHost> SelectionState<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            last: SelectionReference::None,
            last_rect: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The reference a replace would currently target.
    pub fn reference(&self) -> &HostReference<H> {
        &self.last
    }

    /// Bounding rect recorded at the last capture.
    pub fn last_rect(&self) -> Option<SelectionRect> {
        self.last_rect
    }

    /// Re-measure the captured span after scroll or resize.
    ///
    /// Ranges move with the content, so their live rect is re-read. Text
    /// fields keep the rect recorded at capture time.
    pub fn refresh_rect(&mut self) -> Option<SelectionRect> {
        if let SelectionReference::Span(span) = &self.last {
            if let Some(rect) = self.host.span_rect(span) {
                self.last_rect = Some(rect);
            }
        }
        self.last_rect
    }

    /// Drop the held reference.
    pub fn clear(&mut self) {
        self.last = SelectionReference::None;
        self.last_rect = None;
    }
}
