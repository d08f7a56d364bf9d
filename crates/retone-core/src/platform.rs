//! Platform abstraction traits for selection capture and replacement.
//!
//! These traits define the interface between the selection logic and the
//! host page. The browser implementation reads the focused control and the
//! document `Selection`; tests use an in-memory document. Keeping the
//! slicing and bookkeeping here means the same logic runs everywhere.

use std::future::Future;

use crate::types::SelectionRect;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Snapshot of a focused plain-text control (`<input>` or `<textarea>`).
#[derive(Debug, Clone)]
pub struct FieldSnapshot<F> {
    /// Handle to the control, kept so the replacement can target it later.
    pub field: F,
    /// Full value at capture time.
    pub value: String,
    /// `selectionStart`, in UTF-16 code units.
    pub start: usize,
    /// `selectionEnd`, in UTF-16 code units.
    pub end: usize,
    /// Bounding rect of the control, viewport-relative.
    pub rect: Option<SelectionRect>,
}

/// Snapshot of the first range of the document selection.
#[derive(Debug, Clone)]
pub struct SpanSnapshot<S> {
    /// Frozen copy of the range. Must not alias the live selection range.
    pub span: S,
    /// Text content of the selection.
    pub text: String,
    /// Bounding rect of the range, viewport-relative.
    pub rect: Option<SelectionRect>,
}

/// Host page operations needed to capture and replace a selection.
///
/// Implementations handle the two selection models the extension supports:
/// plain-text controls (value + offsets) and document ranges. Anything else
/// (iframes, shadow-internal selections, custom editors) should surface as
/// "nothing selected" by returning `None` from both snapshot methods.
pub trait SelectionHost {
    /// Handle to a plain-text control.
    type Field: Clone;
    /// Frozen range descriptor, detached from the live selection.
    type Span: Clone;

    /// The focused plain-text control, if the active element is one.
    fn focused_field(&self) -> Option<FieldSnapshot<Self::Field>>;

    /// Clone the first range of the document selection, if any.
    fn document_span(&self) -> Option<SpanSnapshot<Self::Span>>;

    /// Whether the control is still attached to the document.
    fn field_is_connected(&self, field: &Self::Field) -> bool;

    /// Current value of the control.
    fn field_value(&self, field: &Self::Field) -> Result<String, PlatformError>;

    /// Assign a new value, place the caret at `caret` (UTF-16 units) and
    /// notify listeners with a bubbling `input` event.
    fn write_field(
        &self,
        field: &Self::Field,
        value: &str,
        caret: usize,
    ) -> Result<(), PlatformError>;

    /// Current bounding rect of a captured range.
    fn span_rect(&self, span: &Self::Span) -> Option<SelectionRect>;

    /// Delete the range's contents, insert `text` as a new text node and
    /// collapse the live selection to a caret just after it.
    fn replace_span(&self, span: &Self::Span, text: &str) -> Result<(), PlatformError>;
}

/// Clipboard access for the popup.
pub trait ClipboardPlatform {
    /// Write plain text to the system clipboard.
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), PlatformError>>;
}
