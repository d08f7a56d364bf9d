//! Selection replacement.
//!
//! Writes new text over the span captured by the most recent `capture()`.
//! Either the whole substitution applies or nothing is mutated.

use crate::error::ReplaceError;
use crate::platform::SelectionHost;
use crate::selection::{SelectionReference, SelectionState};
use crate::text::splice_utf16;

/// What a successful replacement touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    /// A text control; `caret` is the new cursor position in UTF-16 units.
    TextField { caret: usize },
    /// A document range; the live selection now sits after the new text node.
    Span,
}

impl<H: SelectionHost> SelectionState<H> {
    /// Replace the captured span with `new_text`.
    ///
    /// Fails with `NoSelection` when nothing is held. A text field that is no
    /// longer attached is reported as stale without touching it; range
    /// failures surface from the host as stale as well. On success the
    /// reference is consumed.
    pub fn replace(&mut self, new_text: &str) -> Result<Replaced, ReplaceError> {
        let replaced = match &self.last {
            SelectionReference::None => return Err(ReplaceError::NoSelection),
            SelectionReference::TextField { field, start, end } => {
                if !self.host.field_is_connected(field) {
                    tracing::debug!(
                        target: "retone::selection",
                        "captured field is detached, refusing to replace"
                    );
                    return Err(ReplaceError::Stale("text field detached".into()));
                }
                let value = self.host.field_value(field)?;
                let splice = splice_utf16(&value, *start, *end, new_text);
                self.host.write_field(field, &splice.value, splice.caret)?;
                Replaced::TextField {
                    caret: splice.caret,
                }
            }
            SelectionReference::Span(span) => {
                self.host.replace_span(span, new_text)?;
                Replaced::Span
            }
        };

        tracing::debug!(
            target: "retone::selection",
            ?replaced,
            chars = new_text.chars().count(),
            "replaced selection"
        );
        self.clear();
        Ok(replaced)
    }

    /// Boolean form of [`replace`](Self::replace), logging the failure.
    pub fn replace_ok(&mut self, new_text: &str) -> bool {
        match self.replace(new_text) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(target: "retone::selection", "replace failed: {e}");
                false
            }
        }
    }
}
