//! Selection capture.
//!
//! Reads whichever selection model is active (focused text control first,
//! then the document selection) and snapshots it into the page's
//! `SelectionState`.

use crate::platform::SelectionHost;
use crate::selection::{Capture, SelectionReference, SelectionState};
use crate::text::{slice_utf16, utf16_len};

impl<H: SelectionHost> SelectionState<H> {
    /// Snapshot the current selection, replacing any previous reference.
    ///
    /// Synchronous and idempotent: calling it twice with no selection change
    /// in between yields the same text and an equivalent reference.
    pub fn capture(&mut self) -> Capture {
        if let Some(snap) = self.host.focused_field() {
            let len = utf16_len(&snap.value);
            let end = snap.end.min(len);
            let start = snap.start.min(end);
            let text = slice_utf16(&snap.value, start, end).to_string();

            tracing::trace!(
                target: "retone::selection",
                start,
                end,
                chars = text.chars().count(),
                "captured text field selection"
            );

            self.last = SelectionReference::TextField {
                field: snap.field,
                start,
                end,
            };
            self.last_rect = snap.rect;
            return Capture {
                text,
                rect: snap.rect,
            };
        }

        if let Some(snap) = self.host.document_span() {
            tracing::trace!(
                target: "retone::selection",
                chars = snap.text.chars().count(),
                "captured document range"
            );

            self.last = SelectionReference::Span(snap.span);
            self.last_rect = snap.rect;
            return Capture {
                text: snap.text,
                rect: snap.rect,
            };
        }

        self.clear();
        Capture::empty()
    }
}
