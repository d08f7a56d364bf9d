//! In-memory page used by unit tests.
//!
//! Models the two selection surfaces: a list of plain-text fields (one of
//! which may be focused) and a single flat text document with an optional
//! selection. Re-rendering the document bumps a generation counter, which
//! makes previously captured spans stale.

use std::cell::RefCell;
use std::rc::Rc;

use crate::platform::{FieldSnapshot, PlatformError, SelectionHost, SpanSnapshot};
use crate::text::utf16_len;
use crate::types::SelectionRect;

#[derive(Debug, Clone)]
struct MockField {
    value: String,
    start: usize,
    end: usize,
    connected: bool,
    input_events: usize,
}

#[derive(Debug, Default)]
struct Inner {
    fields: Vec<MockField>,
    focused: Option<usize>,
    document: String,
    generation: u32,
    selection: Option<(usize, usize)>,
}

/// Frozen span over the mock document, in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSpan {
    start: usize,
    end: usize,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    inner: Rc<RefCell<Inner>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(text: &str) -> Self {
        let page = Self::new();
        page.inner.borrow_mut().document = text.to_string();
        page
    }

    pub fn field_rect(index: usize) -> SelectionRect {
        SelectionRect::new(10.0, 100.0 + index as f64 * 40.0, 200.0, 30.0)
    }

    pub fn add_field(&self, value: &str) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.fields.push(MockField {
            value: value.to_string(),
            start: 0,
            end: 0,
            connected: true,
            input_events: 0,
        });
        inner.fields.len() - 1
    }

    pub fn focus_field(&self, index: usize, start: usize, end: usize) {
        let mut inner = self.inner.borrow_mut();
        inner.focused = Some(index);
        let field = &mut inner.fields[index];
        field.start = start;
        field.end = end;
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().focused = None;
    }

    pub fn detach_field(&self, index: usize) {
        let mut inner = self.inner.borrow_mut();
        inner.fields[index].connected = false;
        if inner.focused == Some(index) {
            inner.focused = None;
        }
    }

    pub fn field_value(&self, index: usize) -> String {
        self.inner.borrow().fields[index].value.clone()
    }

    /// Simulate the user typing into a field after capture.
    pub fn write_value(&self, index: usize, value: &str) {
        self.inner.borrow_mut().fields[index].value = value.to_string();
    }

    pub fn field_caret(&self, index: usize) -> (usize, usize) {
        let inner = self.inner.borrow();
        (inner.fields[index].start, inner.fields[index].end)
    }

    pub fn input_events(&self, index: usize) -> usize {
        self.inner.borrow().fields[index].input_events
    }

    pub fn select_document(&self, start: usize, end: usize) {
        let mut inner = self.inner.borrow_mut();
        inner.focused = None;
        inner.selection = Some((start, end));
    }

    pub fn clear_document_selection(&self) {
        self.inner.borrow_mut().selection = None;
    }

    /// Replace the whole document, invalidating captured spans.
    pub fn rerender(&self, text: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.document = text.to_string();
        inner.generation += 1;
        inner.selection = None;
    }

    pub fn document_text(&self) -> String {
        self.inner.borrow().document.clone()
    }

    pub fn document_selection(&self) -> Option<(usize, usize)> {
        self.inner.borrow().selection
    }
}

fn char_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

impl SelectionHost for MockPage {
    type Field = usize;
    type Span = MockSpan;

    fn focused_field(&self) -> Option<FieldSnapshot<usize>> {
        let inner = self.inner.borrow();
        let index = inner.focused?;
        let field = &inner.fields[index];
        Some(FieldSnapshot {
            field: index,
            value: field.value.clone(),
            start: field.start,
            end: field.end,
            rect: Some(Self::field_rect(index)),
        })
    }

    fn document_span(&self) -> Option<SpanSnapshot<MockSpan>> {
        let inner = self.inner.borrow();
        let (start, end) = inner.selection?;
        Some(SpanSnapshot {
            span: MockSpan {
                start,
                end,
                generation: inner.generation,
            },
            text: char_slice(&inner.document, start, end),
            rect: Some(SelectionRect::new(
                start as f64,
                0.0,
                end.saturating_sub(start) as f64,
                16.0,
            )),
        })
    }

    fn field_is_connected(&self, field: &usize) -> bool {
        self.inner
            .borrow()
            .fields
            .get(*field)
            .is_some_and(|f| f.connected)
    }

    fn field_value(&self, field: &usize) -> Result<String, PlatformError> {
        self.inner
            .borrow()
            .fields
            .get(*field)
            .map(|f| f.value.clone())
            .ok_or_else(|| "no such field".into())
    }

    fn write_field(&self, field: &usize, value: &str, caret: usize) -> Result<(), PlatformError> {
        let mut inner = self.inner.borrow_mut();
        let field = inner.fields.get_mut(*field).ok_or("no such field")?;
        if !field.connected {
            return Err("field detached".into());
        }
        field.value = value.to_string();
        let caret = caret.min(utf16_len(value));
        field.start = caret;
        field.end = caret;
        field.input_events += 1;
        Ok(())
    }

    fn span_rect(&self, span: &MockSpan) -> Option<SelectionRect> {
        let inner = self.inner.borrow();
        (span.generation == inner.generation).then(|| {
            SelectionRect::new(
                span.start as f64,
                0.0,
                span.end.saturating_sub(span.start) as f64,
                16.0,
            )
        })
    }

    fn replace_span(&self, span: &MockSpan, text: &str) -> Result<(), PlatformError> {
        let mut inner = self.inner.borrow_mut();
        if span.generation != inner.generation {
            return Err("range container detached".into());
        }
        let len = inner.document.chars().count();
        if span.end > len || span.start > span.end {
            return Err("range out of bounds".into());
        }
        let before = char_slice(&inner.document, 0, span.start);
        let after = char_slice(&inner.document, span.end, len);
        inner.document = format!("{before}{text}{after}");
        let caret = span.start + text.chars().count();
        inner.selection = Some((caret, caret));
        Ok(())
    }
}
