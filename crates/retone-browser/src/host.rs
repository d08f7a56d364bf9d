//! Browser implementation of the selection host.
//!
//! Reads the focused `<input>`/`<textarea>` first, then the document
//! `Selection`. Ranges are cloned at capture time so later focus changes
//! cannot collapse them under us.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, DomRect, Element, Event, EventInit, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, Range, Window,
};

use retone_core::{
    FieldSnapshot, PlatformError, SelectionHost, SelectionRect, SpanSnapshot, Viewport,
};

pub(crate) fn js_err(e: JsValue) -> PlatformError {
    PlatformError(js_error_message(&e))
}

/// Best-effort readable message from a thrown JS value.
pub fn js_error_message(e: &JsValue) -> String {
    if let Some(err) = e.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

pub fn rect_from_dom(rect: &DomRect) -> SelectionRect {
    SelectionRect::new(rect.x(), rect.y(), rect.width(), rect.height())
}

/// Current viewport size, zero when there is no window.
pub fn viewport() -> Viewport {
    let Some(window) = web_sys::window() else {
        return Viewport::new(0.0, 0.0);
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(width, height)
}

/// A plain-text control.
#[derive(Debug, Clone, PartialEq)]
pub enum DomField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl DomField {
    /// Wrap `element` if it is an input or textarea.
    pub fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => Some(DomField::TextArea(area)),
            Err(element) => element.dyn_into::<HtmlInputElement>().ok().map(DomField::Input),
        }
    }

    pub fn element(&self) -> &HtmlElement {
        match self {
            DomField::Input(input) => &**input,
            DomField::TextArea(area) => &**area,
        }
    }

    pub fn value(&self) -> String {
        match self {
            DomField::Input(input) => input.value(),
            DomField::TextArea(area) => area.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            DomField::Input(input) => input.set_value(value),
            DomField::TextArea(area) => area.set_value(value),
        }
    }

    /// `(selectionStart, selectionEnd)`, or `None` for input types without
    /// a text selection (checkbox, email, ...).
    fn selection(&self) -> Option<(u32, u32)> {
        let (start, end) = match self {
            DomField::Input(input) => (input.selection_start(), input.selection_end()),
            DomField::TextArea(area) => (area.selection_start(), area.selection_end()),
        };
        Some((start.ok()??, end.ok()??))
    }

    fn set_caret(&self, caret: u32) -> Result<(), JsValue> {
        match self {
            DomField::Input(input) => input.set_selection_range(caret, caret),
            DomField::TextArea(area) => area.set_selection_range(caret, caret),
        }
    }
}

/// Selection host over the live page.
#[derive(Clone)]
pub struct DomSelectionHost {
    window: Window,
    document: Document,
}

impl DomSelectionHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// Host for the global window, if there is one.
    pub fn from_global() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self::new(window, document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl SelectionHost for DomSelectionHost {
    type Field = DomField;
    type Span = Range;

    fn focused_field(&self) -> Option<FieldSnapshot<DomField>> {
        let field = DomField::from_element(self.document.active_element()?)?;
        let (start, end) = field.selection()?;
        let rect = rect_from_dom(&field.element().get_bounding_client_rect());
        Some(FieldSnapshot {
            value: field.value(),
            start: start as usize,
            end: end as usize,
            rect: Some(rect),
            field,
        })
    }

    fn document_span(&self) -> Option<SpanSnapshot<Range>> {
        let selection = self.window.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let live = selection.get_range_at(0).ok()?;
        let span = live.clone_range();
        let text = String::from(selection.to_string());
        let rect = Some(rect_from_dom(&span.get_bounding_client_rect()));
        Some(SpanSnapshot { span, text, rect })
    }

    fn field_is_connected(&self, field: &DomField) -> bool {
        field.element().is_connected()
    }

    fn field_value(&self, field: &DomField) -> Result<String, PlatformError> {
        Ok(field.value())
    }

    fn write_field(&self, field: &DomField, value: &str, caret: usize) -> Result<(), PlatformError> {
        field.set_value(value);
        field.set_caret(caret as u32).map_err(js_err)?;

        // Direct assignment does not notify frameworks bound to the control.
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict("input", &init).map_err(js_err)?;
        field.element().dispatch_event(&event).map_err(js_err)?;
        Ok(())
    }

    fn span_rect(&self, span: &Range) -> Option<SelectionRect> {
        let connected = span
            .common_ancestor_container()
            .map(|node| node.is_connected())
            .unwrap_or(false);
        connected.then(|| rect_from_dom(&span.get_bounding_client_rect()))
    }

    fn replace_span(&self, span: &Range, text: &str) -> Result<(), PlatformError> {
        let attached = span.start_container().map_err(js_err)?.is_connected()
            && span.end_container().map_err(js_err)?.is_connected();
        if !attached {
            return Err("range no longer attached to the document".into());
        }

        span.delete_contents().map_err(js_err)?;
        let node = self.document.create_text_node(text);
        span.insert_node(&node).map_err(js_err)?;

        let selection = self
            .window
            .get_selection()
            .map_err(js_err)?
            .ok_or_else(|| PlatformError::from("no selection object"))?;
        let caret = self.document.create_range().map_err(js_err)?;
        caret.set_start_after(&node).map_err(js_err)?;
        caret.collapse_with_to_start(true);
        selection.remove_all_ranges().map_err(js_err)?;
        selection.add_range(&caret).map_err(js_err)?;

        tracing::trace!(target: "retone::host", "replaced document range");
        Ok(())
    }
}
