//! Shadow-root mount for the inline surface.
//!
//! The surface gets its own host element with an open shadow root so page
//! styles stay out and ours stay in. Rendering replaces the whole root.

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, ShadowRoot, ShadowRootInit, ShadowRootMode};

use retone_core::render::{HOST_ELEMENT_ID, render_document};
use retone_core::{BubbleState, PlatformError, RewriteMode};

use crate::host::js_err;

/// A click inside the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    Mode(RewriteMode),
    Rewrite,
    Close,
}

/// Decode the `data-mode` / `data-action` attributes of a clicked control.
pub fn parse_action(mode: Option<&str>, action: Option<&str>) -> Option<SurfaceAction> {
    if let Some(mode) = mode {
        return mode.parse().ok().map(SurfaceAction::Mode);
    }
    match action? {
        "rewrite" => Some(SurfaceAction::Rewrite),
        "close" => Some(SurfaceAction::Close),
        _ => None,
    }
}

fn action_for_target(target: &Element) -> Option<SurfaceAction> {
    let control = target.closest("[data-mode],[data-action]").ok()??;
    if control.has_attribute("disabled") {
        return None;
    }
    parse_action(
        control.get_attribute("data-mode").as_deref(),
        control.get_attribute("data-action").as_deref(),
    )
}

pub struct SurfaceMount {
    host: HtmlElement,
    root: ShadowRoot,
    _listeners: Vec<EventListener>,
}

impl SurfaceMount {
    /// Create the host element and wire click delegation.
    pub fn attach(
        document: &Document,
        on_action: impl Fn(SurfaceAction) + 'static,
    ) -> Result<Self, PlatformError> {
        if let Some(stale) = document.get_element_by_id(HOST_ELEMENT_ID) {
            stale.remove();
        }

        let host: HtmlElement = document
            .create_element("div")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| PlatformError::from("host element is not an HtmlElement"))?;
        host.set_id(HOST_ELEMENT_ID);

        let root = host
            .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
            .map_err(js_err)?;

        let parent = document
            .body()
            .map(Element::from)
            .or_else(|| document.document_element())
            .ok_or_else(|| PlatformError::from("document has no root element"))?;
        parent.append_child(&host).map_err(js_err)?;

        // Keep the page selection alive when the user presses a button.
        let keep_selection = EventListener::new_with_options(
            &root,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            |event| event.prevent_default(),
        );

        let clicks = EventListener::new(&root, "click", move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if let Some(action) = action_for_target(&target) {
                tracing::trace!(target: "retone::mount", ?action, "surface action");
                on_action(action);
            }
        });

        Ok(Self {
            host,
            root,
            _listeners: vec![keep_selection, clicks],
        })
    }

    pub fn render(&self, state: &BubbleState) {
        self.root.set_inner_html(&render_document(state));
    }

    pub fn host(&self) -> &HtmlElement {
        &self.host
    }

    pub fn root(&self) -> &ShadowRoot {
        &self.root
    }

    /// Whether `event` came from inside the surface. Events leaving a shadow
    /// root are retargeted to the host element.
    pub fn contains_event(&self, event: &Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
            .is_some_and(|node| self.host.contains(Some(&node)))
    }

    pub fn detach(&self) {
        self.host.remove();
    }
}
