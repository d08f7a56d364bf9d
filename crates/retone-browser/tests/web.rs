//! WASM browser tests for retone-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement};

wasm_bindgen_test_configure!(run_in_browser);

use retone_browser::{
    BrowserClipboard, BubblePhase, BubbleState, DomSelectionHost, ReplaceError, Replaced,
    RewriteConfig, RewriteMode, SelectionState, SurfaceAction, SurfaceMount, TimerSlot,
    copy_output, handle_background_message, parse_action,
};
use retone_core::render::HOST_ELEMENT_ID;
use serde_json::json;

fn document() -> web_sys::Document {
    gloo_utils::document()
}

fn append<T: JsCast>(tag: &str) -> T {
    let element = document().create_element(tag).unwrap();
    gloo_utils::body().append_child(&element).unwrap();
    element.dyn_into::<T>().unwrap()
}

fn host() -> DomSelectionHost {
    DomSelectionHost::from_global().unwrap()
}

// === Text controls ===

#[wasm_bindgen_test]
fn test_textarea_capture_and_replace() {
    let area: HtmlTextAreaElement = append("textarea");
    area.set_value("hello world");
    area.focus().unwrap();
    area.set_selection_range(0, 11).unwrap();

    let inputs = Rc::new(Cell::new(0));
    let counter = inputs.clone();
    let _listener = EventListener::new(&area, "input", move |_| counter.set(counter.get() + 1));

    let mut state = SelectionState::new(host());
    assert_eq!(state.capture().text, "hello world");

    assert_eq!(state.replace("hi world"), Ok(Replaced::TextField { caret: 8 }));
    assert_eq!(area.value(), "hi world");
    assert_eq!(area.selection_start().unwrap(), Some(8));
    assert_eq!(area.selection_end().unwrap(), Some(8));
    assert_eq!(inputs.get(), 1);

    area.remove();
}

#[wasm_bindgen_test]
fn test_input_partial_selection() {
    let input: HtmlInputElement = append("input");
    input.set_value("one two three");
    input.focus().unwrap();
    input.set_selection_range(4, 7).unwrap();

    let mut state = SelectionState::new(host());
    assert_eq!(state.capture().text, "two");
    state.replace("2").unwrap();
    assert_eq!(input.value(), "one 2 three");
    assert_eq!(input.selection_start().unwrap(), Some(5));

    input.remove();
}

#[wasm_bindgen_test]
fn test_detached_field_is_stale() {
    let area: HtmlTextAreaElement = append("textarea");
    area.set_value("keep me");
    area.focus().unwrap();
    area.set_selection_range(0, 4).unwrap();

    let mut state = SelectionState::new(host());
    state.capture();
    area.remove();

    assert!(matches!(state.replace("x"), Err(ReplaceError::Stale(_))));
    assert_eq!(area.value(), "keep me");
}

// === Document ranges ===

#[wasm_bindgen_test]
fn test_range_capture_and_replace() {
    let div: HtmlElement = append("div");
    div.set_text_content(Some("the quick brown fox"));
    if let Some(active) = document().active_element() {
        if let Ok(active) = active.dyn_into::<HtmlElement>() {
            active.blur().unwrap();
        }
    }

    let text = div.first_child().unwrap();
    let range = document().create_range().unwrap();
    range.set_start(&text, 4).unwrap();
    range.set_end(&text, 9).unwrap();
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection.remove_all_ranges().unwrap();
    selection.add_range(&range).unwrap();

    let mut state = SelectionState::new(host());
    let captured = state.capture();
    assert_eq!(captured.text, "quick");
    assert!(captured.rect.is_some());

    // Moving the live selection must not affect the captured range.
    selection.remove_all_ranges().unwrap();

    assert_eq!(state.replace("slow"), Ok(Replaced::Span));
    assert_eq!(div.text_content().unwrap(), "the slow brown fox");
    assert!(selection.is_collapsed());

    div.remove();
}

#[wasm_bindgen_test]
fn test_replace_without_capture() {
    let mut state = SelectionState::new(host());
    assert_eq!(state.replace("x"), Err(ReplaceError::NoSelection));
}

// === Surface mount ===

#[wasm_bindgen_test]
fn test_parse_action() {
    assert_eq!(
        parse_action(Some("shorter"), None),
        Some(SurfaceAction::Mode(RewriteMode::Shorter))
    );
    assert_eq!(parse_action(None, Some("rewrite")), Some(SurfaceAction::Rewrite));
    assert_eq!(parse_action(None, Some("close")), Some(SurfaceAction::Close));
    assert_eq!(parse_action(Some("loud"), None), None);
    assert_eq!(parse_action(None, Some("explode")), None);
    assert_eq!(parse_action(None, None), None);
}

#[wasm_bindgen_test]
fn test_mount_renders_into_shadow_root() {
    let clicked = Rc::new(Cell::new(None));
    let sink = clicked.clone();
    let mount = SurfaceMount::attach(&document(), move |action| sink.set(Some(action))).unwrap();
    assert!(document().get_element_by_id(HOST_ELEMENT_ID).is_some());

    let state = BubbleState {
        phase: BubblePhase::Ready,
        snippet: "hello".into(),
        ..Default::default()
    };
    mount.render(&state);
    let html = mount.root().inner_html();
    assert!(html.contains("retone-bubble"));
    // page-level lookups do not see into the shadow root
    assert!(document().query_selector(".retone-bubble").unwrap().is_none());

    let button: HtmlElement = mount
        .root()
        .query_selector(r#"[data-mode="fix"]"#)
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    button.click();
    assert_eq!(clicked.get(), Some(SurfaceAction::Mode(RewriteMode::Fix)));

    mount.render(&BubbleState::default());
    assert!(!mount.root().inner_html().contains("retone-bubble"));

    mount.detach();
    assert!(document().get_element_by_id(HOST_ELEMENT_ID).is_none());
}

// === Timers ===

#[wasm_bindgen_test]
fn test_timer_slot_rearm_and_cancel() {
    let fired = Rc::new(Cell::new(false));
    let mut slot = TimerSlot::new();
    assert!(!slot.is_armed());

    let flag = fired.clone();
    slot.arm(10_000, move || flag.set(true));
    assert!(slot.is_armed());

    let flag = fired.clone();
    slot.arm(10_000, move || flag.set(true));
    assert!(slot.is_armed());

    slot.cancel();
    assert!(!slot.is_armed());
    assert!(!fired.get());
}

// === Background ===

#[wasm_bindgen_test]
async fn test_background_leaves_page_messages_alone() {
    let reply =
        handle_background_message(RewriteConfig::default(), json!({ "type": "GET_SELECTION" }))
            .await;
    assert!(reply.is_none());

    let reply = handle_background_message(RewriteConfig::default(), json!("not a message")).await;
    assert!(reply.is_none());
}

#[wasm_bindgen_test]
async fn test_background_rejects_empty_rewrite() {
    let reply = handle_background_message(
        RewriteConfig::default(),
        json!({ "type": "BUBBLE_REWRITE", "text": "", "mode": "fix" }),
    )
    .await;
    assert_eq!(
        reply,
        Some(json!({ "ok": false, "error": "Invalid rewrite payload." }))
    );
}

#[wasm_bindgen_test]
async fn test_background_reports_missing_key() {
    // outside an extension there is no stored override, so the base config is used as-is
    let reply = handle_background_message(
        RewriteConfig::default(),
        json!({ "type": "BUBBLE_REWRITE", "text": "hello", "mode": "shorter" }),
    )
    .await
    .unwrap();
    assert_eq!(reply["ok"], json!(false));
    assert!(reply["error"].as_str().unwrap().contains("Missing Gemini API Key"));
}

// === Clipboard ===

#[wasm_bindgen_test]
async fn test_copy_blank_output_is_noop() {
    // resolves before reaching navigator.clipboard, so no permission is needed
    assert_eq!(copy_output(&BrowserClipboard, "").await, Ok(false));
    assert_eq!(copy_output(&BrowserClipboard, "   ").await, Ok(false));
}
