//! Markup for the inline surface.
//!
//! The surface lives in its own shadow root, so the stylesheet here only has
//! to fight the UA defaults, not the host page. Every render produces the
//! complete inner markup; the browser layer swaps it in wholesale.

use std::fmt::Write;

use markdown_weaver_escape::escape_html;

use crate::surface::{BubblePhase, BubbleState};
use crate::types::RewriteMode;

/// Id of the element hosting the shadow root.
pub const HOST_ELEMENT_ID: &str = "retone-inline-host";

/// Styles injected at the top of the shadow root.
pub const BUBBLE_STYLES: &str = r#":host { all: initial; }
.retone-spinner, .retone-bubble {
  position: fixed;
  z-index: 2147483647;
  font: 13px/1.4 system-ui, -apple-system, "Segoe UI", sans-serif;
  color: #0f172a;
}
.retone-spinner {
  width: 28px;
  height: 28px;
  box-sizing: border-box;
  border-radius: 50%;
  border: 3px solid #e2e8f0;
  border-top-color: #6366f1;
  background: #fff;
  animation: retone-spin 0.8s linear infinite;
}
@keyframes retone-spin { to { transform: rotate(360deg); } }
.retone-bubble {
  width: 320px;
  box-sizing: border-box;
  padding: 10px 12px;
  border-radius: 10px;
  background: #fff;
  box-shadow: 0 6px 20px rgba(15, 23, 42, 0.18);
}
.retone-header { display: flex; align-items: center; justify-content: space-between; }
.retone-title { font-weight: 600; }
.retone-close { border: 0; background: none; cursor: pointer; font-size: 16px; color: #64748b; }
.retone-snippet { margin: 6px 0; color: #475569; max-height: 4.2em; overflow: hidden; white-space: pre-wrap; }
.retone-modes { display: flex; flex-wrap: wrap; gap: 4px; margin-bottom: 8px; }
.retone-mode { border: 1px solid #cbd5e1; border-radius: 6px; background: #f8fafc; padding: 2px 8px; cursor: pointer; font-size: 12px; }
.retone-mode.is-active { background: #6366f1; border-color: #6366f1; color: #fff; }
.retone-action { width: 100%; border: 0; border-radius: 6px; padding: 6px; background: #0f172a; color: #fff; cursor: pointer; }
button:disabled { opacity: 0.6; cursor: default; }
.retone-status { margin: 6px 0 0; color: #334155; }
.retone-error { margin: 6px 0 0; color: #b91c1c; }
"#;

fn push_escaped(out: &mut String, text: &str) {
    // Writing into a String cannot fail.
    let _ = escape_html(&mut *out, text);
}

/// Render the surface's inner markup. Hidden renders to an empty string.
pub fn render_markup(state: &BubbleState) -> String {
    let mut out = String::new();
    match state.phase {
        BubblePhase::Hidden => {}
        BubblePhase::Analyzing => {
            let _ = write!(
                out,
                r#"<div class="retone-spinner" style="top:{:.0}px;left:{:.0}px" role="status" aria-label="Analyzing selection"></div>"#,
                state.top, state.left
            );
        }
        BubblePhase::Ready | BubblePhase::Replaced => render_bubble(&mut out, state),
    }
    out
}

/// Full shadow-root content: stylesheet followed by markup.
pub fn render_document(state: &BubbleState) -> String {
    format!("<style>{BUBBLE_STYLES}</style>{}", render_markup(state))
}

fn render_bubble(out: &mut String, state: &BubbleState) {
    let locked = state.loading || state.phase == BubblePhase::Replaced;
    let disabled = if locked { " disabled" } else { "" };

    let _ = write!(
        out,
        r#"<div class="retone-bubble" style="top:{:.0}px;left:{:.0}px" role="dialog" aria-label="Rewrite selection">"#,
        state.top, state.left
    );
    out.push_str(
        r#"<div class="retone-header"><span class="retone-title">Rewrite</span><button class="retone-close" data-action="close" aria-label="Close">×</button></div>"#,
    );

    out.push_str(r#"<p class="retone-snippet">"#);
    push_escaped(out, &state.snippet);
    out.push_str("</p>");

    out.push_str(r#"<div class="retone-modes">"#);
    for mode in RewriteMode::ALL {
        let active = if mode == state.mode { " is-active" } else { "" };
        let _ = write!(
            out,
            r#"<button class="retone-mode{active}" data-mode="{}"{disabled}>{}</button>"#,
            mode.as_str(),
            mode.label()
        );
    }
    out.push_str("</div>");

    let label = if state.loading { "Rewriting…" } else { "Rewrite" };
    let _ = write!(
        out,
        r#"<button class="retone-action" data-action="rewrite"{disabled}>{label}</button>"#
    );

    if let Some(status) = &state.status {
        out.push_str(r#"<p class="retone-status">"#);
        push_escaped(out, status);
        out.push_str("</p>");
    }
    if let Some(error) = &state.error {
        out.push_str(r#"<p class="retone-error" role="alert">"#);
        push_escaped(out, error);
        out.push_str("</p>");
    }

    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    fn ready_state() -> BubbleState {
        BubbleState {
            phase: BubblePhase::Ready,
            snippet: "hello world".into(),
            top: 120.4,
            left: 64.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_hidden_renders_nothing() {
        assert_eq!(render_markup(&BubbleState::default()), "");
    }

    #[test]
    fn test_spinner_markup() {
        let state = BubbleState {
            phase: BubblePhase::Analyzing,
            top: 10.0,
            left: 20.0,
            ..Default::default()
        };
        insta::assert_snapshot!(
            render_markup(&state),
            @r#"<div class="retone-spinner" style="top:10px;left:20px" role="status" aria-label="Analyzing selection"></div>"#
        );
    }

    #[test]
    fn test_ready_bubble() {
        let html = render_markup(&ready_state());
        assert!(html.starts_with(r#"<div class="retone-bubble" style="top:120px;left:64px""#));
        assert!(html.contains(r#"<p class="retone-snippet">hello world</p>"#));
        assert!(html.contains(r#"<button class="retone-mode is-active" data-mode="formal">Formal</button>"#));
        assert!(html.contains(r#"data-mode="fix">Fix grammar</button>"#));
        assert!(html.contains(r#"<button class="retone-action" data-action="rewrite">Rewrite</button>"#));
        assert!(!html.contains("disabled"));
        assert!(!html.contains("retone-error"));
    }

    #[test]
    fn test_loading_disables_controls() {
        let state = BubbleState {
            loading: true,
            status: Some(SmolStr::new_static("Rewriting…")),
            ..ready_state()
        };
        let html = render_markup(&state);
        assert!(html.contains(r#"data-action="rewrite" disabled>Rewriting…</button>"#));
        assert_eq!(html.matches(" disabled").count(), RewriteMode::ALL.len() + 1);
    }

    #[test]
    fn test_snippet_and_error_escaped() {
        let state = BubbleState {
            snippet: "<script>alert(1)</script>".into(),
            error: Some("bad & worse".into()),
            ..ready_state()
        };
        let html = render_markup(&state);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"<p class="retone-error" role="alert">bad &amp; worse</p>"#));
    }

    #[test]
    fn test_document_includes_styles() {
        let doc = render_document(&ready_state());
        assert!(doc.starts_with("<style>:host { all: initial; }"));
        assert!(doc.contains("retone-bubble"));
    }
}
