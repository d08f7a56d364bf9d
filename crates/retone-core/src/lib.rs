//! retone-core: selection capture/replace and rewrite plumbing without DOM
//! dependencies.
//!
//! This crate provides:
//! - `SelectionHost` trait for the host page abstraction
//! - `SelectionState<H>` - the single captured reference per page, with
//!   `capture` and `replace`
//! - `InlineSurface` - the inline bubble state machine, plus its markup
//! - The cross-context message protocol, the background `Mediator` and the
//!   popup `ControlSurface`
//! - `GeminiRewriter` behind the `RewriteService` trait

pub mod config;
pub mod control;
pub mod error;
pub mod mediator;
pub mod page;
pub mod platform;
pub mod protocol;
pub mod render;
pub mod replace;
pub mod rewrite;
pub mod selection;
pub mod surface;
pub mod text;
pub mod tracker;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{Preferences, PreferenceStore, RewriteConfig, StoreError};
pub use control::{
    ControlSurface, ReplaceOutcome, SelectionOutcome, TabTransport, copy_output,
};
pub use error::{ChannelError, ReplaceError, RewriteError};
pub use mediator::Mediator;
pub use page::PageContext;
pub use platform::{ClipboardPlatform, FieldSnapshot, PlatformError, SelectionHost, SpanSnapshot};
pub use protocol::{ReplaceReply, Request, Response, RewriteReply, SelectionReply};
pub use render::{render_document, render_markup};
pub use replace::Replaced;
pub use rewrite::{GeminiRewriter, RewriteService, build_prompt};
pub use selection::{Capture, SelectionReference, SelectionState};
pub use smol_str::SmolStr;
pub use surface::{
    BubblePhase, BubbleState, Effects, InlineSurface, SelectionTrigger, SurfaceEffect,
};
pub use types::{RewriteMode, SelectionRect, UnknownMode, Viewport};
