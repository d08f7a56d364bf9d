//! Browser DOM layer for retone.
//!
//! This crate provides the DOM side of selection capture and replacement,
//! the shadow-root mount for the inline surface, and bindings to the
//! extension messaging and storage APIs. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `host`: `SelectionHost` over inputs, textareas and document ranges
//! - `timer`: single-slot cancellable timeouts
//! - `clipboard`: `ClipboardPlatform` over `navigator.clipboard`
//! - `mount`: shadow-root host and click delegation for the surface
//! - `chrome`: `chrome.runtime` / `chrome.tabs` / `chrome.storage` bindings
//! - `transport`: popup transport and preference store over `chrome`
//! - `content`, `background`: per-context wiring
//!
//! # Re-exports
//!
//! This crate re-exports `retone-core` for convenience, so consumers
//! only need to depend on `retone-browser`.

// Re-export core crate
pub use retone_core;
pub use retone_core::*;

pub mod background;
pub mod chrome;
pub mod clipboard;
pub mod content;
pub mod host;
pub mod mount;
pub mod timer;
pub mod transport;

pub use background::handle_background_message;
pub use clipboard::BrowserClipboard;
pub use content::ContentScript;
pub use host::{DomField, DomSelectionHost};
pub use mount::{SurfaceAction, SurfaceMount, parse_action};
pub use timer::TimerSlot;
pub use transport::{ChromeStore, ChromeTransport, load_rewrite_config};
