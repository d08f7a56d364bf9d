//! Core types: rewrite modes and viewport geometry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rewrite style requested from the text-generation service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    #[default]
    Formal,
    Friendly,
    Shorter,
    Longer,
    Fix,
}

impl RewriteMode {
    /// All modes, in display order.
    pub const ALL: [RewriteMode; 5] = [
        RewriteMode::Formal,
        RewriteMode::Friendly,
        RewriteMode::Shorter,
        RewriteMode::Longer,
        RewriteMode::Fix,
    ];

    /// Wire name, as used in messages and `data-mode` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            RewriteMode::Formal => "formal",
            RewriteMode::Friendly => "friendly",
            RewriteMode::Shorter => "shorter",
            RewriteMode::Longer => "longer",
            RewriteMode::Fix => "fix",
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            RewriteMode::Formal => "Formal",
            RewriteMode::Friendly => "Friendly",
            RewriteMode::Shorter => "Shorter",
            RewriteMode::Longer => "Longer",
            RewriteMode::Fix => "Fix grammar",
        }
    }

    /// Instruction line handed to the rewrite service.
    pub fn instruction(self) -> &'static str {
        match self {
            RewriteMode::Formal => "Rewrite the text in a more formal and professional tone.",
            RewriteMode::Friendly => "Rewrite the text to be more friendly, warm, and casual.",
            RewriteMode::Shorter => {
                "Rewrite the text to be more concise and shorter while keeping meaning."
            }
            RewriteMode::Longer => {
                "Rewrite the text with more detail and explanation, but stay on point."
            }
            RewriteMode::Fix => {
                "Fix grammar, spelling, and clarity without changing the tone or meaning."
            }
        }
    }
}

impl std::fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rewrite mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for RewriteMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RewriteMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// Viewport-relative rectangle, as returned by `getBoundingClientRect()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Inner size of the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
