//! Error types for selection replacement, rewriting and messaging.

use miette::Diagnostic;
use thiserror::Error;

use crate::platform::PlatformError;

/// Failure to write text back into the page.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ReplaceError {
    /// Nothing was captured, or the capture was already consumed.
    #[error("no selection to replace")]
    #[diagnostic(
        code(retone::replace::no_selection),
        help("select some text on the page first")
    )]
    NoSelection,

    /// The captured target is no longer part of the document.
    #[error("selection is stale: {0}")]
    #[diagnostic(
        code(retone::replace::stale),
        help("reselect the text and try again")
    )]
    Stale(PlatformError),
}

impl From<PlatformError> for ReplaceError {
    fn from(e: PlatformError) -> Self {
        ReplaceError::Stale(e)
    }
}

/// Failure from the external rewrite service.
///
/// Display strings are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum RewriteError {
    /// No API key configured at build time or runtime.
    #[error("Missing Gemini API Key. Set GEMINI_API_KEY in your .env file.")]
    #[diagnostic(code(retone::rewrite::missing_key))]
    MissingKey,

    /// Transport failure or non-success response.
    #[error("Gemini API error: {0}")]
    #[diagnostic(code(retone::rewrite::api))]
    Api(String),

    /// The service answered but produced no text.
    #[error("Empty response from Gemini.")]
    #[diagnostic(code(retone::rewrite::empty))]
    Empty,
}

impl From<reqwest::Error> for RewriteError {
    fn from(e: reqwest::Error) -> Self {
        RewriteError::Api(e.to_string())
    }
}

/// Failure to reach the counterpart context at all.
///
/// Distinct from an application-level `ok: false` reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The messaging API is not present in this context.
    #[error("messaging API unavailable")]
    Unavailable,

    /// No active tab to address.
    #[error("no active tab")]
    NoActiveTab,

    /// Nobody is listening on the other side.
    #[error("receiving end unreachable: {0}")]
    Unreachable(String),
}
