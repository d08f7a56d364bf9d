//! Cross-context message protocol.
//!
//! JSON messages exchanged between the popup, the page (content script) and
//! the background mediator. Requests are tagged by `type`. Field decoding is
//! lenient: a wrongly-typed field decodes as absent so the receiver can reply
//! with a proper `ok: false` instead of dropping the message.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ReplaceError;
use crate::types::RewriteMode;

pub const NO_TEXT_PROVIDED: &str = "No text provided.";
pub const INVALID_REWRITE_PAYLOAD: &str = "Invalid rewrite payload.";
pub const NO_SELECTION_TO_REPLACE: &str =
    "No selection to replace. Use \"Use page selection\" first.";
pub const STALE_SELECTION: &str =
    "The selected text is no longer on the page. Please reselect it and try again.";
pub const REWRITE_FAILED: &str = "Rewrite failed.";

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A request travelling between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Popup → page: capture and return the current selection.
    #[serde(rename = "GET_SELECTION")]
    GetSelection,

    /// Popup → page: write text over the last captured selection.
    #[serde(rename = "REPLACE_SELECTION")]
    ReplaceSelection {
        #[serde(
            rename = "newText",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        new_text: Option<String>,
    },

    /// Page or popup → background: rewrite `text` in `mode`.
    #[serde(rename = "BUBBLE_REWRITE")]
    BubbleRewrite {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        text: Option<String>,
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        mode: Option<RewriteMode>,
    },

    /// Popup → every page: the inline surface preference changed.
    /// Fire-and-forget.
    #[serde(rename = "INLINE_BUBBLE_SETTING_CHANGED")]
    InlineBubbleSettingChanged { enabled: bool },
}

impl Request {
    /// Decode an incoming message. Non-objects and unknown types yield `None`
    /// and are ignored by every listener.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        match Request::deserialize(value) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::trace!(target: "retone::protocol", "ignoring message: {e}");
                None
            }
        }
    }

    pub fn to_value(&self) -> Value {
        // Plain enums with string/bool fields always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn rewrite(text: impl Into<String>, mode: RewriteMode) -> Self {
        Request::BubbleRewrite {
            text: Some(text.into()),
            mode: Some(mode),
        }
    }

    pub fn replace(text: impl Into<String>) -> Self {
        Request::ReplaceSelection {
            new_text: Some(text.into()),
        }
    }
}

/// Reply to `GET_SELECTION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReply {
    pub text: String,
}

/// Reply to `REPLACE_SELECTION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplaceReply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

impl From<Result<(), ReplaceError>> for ReplaceReply {
    fn from(result: Result<(), ReplaceError>) -> Self {
        match result {
            Ok(()) => ReplaceReply::ok(),
            Err(ReplaceError::NoSelection) => ReplaceReply::failed(NO_SELECTION_TO_REPLACE),
            Err(ReplaceError::Stale(_)) => ReplaceReply::failed(STALE_SELECTION),
        }
    }
}

/// Reply to `BUBBLE_REWRITE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RewriteReply {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            ok: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Collapse into the rewritten text or a user-facing message.
    pub fn into_result(self) -> Result<String, String> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(self.error.unwrap_or_else(|| REWRITE_FAILED.to_string())),
        }
    }
}

/// Any reply. Serialized without a tag, matching what the sender expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Selection(SelectionReply),
    Replace(ReplaceReply),
    Rewrite(RewriteReply),
}

impl Response {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<SelectionReply> for Response {
    fn from(r: SelectionReply) -> Self {
        Response::Selection(r)
    }
}

impl From<ReplaceReply> for Response {
    fn from(r: ReplaceReply) -> Self {
        Response::Replace(r)
    }
}

impl From<RewriteReply> for Response {
    fn from(r: RewriteReply) -> Self {
        Response::Rewrite(r)
    }
}
