//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use retone_browser::{ReplaceOutcome, RewriteMode, SelectionOutcome};

/// Result of "Use page selection".
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsSelectionOutcome {
    /// Imported text, absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub status: String,
}

impl From<SelectionOutcome> for JsSelectionOutcome {
    fn from(outcome: SelectionOutcome) -> Self {
        Self {
            text: outcome.text,
            status: outcome.status.to_string(),
        }
    }
}

/// Result of "Replace selection on page".
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsReplaceOutcome {
    pub ok: bool,
    pub status: String,
}

impl From<ReplaceOutcome> for JsReplaceOutcome {
    fn from(outcome: ReplaceOutcome) -> Self {
        Self {
            ok: outcome.ok,
            status: outcome.status,
        }
    }
}

/// Result of a popup rewrite. `ok: false` with neither field set means the
/// input was blank and nothing was sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsRewriteOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Option<Result<String, String>>> for JsRewriteOutcome {
    fn from(outcome: Option<Result<String, String>>) -> Self {
        match outcome {
            None => Self::default(),
            Some(Ok(result)) => Self {
                ok: true,
                result: Some(result),
                error: None,
            },
            Some(Err(error)) => Self {
                ok: false,
                result: None,
                error: Some(error),
            },
        }
    }
}

/// A rewrite mode for the mode picker.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsModeOption {
    pub value: String,
    pub label: String,
}

impl From<RewriteMode> for JsModeOption {
    fn from(mode: RewriteMode) -> Self {
        Self {
            value: mode.as_str().to_string(),
            label: mode.label().to_string(),
        }
    }
}
