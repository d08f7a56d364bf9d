//! Rewrite service boundary and the Gemini client behind it.
//!
//! The rest of the crate only sees [`RewriteService`]. [`GeminiRewriter`]
//! is the production implementation: one `generateContent` call per
//! rewrite, no retries, no streaming.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::RewriteConfig;
use crate::error::RewriteError;
use crate::types::RewriteMode;

/// Anything that can turn text into a rewritten version of itself.
pub trait RewriteService {
    fn rewrite(
        &self,
        text: &str,
        mode: RewriteMode,
    ) -> impl Future<Output = Result<String, RewriteError>>;
}

/// Build the prompt for a rewrite.
pub fn build_prompt(text: &str, mode: RewriteMode) -> String {
    [
        "You are an assistant that rewrites emails and short messages.",
        "Always preserve the original intent, names, and facts.",
        mode.instruction(),
        "",
        "Original text:",
        &format!("\"\"\"{text}\"\"\""),
        "",
        "Return only the rewritten text, without commentary.",
    ]
    .join("\n")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [PartOut<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Default, Deserialize)]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Concatenate the first candidate's text parts and trim the result.
fn extract_text(response: GenerateResponse) -> Result<String, RewriteError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(RewriteError::Empty);
    }
    Ok(text.to_string())
}

/// Pull a readable message out of an error response body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.is_empty() => env.error.message,
        _ => format!("request failed with status {status}"),
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiRewriter {
    client: reqwest::Client,
    config: RewriteConfig,
}

impl GeminiRewriter {
    pub fn new(config: RewriteConfig) -> Self {
        if !config.has_api_key() {
            tracing::warn!(target: "retone::rewrite", "no Gemini API key configured, rewrites will fail");
        }
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl RewriteService for GeminiRewriter {
    async fn rewrite(&self, text: &str, mode: RewriteMode) -> Result<String, RewriteError> {
        let api_key = self.config.api_key.as_deref().ok_or(RewriteError::MissingKey)?;

        let prompt = build_prompt(text, mode);
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [PartOut { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        tracing::debug!(
            target: "retone::rewrite",
            model = %self.config.model,
            %mode,
            chars = text.chars().count(),
            "calling generateContent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RewriteError::Api(error_message(status, &body)));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}
