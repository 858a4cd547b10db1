//! Generative completion model abstraction.
//!
//! Defines the [`CompletionModel`] trait and its implementations:
//! - **[`DisabledModel`]**: always fails; used when `model.provider = "disabled"`.
//! - **[`GeminiModel`]**: calls the Gemini `generateContent` endpoint with a
//!   JSON response schema.
//!
//! The model is built once by [`create_model`] at startup and shared behind
//! an `Arc` by every request. Calls are single-attempt: a failed or timed-out
//! request is reported to the caller, never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model provider is disabled")]
    Disabled,
    #[error("{0} environment variable not set")]
    MissingApiKey(String),
    #[error("model request timed out")]
    Timeout,
    #[error("model request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("model API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Transport(e)
        }
    }
}

/// A completion service that answers a prompt with text constrained to a
/// JSON schema.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-2.0-flash"`).
    fn model_name(&self) -> &str;

    /// Sends `prompt` and returns the raw text of the answer.
    async fn complete(
        &self,
        prompt: &str,
        response_schema: &Value,
    ) -> Result<String, AnalysisError>;
}

// ============ Disabled ============

pub struct DisabledModel;

#[async_trait]
impl CompletionModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str, _schema: &Value) -> Result<String, AnalysisError> {
        Err(AnalysisError::Disabled)
    }
}

// ============ Gemini ============

pub struct GeminiModel {
    client: Client,
    model: String,
    endpoint: String,
    api_key: String,
}

impl GeminiModel {
    /// Builds the client. Reads the API key from the variable named by
    /// `api_key_env`.
    pub fn new(config: &ModelConfig) -> Result<Self, AnalysisError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| AnalysisError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &ModelConfig, api_key: String) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AnalysisError::Transport)?;

        Ok(Self {
            client,
            model: config.model.clone(),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Result<String, AnalysisError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl CompletionModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &str,
        response_schema: &Value,
    ) -> Result<String, AnalysisError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        response_text(parsed)
    }
}

/// Creates the [`CompletionModel`] named by `provider`.
///
/// | Config Value | Model |
/// |-------------|-------|
/// | `"disabled"` | [`DisabledModel`] |
/// | `"gemini"` | [`GeminiModel`] |
pub fn create_model(config: &ModelConfig) -> anyhow::Result<Arc<dyn CompletionModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledModel)),
        "gemini" => Ok(Arc::new(GeminiModel::new(config)?)),
        other => anyhow::bail!("Unknown model provider: {}", other),
    }
}
