//! TOML configuration.
//!
//! Every section except `[db]` and `[server]` is optional and falls back to
//! the defaults below. [`load_config`] parses and validates the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schema::ReportSchema;

/// Desktop Chrome identity; some origins refuse requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    20
}

/// Which [`TextExtractor`](crate::extract::TextExtractor) turns a URL into text.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Fetch the page and strip markup locally.
    #[default]
    Regex,
    /// Delegate to an external document-structuring service.
    DocumentService,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub strategy: ExtractionStrategy,
    /// Base URL of the document service. Required for `document_service`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::Regex,
            endpoint: None,
            timeout_secs: default_service_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_service_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_service_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub schema: ReportSchema,
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema: ReportSchema::default(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

fn default_max_prompt_chars() -> usize {
    8000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Checks the constraints serde cannot express.
pub fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }
    if config.extraction.timeout_secs == 0 {
        anyhow::bail!("extraction.timeout_secs must be > 0");
    }
    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }

    if config.analysis.max_prompt_chars == 0 {
        anyhow::bail!("analysis.max_prompt_chars must be > 0");
    }

    if config.extraction.strategy == ExtractionStrategy::DocumentService {
        match config.extraction.endpoint.as_deref() {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                url::Url::parse(endpoint).with_context(|| {
                    format!("extraction.endpoint is not a valid URL: {}", endpoint)
                })?;
            }
            _ => anyhow::bail!(
                "extraction.endpoint must be set when strategy is 'document_service'"
            ),
        }
    }

    match config.model.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    Ok(())
}
