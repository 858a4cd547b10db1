//! Turning a URL into plain text for prompting.
//!
//! Two interchangeable strategies implement [`TextExtractor`]:
//!
//! | Strategy | Implementation |
//! |----------|----------------|
//! | `regex` | [`RegexExtractor`]: fetch the page, strip markup with [`html_to_text`] |
//! | `document_service` | [`DocumentServiceExtractor`]: ask a document-structuring service for the parsed page |
//!
//! [`create_extractor`] picks one from `[extraction].strategy`.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, ExtractionStrategy};
use crate::fetch::{FetchError, PageFetcher};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not parse document: {0}")]
    Parse(String),
    #[error("page has no extractable text")]
    Empty,
}

/// Converts a URL into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Strategy name, for logs.
    fn name(&self) -> &str;

    async fn extract(&self, url: &str) -> Result<String, ExtractionError>;
}

/// Strips markup from raw HTML.
///
/// Script and style blocks go first (contents included), then every
/// remaining tag becomes a space, then whitespace runs collapse. Stray
/// angle brackets from malformed markup are blanked so the output never
/// contains `<` or `>`.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    let text = text.replace(['<', '>'], " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn non_empty(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::Empty)
    } else {
        Ok(text)
    }
}

// ============ Regex strategy ============

pub struct RegexExtractor {
    fetcher: PageFetcher,
}

impl RegexExtractor {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl TextExtractor for RegexExtractor {
    fn name(&self) -> &str {
        "regex"
    }

    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        let html = self.fetcher.fetch(url).await?;
        tracing::debug!(url, html_bytes = html.len(), "fetched page");
        non_empty(html_to_text(&html))
    }
}

// ============ Document service strategy ============

#[derive(Serialize)]
struct ConvertRequest<'a> {
    http_sources: [HttpSource<'a>; 1],
    options: ConvertOptions,
}

#[derive(Serialize)]
struct HttpSource<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct ConvertOptions {
    to_formats: [&'static str; 1],
}

#[derive(Deserialize)]
struct ConvertResponse {
    document: ConvertedDocument,
}

#[derive(Deserialize)]
struct ConvertedDocument {
    json_content: Option<ParsedDocument>,
}

/// The parts of a structured document this crate reads.
#[derive(Deserialize)]
struct ParsedDocument {
    #[serde(default)]
    texts: Vec<TextSegment>,
}

#[derive(Deserialize)]
struct TextSegment {
    text: String,
}

/// Delegates extraction to a document-structuring service and keeps the
/// first text segment of the returned document.
pub struct DocumentServiceExtractor {
    convert_url: String,
    client: PageFetcher,
}

impl DocumentServiceExtractor {
    pub fn new(endpoint: &str, client: PageFetcher) -> Self {
        Self {
            convert_url: format!("{}/v1/convert/source", endpoint.trim_end_matches('/')),
            client,
        }
    }
}

#[async_trait]
impl TextExtractor for DocumentServiceExtractor {
    fn name(&self) -> &str {
        "document_service"
    }

    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        let request = ConvertRequest {
            http_sources: [HttpSource { url }],
            options: ConvertOptions {
                to_formats: ["json"],
            },
        };

        let response: ConvertResponse = self
            .client
            .post_json(&self.convert_url, &request)
            .await
            .map_err(|e| match e {
                // A body that is not the expected document is a parse failure,
                // not an unreachable page.
                FetchError::Transport { source, .. } if source.is_decode() => {
                    ExtractionError::Parse(source.to_string())
                }
                other => ExtractionError::Fetch(other),
            })?;

        let document = response
            .document
            .json_content
            .ok_or_else(|| ExtractionError::Parse("response has no json_content".to_string()))?;

        let first = document
            .texts
            .into_iter()
            .next()
            .ok_or_else(|| ExtractionError::Parse("document has no text segments".to_string()))?;

        non_empty(first.text)
    }
}

/// Builds the extractor selected by `[extraction].strategy`.
pub fn create_extractor(config: &Config) -> anyhow::Result<Arc<dyn TextExtractor>> {
    match config.extraction.strategy {
        ExtractionStrategy::Regex => {
            let fetcher = PageFetcher::new(&config.fetch)?;
            Ok(Arc::new(RegexExtractor::new(fetcher)))
        }
        ExtractionStrategy::DocumentService => {
            let endpoint = config.extraction.endpoint.as_deref().ok_or_else(|| {
                anyhow::anyhow!("extraction.endpoint required for document_service")
            })?;
            let client = PageFetcher::with_timeout(
                &config.fetch.user_agent,
                Duration::from_secs(config.extraction.timeout_secs),
            )?;
            Ok(Arc::new(DocumentServiceExtractor::new(endpoint, client)))
        }
    }
}
