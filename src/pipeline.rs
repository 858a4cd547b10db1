//! The analysis pipeline: extract → prompt → model → validate → persist.
//!
//! [`Analyzer::analyze`] runs the stages strictly in sequence for one URL
//! and aborts at the first failure. Nothing is retried and nothing is
//! deduplicated: every successful call appends a new report, even for a URL
//! analyzed earlier the same day.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::config::Config;
use crate::error::AnalyzeError;
use crate::extract::{create_extractor, TextExtractor};
use crate::model::{create_model, CompletionModel};
use crate::models::{NewReport, Report};
use crate::prompt::build_prompt;
use crate::schema::{parse_content, ReportSchema};
use crate::store::{ReportStore, SqliteStore};

/// Result of a successful analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report_id: String,
    pub report: Report,
}

/// Checks that `raw` is an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url, AnalyzeError> {
    if raw.trim().is_empty() {
        return Err(AnalyzeError::Input(
            "URL is required and must be a string".to_string(),
        ));
    }
    let url = Url::parse(raw).map_err(|_| AnalyzeError::Input("Invalid URL format".to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AnalyzeError::Input(
            "Invalid URL format: only http and https URLs can be analyzed".to_string(),
        )),
    }
}

pub struct Analyzer {
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn CompletionModel>,
    store: Arc<dyn ReportStore>,
    schema: ReportSchema,
    max_prompt_chars: usize,
}

impl Analyzer {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn ReportStore>,
        schema: ReportSchema,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            extractor,
            model,
            store,
            schema,
            max_prompt_chars,
        }
    }

    /// Wires the analyzer from `[analysis]` settings and already-built
    /// collaborators.
    pub fn from_config(
        config: &Config,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self::new(
            extractor,
            model,
            store,
            config.analysis.schema,
            config.analysis.max_prompt_chars,
        )
    }

    #[tracing::instrument(name = "analyze", skip(self), fields(schema = self.schema.as_str()))]
    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisOutcome, AnalyzeError> {
        let raw_url = raw_url.trim();
        let url = validate_url(raw_url)?;

        let text = self.extractor.extract(url.as_str()).await.map_err(|e| {
            tracing::warn!(error = %e, extractor = self.extractor.name(), "extraction failed");
            e
        })?;
        tracing::info!(chars = text.chars().count(), "extracted page text");

        let prompt = build_prompt(&text, self.max_prompt_chars);
        let raw = self
            .model
            .complete(&prompt, &self.schema.response_schema())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = self.model.model_name(), "model call failed");
                e
            })?;
        tracing::debug!(response_bytes = raw.len(), "model responded");

        let content = parse_content(self.schema, &raw).map_err(|e| {
            tracing::error!(error = %e, "model output rejected");
            e
        })?;

        let new_report = NewReport {
            full_url: raw_url.to_string(),
            date_generated: Utc::now().date_naive(),
            content,
        };
        let report_id = self.store.insert(&new_report).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist report");
            e
        })?;
        tracing::info!(report_id = %report_id, "report stored");

        Ok(AnalysisOutcome {
            report: Report::from_new(report_id.clone(), &new_report),
            report_id,
        })
    }
}

/// CLI entry point: analyzes `url` against the configured database and
/// prints the stored report.
pub async fn run_analyze(config: &Config, url: &str) -> anyhow::Result<()> {
    let pool = crate::db::connect(config).await?;
    crate::migrate::apply(&pool).await?;

    let store: Arc<dyn ReportStore> = Arc::new(SqliteStore::new(pool.clone()));
    let analyzer = Analyzer::from_config(
        config,
        create_extractor(config)?,
        create_model(&config.model)?,
        store,
    );

    let result = analyzer.analyze(url).await;
    pool.close().await;
    let outcome = result?;

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}
