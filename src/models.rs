//! Core data models for CRO reports.
//!
//! A report's content comes in one of two shapes, reflecting how the
//! requested response schema evolved. [`ReportContent`] is the tagged union
//! over both; the tag (`schemaVersion`) is persisted with every row so that
//! historical rows of either shape can be read back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shape A: free-text summary with a flat list of recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub page_summary: String,
    pub recommended_improvements: Vec<String>,
    pub improvements_summary: String,
}

/// Shape B: current/expected metrics with prioritized improvements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    /// Comma-joined themes the model focused on.
    pub page_summary_list: String,
    pub current_metrics: CurrentMetrics,
    pub improvements: Vec<Improvement>,
    pub expected_results: ExpectedResults,
    pub recommendations_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMetrics {
    pub estimated_conversion_rate: String,
    pub bounce_rate: String,
    pub average_time_on_page: String,
    pub cart_abandon_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedResults {
    pub expected_conversion_rate: String,
    pub expected_bounce_rate: String,
    pub expected_average_time_on_page: String,
    pub expected_cart_abandon_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub recommended_improvement: String,
    pub summary: String,
    pub priority: Level,
    pub expected_impact: Level,
}

/// Priority / impact rating. Only these three values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Report content, discriminated by `schemaVersion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schemaVersion", rename_all = "lowercase")]
pub enum ReportContent {
    Summary(SummaryReport),
    Metrics(MetricsReport),
}

impl ReportContent {
    /// Discriminant stored in the `schema_version` column.
    pub fn schema_version(&self) -> &'static str {
        match self {
            ReportContent::Summary(_) => "summary",
            ReportContent::Metrics(_) => "metrics",
        }
    }

    /// The page-level summary text of either shape.
    pub fn summary(&self) -> &str {
        match self {
            ReportContent::Summary(r) => &r.page_summary,
            ReportContent::Metrics(r) => &r.page_summary_list,
        }
    }

    /// The closing summary of the recommendations of either shape.
    pub fn improvements_summary(&self) -> &str {
        match self {
            ReportContent::Summary(r) => &r.improvements_summary,
            ReportContent::Metrics(r) => &r.recommendations_summary,
        }
    }
}

/// A report that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub full_url: String,
    pub date_generated: NaiveDate,
    pub content: ReportContent,
}

/// A persisted report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub full_url: String,
    pub date_generated: NaiveDate,
    #[serde(flatten)]
    pub content: ReportContent,
}

impl Report {
    pub fn from_new(id: String, new: &NewReport) -> Self {
        Self {
            id,
            full_url: new.full_url.clone(),
            date_generated: new.date_generated,
            content: new.content.clone(),
        }
    }

    /// Case-insensitive substring match over the URL and both summary
    /// fields. A blank filter matches everything.
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.full_url.as_str(),
            self.content.summary(),
            self.content.improvements_summary(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
