//! Response schemas and validation of model output.
//!
//! The completion model is asked to answer with JSON constrained to the
//! schema of the active [`ReportSchema`]. Its answer is then checked twice:
//! once for JSON syntax and once against the typed shape. Neither step
//! substitutes defaults; any failure rejects the answer.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{MetricsReport, ReportContent, SummaryReport};

/// Which report shape is requested from the model.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportSchema {
    /// Shape A: page summary, recommendations, improvements summary.
    #[default]
    Summary,
    /// Shape B: metrics, prioritized improvements, expected results.
    Metrics,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("model output is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("model output does not match the {schema} schema: {source}")]
    SchemaMismatch {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSchema::Summary => "summary",
            ReportSchema::Metrics => "metrics",
        }
    }

    /// JSON schema passed to the model as its response-format constraint.
    pub fn response_schema(&self) -> Value {
        match self {
            ReportSchema::Summary => summary_schema(),
            ReportSchema::Metrics => metrics_schema(),
        }
    }
}

fn summary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "pageSummary": {
                "type": "string",
                "description": "Main themes that the AI focused on, comma-separated"
            },
            "recommendedImprovements": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Array of improvement recommendations"
            },
            "improvementsSummary": {
                "type": "string",
                "description": "Summary of all recommended improvements"
            }
        },
        "required": ["pageSummary", "recommendedImprovements", "improvementsSummary"]
    })
}

fn metric_block(keys: &[(&str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = keys
        .iter()
        .map(|(key, description)| {
            (
                key.to_string(),
                json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    let required: Vec<&str> = keys.iter().map(|(key, _)| *key).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn metrics_schema() -> Value {
    let level = json!({ "type": "string", "enum": ["low", "medium", "high"] });
    json!({
        "type": "object",
        "properties": {
            "pageSummaryList": {
                "type": "string",
                "description": "Main themes that the AI focused on, comma-separated"
            },
            "currentMetrics": metric_block(&[
                ("estimatedConversionRate", "Estimated conversion rate as a percentage"),
                ("bounceRate", "Estimated bounce rate as a percentage"),
                ("averageTimeOnPage", "Estimated average time on page"),
                ("cartAbandonRate", "Estimated cart abandonment rate as a percentage"),
            ]),
            "improvements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "recommendedImprovement": { "type": "string" },
                        "summary": { "type": "string" },
                        "priority": level,
                        "expectedImpact": level
                    },
                    "required": ["recommendedImprovement", "summary", "priority", "expectedImpact"]
                }
            },
            "expectedResults": metric_block(&[
                ("expectedConversionRate", "Conversion rate after the improvements"),
                ("expectedBounceRate", "Bounce rate after the improvements"),
                ("expectedAverageTimeOnPage", "Average time on page after the improvements"),
                ("expectedCartAbandonRate", "Cart abandonment rate after the improvements"),
            ]),
            "recommendationsSummary": {
                "type": "string",
                "description": "Summary of all recommended improvements"
            }
        },
        "required": [
            "pageSummaryList",
            "currentMetrics",
            "improvements",
            "expectedResults",
            "recommendationsSummary"
        ]
    })
}

/// Parses raw model output into report content of the requested shape.
pub fn parse_content(schema: ReportSchema, raw: &str) -> Result<ReportContent, ValidationError> {
    let value: Value = serde_json::from_str(raw).map_err(ValidationError::Syntax)?;

    let mismatch = |source| ValidationError::SchemaMismatch {
        schema: schema.as_str(),
        source,
    };

    match schema {
        ReportSchema::Summary => serde_json::from_value::<SummaryReport>(value)
            .map(ReportContent::Summary)
            .map_err(mismatch),
        ReportSchema::Metrics => serde_json::from_value::<MetricsReport>(value)
            .map(ReportContent::Metrics)
            .map_err(mismatch),
    }
}
