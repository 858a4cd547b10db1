//! History listing.
//!
//! Maps stored reports of either shape onto one flat [`ResultSummary`] row,
//! as shown by the results view and `cro results`.

use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::db;
use crate::models::Report;
use crate::prompt::truncate_chars;
use crate::store::{ReportStore, SqliteStore, StoreError};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub id: String,
    /// Host of the analyzed URL.
    pub root_url: String,
    pub url: String,
    pub date_generated: String,
    pub schema_version: String,
    pub summary: String,
    pub improvements_summary: String,
}

/// Host part of `url`; the URL itself when it has no host or does not parse.
pub fn root_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

impl From<&Report> for ResultSummary {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            root_url: root_url(&report.full_url),
            url: report.full_url.clone(),
            date_generated: report.date_generated.format("%Y-%m-%d").to_string(),
            schema_version: report.content.schema_version().to_string(),
            summary: report.content.summary().to_string(),
            improvements_summary: report.content.improvements_summary().to_string(),
        }
    }
}

/// Lists stored reports as summaries, newest first, optionally filtered.
pub async fn list_results(
    store: &dyn ReportStore,
    filter: Option<&str>,
) -> Result<Vec<ResultSummary>, StoreError> {
    let reports = store.list(filter).await?;
    Ok(reports.iter().map(ResultSummary::from).collect())
}

/// CLI entry point: prints the history as a table.
pub async fn run_results(config: &Config, filter: Option<&str>) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let results = list_results(&store, filter).await;
    pool.close().await;
    let results = results?;

    if results.is_empty() {
        println!("No reports found.");
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:<8}  {:<30}  SUMMARY", "ID", "DATE", "SCHEMA", "HOST");
    for r in &results {
        println!(
            "{:<36}  {:<10}  {:<8}  {:<30}  {}",
            r.id,
            r.date_generated,
            r.schema_version,
            r.root_url,
            one_line(&r.summary, 60)
        );
    }
    println!();
    println!("{} report(s)", results.len());
    Ok(())
}

/// CLI entry point: prints one report as JSON.
pub async fn run_show(config: &Config, id: &str) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let report = store.get(id).await;
    pool.close().await;

    match report? {
        Some(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        None => anyhow::bail!("report not found: {}", id),
    }
}

fn one_line(text: &str, max_chars: usize) -> String {
    let (head, truncated) = truncate_chars(text, max_chars);
    if truncated {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CurrentMetrics, ExpectedResults, MetricsReport, NewReport, ReportContent, SummaryReport,
    };
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    #[test]
    fn test_root_url_is_host() {
        assert_eq!(root_url("https://shop.example.com/a/b?c=d"), "shop.example.com");
        assert_eq!(root_url("http://127.0.0.1:8080/"), "127.0.0.1");
        assert_eq!(root_url("garbage"), "garbage");
    }

    #[tokio::test]
    async fn test_summaries_for_both_shapes() {
        let store = InMemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        store
            .insert(&NewReport {
                full_url: "https://a.example.com/x".to_string(),
                date_generated: date,
                content: ReportContent::Summary(SummaryReport {
                    page_summary: "hero".to_string(),
                    recommended_improvements: vec![],
                    improvements_summary: "cta".to_string(),
                }),
            })
            .await
            .unwrap();
        store
            .insert(&NewReport {
                full_url: "https://b.example.com/y".to_string(),
                date_generated: date.succ_opt().unwrap(),
                content: ReportContent::Metrics(MetricsReport {
                    page_summary_list: "checkout".to_string(),
                    current_metrics: CurrentMetrics {
                        estimated_conversion_rate: "1%".to_string(),
                        bounce_rate: "1%".to_string(),
                        average_time_on_page: "1s".to_string(),
                        cart_abandon_rate: "1%".to_string(),
                    },
                    improvements: vec![],
                    expected_results: ExpectedResults {
                        expected_conversion_rate: "2%".to_string(),
                        expected_bounce_rate: "1%".to_string(),
                        expected_average_time_on_page: "2s".to_string(),
                        expected_cart_abandon_rate: "1%".to_string(),
                    },
                    recommendations_summary: "fewer steps".to_string(),
                }),
            })
            .await
            .unwrap();

        let results = list_results(&store, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].root_url, "b.example.com");
        assert_eq!(results[0].summary, "checkout");
        assert_eq!(results[0].improvements_summary, "fewer steps");
        assert_eq!(results[0].date_generated, "2025-06-02");
        assert_eq!(results[1].summary, "hero");
        assert_eq!(results[1].improvements_summary, "cta");

        let value = serde_json::to_value(&results[1]).unwrap();
        assert_eq!(value["rootUrl"], "a.example.com");
        assert_eq!(value["improvementsSummary"], "cta");
    }
}
