//! SQLite-backed [`ReportStore`].
//!
//! One row per report in the `reports` table (see [`crate::migrate`]). The
//! content payload is stored as JSON next to its `schema_version`
//! discriminant, and rows are decoded by dispatching on that column.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{MetricsReport, NewReport, Report, ReportContent, SummaryReport};

use super::{check_insertable, normalize_filter, ReportStore, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str =
    "SELECT id, full_url, date_generated, schema_version, content_json FROM reports";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn content_json(content: &ReportContent) -> Result<String, StoreError> {
    let encoded = match content {
        ReportContent::Summary(r) => serde_json::to_string(r),
        ReportContent::Metrics(r) => serde_json::to_string(r),
    };
    encoded.map_err(|e| StoreError::Rejected(e.to_string()))
}

fn decode_row(row: &SqliteRow) -> Result<Report, StoreError> {
    let id: String = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::Corrupt {
        id: id.clone(),
        reason,
    };

    let date: String = row.try_get("date_generated")?;
    let date_generated = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| corrupt(format!("bad date_generated '{}': {}", date, e)))?;

    let version: String = row.try_get("schema_version")?;
    let payload: String = row.try_get("content_json")?;
    let content = match version.as_str() {
        "summary" => serde_json::from_str::<SummaryReport>(&payload).map(ReportContent::Summary),
        "metrics" => serde_json::from_str::<MetricsReport>(&payload).map(ReportContent::Metrics),
        other => return Err(corrupt(format!("unknown schema_version '{}'", other))),
    }
    .map_err(|e| corrupt(e.to_string()))?;

    Ok(Report {
        full_url: row.try_get("full_url")?,
        date_generated,
        content,
        id,
    })
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn insert(&self, report: &NewReport) -> Result<String, StoreError> {
        check_insertable(report)?;
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO reports (id, full_url, date_generated, created_at, schema_version,
                                 full_url_lc, summary_lc, improvements_summary_lc, content_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&report.full_url)
        .bind(report.date_generated.format(DATE_FORMAT).to_string())
        .bind(chrono::Utc::now().timestamp())
        .bind(report.content.schema_version())
        .bind(report.full_url.to_lowercase())
        .bind(report.content.summary().to_lowercase())
        .bind(report.content.improvements_summary().to_lowercase())
        .bind(content_json(&report.content)?)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self, filter: Option<&str>) -> Result<Vec<Report>, StoreError> {
        // The needle and the `*_lc` columns are both folded with `str::to_lowercase`.
        let rows = match normalize_filter(filter) {
            Some(needle) => {
                sqlx::query(&format!(
                    "{} WHERE instr(full_url_lc, ?) > 0 \
                        OR instr(summary_lc, ?) > 0 \
                        OR instr(improvements_summary_lc, ?) > 0 \
                     ORDER BY date_generated DESC, created_at DESC, rowid DESC",
                    SELECT_COLUMNS
                ))
                .bind(&needle)
                .bind(&needle)
                .bind(&needle)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{} ORDER BY date_generated DESC, created_at DESC, rowid DESC",
                    SELECT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(decode_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_row).transpose()
    }
}
