//! Report persistence.
//!
//! The [`ReportStore`] trait is the only way the pipeline and the HTTP
//! layer touch stored reports. It exposes append and read operations only;
//! rows are never updated, and deletion happens out of band.
//!
//! | Implementation | Backend |
//! |----------------|---------|
//! | [`SqliteStore`] | `reports` table in SQLite |
//! | [`InMemoryStore`] | `Vec` behind a lock, for tests and dry runs |

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewReport, Report};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("report rejected: {0}")]
    Rejected(String),
    #[error("stored report {id} is unreadable: {reason}")]
    Corrupt { id: String, reason: String },
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Appends one report and returns its newly assigned id.
    async fn insert(&self, report: &NewReport) -> Result<String, StoreError>;

    /// All reports, newest `date_generated` first (latest insert first within
    /// a day). A non-blank `filter` keeps only reports whose URL or summary
    /// fields contain it, ignoring case.
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Report>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Report>, StoreError>;
}

/// Normalizes a user filter: trimmed, lowercased, `None` when blank.
pub(crate) fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
}

fn check_insertable(report: &NewReport) -> Result<(), StoreError> {
    if report.full_url.trim().is_empty() {
        return Err(StoreError::Rejected("full_url must not be empty".to_string()));
    }
    Ok(())
}
