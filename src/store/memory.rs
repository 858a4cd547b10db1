//! In-memory [`ReportStore`] with the same ordering and filter semantics as
//! the SQLite store.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{NewReport, Report};

use super::{check_insertable, normalize_filter, ReportStore, StoreError};

#[derive(Default)]
pub struct InMemoryStore {
    // Insertion order.
    reports: RwLock<Vec<Report>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert(&self, report: &NewReport) -> Result<String, StoreError> {
        check_insertable(report)?;
        let id = uuid::Uuid::new_v4().to_string();
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        reports.push(Report::from_new(id.clone(), report));
        Ok(id)
    }

    async fn list(&self, filter: Option<&str>) -> Result<Vec<Report>, StoreError> {
        let needle = normalize_filter(filter);
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());

        let mut out: Vec<Report> = reports
            .iter()
            .rev()
            .filter(|r| needle.as_deref().map_or(true, |n| r.matches_filter(n)))
            .cloned()
            .collect();
        // Stable: keeps latest-insert-first within a day.
        out.sort_by(|a, b| b.date_generated.cmp(&a.date_generated));
        Ok(out)
    }

    async fn get(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportContent, SummaryReport};
    use chrono::NaiveDate;

    fn new_report(url: &str, day: u32, summary: &str) -> NewReport {
        NewReport {
            full_url: url.to_string(),
            date_generated: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            content: ReportContent::Summary(SummaryReport {
                page_summary: summary.to_string(),
                recommended_improvements: vec![],
                improvements_summary: "none".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_date_then_latest_insert() {
        let store = InMemoryStore::new();
        for (url, day, summary) in [
            ("https://a.test", 1, "a"),
            ("https://b.test", 3, "b"),
            ("https://c.test", 1, "c"),
        ] {
            store.insert(&new_report(url, day, summary)).await.unwrap();
        }

        let urls: Vec<String> = store
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.full_url)
            .collect();
        assert_eq!(urls, vec!["https://b.test", "https://c.test", "https://a.test"]);
    }

    #[tokio::test]
    async fn test_list_filters_url_and_summary() {
        let store = InMemoryStore::new();
        for (url, day, summary) in [
            ("https://EXAMPLE.com/x", 1, "hero"),
            ("https://other.test", 2, "mentions example.com"),
            ("https://third.test", 3, "pricing"),
        ] {
            store.insert(&new_report(url, day, summary)).await.unwrap();
        }

        let hits = store.list(Some("example.com")).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].full_url, "https://other.test");

        assert_eq!(store.list(Some("  ")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_get_finds_it() {
        let store = InMemoryStore::new();
        let report = new_report("https://a.test", 1, "a");
        let id = store.insert(&report).await.unwrap();
        assert!(!id.is_empty());
        let found = store.get(&id).await.unwrap().unwrap();
        assert_eq!(found.full_url, "https://a.test");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_url_rejected() {
        let store = InMemoryStore::new();
        let err = store.insert(&new_report("", 1, "a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.is_empty());
    }
}
