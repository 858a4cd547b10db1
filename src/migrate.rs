use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Creates the database file and schema. Safe to run repeatedly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn apply(pool: &SqlitePool) -> Result<()> {
    // The `*_lc` columns hold lowercased copies of the URL and both summary
    // fields, written on insert, so the history filter runs in SQL for
    // either report shape.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            full_url TEXT NOT NULL CHECK (length(full_url) > 0),
            date_generated TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            schema_version TEXT NOT NULL CHECK (schema_version IN ('summary', 'metrics')),
            full_url_lc TEXT NOT NULL,
            summary_lc TEXT NOT NULL,
            improvements_summary_lc TEXT NOT NULL,
            content_json TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reports_date_generated ON reports(date_generated DESC, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
