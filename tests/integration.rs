use chrono::NaiveDate;
use cro_lens::models::{NewReport, ReportContent, SummaryReport};
use cro_lens::store::{ReportStore, SqliteStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cro_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cro");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/cro.sqlite"

[server]
bind = "127.0.0.1:7341"

[model]
provider = "disabled"
"#,
        root.display()
    );

    let config_path = config_dir.join("cro.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cro(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cro_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cro binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Writes reports straight into the configured database.
async fn seed(config_path: &Path, reports: &[(&str, (i32, u32, u32), &str)]) -> Vec<String> {
    let config = cro_lens::config::load_config(config_path).unwrap();
    let pool = cro_lens::db::connect(&config).await.unwrap();
    let store = SqliteStore::new(pool.clone());

    let mut ids = Vec::new();
    for (url, (y, m, d), summary) in reports {
        let report = NewReport {
            full_url: url.to_string(),
            date_generated: NaiveDate::from_ymd_opt(*y, *m, *d).unwrap(),
            content: ReportContent::Summary(SummaryReport {
                page_summary: summary.to_string(),
                recommended_improvements: vec!["Sticky add-to-cart".to_string()],
                improvements_summary: "Make the CTA visible".to_string(),
            }),
        };
        ids.push(store.insert(&report).await.unwrap());
    }
    pool.close().await;
    ids
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cro(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/cro.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_cro(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_cro(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_results_empty() {
    let (_tmp, config_path) = setup_test_env();

    run_cro(&config_path, &["init"]);
    let (stdout, stderr, success) = run_cro(&config_path, &["results"]);
    assert!(success, "results failed: stderr={}", stderr);
    assert!(stdout.contains("No reports found."));
}

#[tokio::test]
async fn test_results_lists_and_filters() {
    let (_tmp, config_path) = setup_test_env();

    run_cro(&config_path, &["init"]);
    seed(
        &config_path,
        &[
            ("https://shop.example.com/a", (2025, 3, 1), "hero banner"),
            ("https://other.test/b", (2025, 3, 2), "pricing table"),
        ],
    )
    .await;

    let (stdout, _, success) = run_cro(&config_path, &["results"]);
    assert!(success);
    assert!(stdout.contains("2 report(s)"));
    let other = stdout.find("other.test").unwrap();
    let shop = stdout.find("shop.example.com").unwrap();
    assert!(other < shop, "newest report should be listed first");

    let (stdout, _, success) = run_cro(&config_path, &["results", "--filter", "EXAMPLE.com"]);
    assert!(success);
    assert!(stdout.contains("1 report(s)"));
    assert!(stdout.contains("hero banner"));
    assert!(!stdout.contains("pricing table"));
}

#[tokio::test]
async fn test_show_report() {
    let (_tmp, config_path) = setup_test_env();

    run_cro(&config_path, &["init"]);
    let ids = seed(&config_path, &[("https://shop.example.com/a", (2025, 3, 1), "hero")]).await;

    let (stdout, stderr, success) = run_cro(&config_path, &["show", &ids[0]]);
    assert!(success, "show failed: stderr={}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["id"], ids[0].as_str());
    assert_eq!(report["fullUrl"], "https://shop.example.com/a");
    assert_eq!(report["dateGenerated"], "2025-03-01");
    assert_eq!(report["schemaVersion"], "summary");
    assert_eq!(report["pageSummary"], "hero");
}

#[test]
fn test_show_missing_report() {
    let (_tmp, config_path) = setup_test_env();

    run_cro(&config_path, &["init"]);
    let (_, stderr, success) = run_cro(&config_path, &["show", "nonexistent-id"]);
    assert!(!success, "show of a missing report should fail");
    assert!(stderr.contains("report not found"));
}

#[test]
fn test_analyze_rejects_invalid_url() {
    let (_tmp, config_path) = setup_test_env();

    run_cro(&config_path, &["init"]);
    let (_, stderr, success) = run_cro(&config_path, &["analyze", "not a url"]);
    assert!(!success);
    assert!(stderr.contains("Invalid URL format"));

    let (stdout, _, _) = run_cro(&config_path, &["results"]);
    assert!(stdout.contains("No reports found."));
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config/bad.toml");
    fs::write(
        &bad,
        "[db]\npath = \"x.sqlite\"\n\n[server]\nbind = \"127.0.0.1:1\"\n\n[model]\nprovider = \"openai\"\n",
    )
    .unwrap();

    let (_, stderr, success) = run_cro(&bad, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Unknown model provider"));
}

#[test]
fn test_missing_config_file() {
    let (tmp, _) = setup_test_env();
    let (_, stderr, success) = run_cro(&tmp.path().join("nope.toml"), &["results"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
