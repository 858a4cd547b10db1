//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/analyze` | Run the analysis pipeline for `{ "url": ... }` |
//! | `GET`  | `/results?filter=` | List stored reports, newest first |
//! | `GET`  | `/reports/{id}` | Fetch one stored report |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every failure is answered with a JSON body and the matching status:
//!
//! ```json
//! { "error": "Invalid URL format" }
//! ```
//!
//! Bad input and unreachable pages are `400`; model, validation and
//! storage failures are `500`; an unknown report id is `404`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser views can
//! be served from a different origin.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db;
use crate::error::AnalyzeError;
use crate::extract::create_extractor;
use crate::migrate;
use crate::model::{create_model, CompletionModel};
use crate::models::Report;
use crate::pipeline::Analyzer;
use crate::results::{list_results, ResultSummary};
use crate::store::{ReportStore, SqliteStore, StoreError};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub store: Arc<dyn ReportStore>,
}

/// Builds the router over already-constructed state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(handle_analyze))
        .route("/results", get(handle_results))
        .route("/reports/{id}", get(handle_report))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server with the model named in `[model]`.
///
/// The model client is created once here and shared by every request.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let model = create_model(&config.model)?;
    run_server_with_model(config, model).await
}

/// Starts the HTTP server with a caller-supplied completion model.
///
/// Opens (and migrates) the configured database, builds the configured
/// extractor, and serves until the process is terminated.
pub async fn run_server_with_model(
    config: &Config,
    model: Arc<dyn CompletionModel>,
) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let store: Arc<dyn ReportStore> = Arc::new(SqliteStore::new(pool));
    let extractor = create_extractor(config)?;
    let analyzer = Analyzer::from_config(config, extractor.clone(), model.clone(), store.clone());

    let state = AppState {
        analyzer: Arc::new(analyzer),
        store,
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        extractor = extractor.name(),
        model = model.model_name(),
        schema = config.analysis.schema.as_str(),
        "server listening"
    );
    axum::serve(listener, router(state)).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
    }
}

impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        AppError {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store query failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Failed to read stored reports: {}", err),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /analyze ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    message: String,
    url: String,
    analysis: Report,
    report_id: String,
}

/// Handler for `POST /analyze`.
///
/// Not idempotent: each call runs the full pipeline and, on success,
/// appends a new report.
async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(body) = payload.map_err(|e| bad_request(format!("Invalid request body: {}", e)))?;

    let url = body
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("URL is required and must be a string"))?;

    let outcome = state.analyzer.analyze(url).await?;

    Ok(Json(AnalyzeResponse {
        message: "Analysis completed".to_string(),
        url: outcome.report.full_url.clone(),
        analysis: outcome.report,
        report_id: outcome.report_id,
    }))
}

// ============ GET /results ============

#[derive(Deserialize)]
struct ResultsQuery {
    #[serde(default)]
    filter: String,
}

#[derive(Serialize)]
struct ResultsResponse {
    message: String,
    filter: String,
    results: Vec<ResultSummary>,
}

/// Handler for `GET /results`.
async fn handle_results(
    State(state): State<AppState>,
    query: Result<Query<ResultsQuery>, QueryRejection>,
) -> Result<Json<ResultsResponse>, AppError> {
    let Query(query) = query.map_err(|e| bad_request(format!("Invalid query: {}", e)))?;
    let results = list_results(state.store.as_ref(), Some(query.filter.as_str())).await?;
    Ok(Json(ResultsResponse {
        message: "Results retrieved".to_string(),
        filter: query.filter,
        results,
    }))
}

// ============ GET /reports/{id} ============

#[derive(Serialize)]
struct ReportResponse {
    message: String,
    report: Report,
}

/// Handler for `GET /reports/{id}`.
async fn handle_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| not_found(format!("no report with id: {}", id)))?;

    Ok(Json(ReportResponse {
        message: "Report retrieved".to_string(),
        report,
    }))
}
