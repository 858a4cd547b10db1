//! Request-level error taxonomy.
//!
//! Each pipeline stage has its own error type; [`AnalyzeError`] gathers them
//! and decides the HTTP status a failure maps to.

use axum::http::StatusCode;
use thiserror::Error;

use crate::extract::ExtractionError;
use crate::model::AnalysisError;
use crate::schema::ValidationError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Input(String),
    #[error("Failed to access webpage content: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Failed to analyze webpage content with AI: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Failed to validate AI analysis: {0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to save analysis: {0}")]
    Store(#[from] StoreError),
}

impl AnalyzeError {
    /// Client-side problems (bad input, unreachable page) are 400s; anything
    /// that fails after the page was read is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::Input(_) | AnalyzeError::Extraction(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Analysis(_) | AnalyzeError::Validation(_) | AnalyzeError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
