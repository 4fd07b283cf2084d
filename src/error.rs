//! # error
//!
//! Centralised application error type.
//!
//! Every handler returns `Result<_, AppError>`. Axum's `IntoResponse` impl
//! converts these into structured JSON error bodies so the EA / dashboard
//! always gets a machine-readable response even on failure.
//!
//! Taxonomy: `BadRequest` = malformed input, nothing mutated.
//! `Storage` = a durable write/query failed; the caller is expected to
//! retry. The metrics/stream paths never surface `Storage` — they degrade
//! to stale data instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was missing required fields or failed to parse.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A durable write or query against the store failed.
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {err}"),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
