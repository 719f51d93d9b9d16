//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed JSON body: {0}")]
    InvalidJson(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Store errors: conflicts are 409, everything else is 503
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Stable machine-readable code, returned as the `error` field
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidJson(_) => "INVALID_JSON",
            AppError::MissingHeader(_) => "MISSING_HEADER",
            AppError::Domain(e) => e.code(),
            AppError::Store(e) if e.is_concurrency_conflict() => "CONCURRENT_MODIFICATION",
            AppError::Store(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidJson(_)
            | AppError::MissingHeader(_)
            | AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::Store(e) if e.is_concurrency_conflict() => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, field) = match &self {
            AppError::Validation(e) => (self.to_string(), Some(e.field.to_string())),
            AppError::Store(e) if !e.is_concurrency_conflict() => {
                tracing::error!("Store error: {:?}", e);
                ("Wallet store is unavailable".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}
