//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::{ErrorContext, RepositoryError};
use crate::services::ReportError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// No settings for any requested account
    NotFound(String),
    /// Invalid request parameters
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Storage failure
    Repository(RepositoryError),
}

impl AppError {
    fn repository_response(err: &RepositoryError) -> (StatusCode, ApiError) {
        if err.is_not_found() {
            return (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", err.message()));
        }
        let body = ApiError::new("REPOSITORY_ERROR", err.message());
        let body = if *err.context() == ErrorContext::default() {
            body
        } else {
            body.with_details(err.context().to_string())
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => Self::repository_response(&e),
        };

        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }
        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NoSettings { .. } => AppError::NotFound(err.to_string()),
            ReportError::InvalidRequest(msg) => AppError::BadRequest(msg),
            ReportError::Storage { .. } => AppError::Internal(err.to_string()),
            ReportError::Repository(e) => AppError::Repository(e),
            ReportError::Config(_) => AppError::Internal(err.to_string()),
        }
    }
}
