/// Unified error types for the EdTechID resolver
///
/// Resolution outcomes such as "invalid format" or "withdrawn" are not errors;
/// they travel as `ResolveOutcome` values. Only infrastructure failures end up here.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the resolver service
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Collaborator I/O failures (store unreachable, timeout)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors (non-resolution endpoints)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Short machine-readable label, used for metrics and audit details
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverError::Database(_) => "database",
            ResolverError::Storage(_) => "storage",
            ResolverError::Validation(_) => "validation",
            ResolverError::NotFound(_) => "not_found",
            ResolverError::Config(_) => "config",
            ResolverError::Internal(_) => "internal",
            ResolverError::Io(_) => "io",
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ResolverError to HTTP response
impl IntoResponse for ResolverError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ResolverError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            ResolverError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;
