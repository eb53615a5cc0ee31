//! Unified error handling for the user store.
//!
//! Provides a single error type that every store layer returns, and that the
//! boundary layer can turn into an HTTP response with an `{"error": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::error::format_violations;
use domain::{DomainError, FieldViolation};
use serde::Serialize;
use thiserror::Error;

/// Boxed source error carried by store failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application error kinds.
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    // Credentials
    #[error("Password hashing failed: {0}")]
    Hash(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Backing store (I/O, connection, timeout, driver)
    #[error("Store operation `{operation}` failed: {source}")]
    Store {
        operation: String,
        #[source]
        source: BoxError,
    },

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Store { .. } => "STORE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Hash(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Hash(msg) => {
                tracing::error!("Hash error: {}", msg);
                "Could not process the password".to_string()
            }
            AppError::Store { operation, source } => {
                tracing::error!("Store error during {}: {:?}", operation, source);
                "A storage error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Field violations carried by a validation error
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            AppError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => AppError::Validation(violations),
            DomainError::Hash(msg) => AppError::Hash(msg),
            DomainError::NotFound(entity) => AppError::NotFound(entity),
            DomainError::Conflict(entity) => AppError::Conflict(entity),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(entity.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldViolation::new(field, reason)])
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn store(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        AppError::Store {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
