//! API error types with IntoResponse
//!
//! Errors become plain-text responses. Storage details are logged and
//! replaced by a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_core::ValidationError;

use crate::db::DbError;

/// Body of every 500
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed id, undecodable body, or a field rule failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Storage failure, including timeouts (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { resource, id } => format!("{} '{}' not found", resource, id),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "Database error");
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
        };

        (status, message).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::InvalidId { reason, .. } => {
                Self::Validation(ValidationError::InvalidFormat { field: "id", reason })
            }
            _ => Self::Database(e),
        }
    }
}
