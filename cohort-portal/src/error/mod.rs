//! Error types and HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{email::EmailError, storage::StorageError};

/// Application error type
///
/// Every handler returns `Result<_, ApiError>`. Client-caused errors
/// (4xx) carry their message verbatim in the response body; server
/// errors (5xx) are logged with full detail and answered with a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Uploaded file exceeds the size limit (413)
    #[error("file size {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Actual file size
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// Uploaded file has a disallowed content type (415)
    #[error("unsupported attachment type: {0}")]
    UnsupportedMedia(String),

    /// Database error (500)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Email subsystem error (500)
    #[error("email error: {0}")]
    Email(#[from] EmailError),

    /// Anything else unexpected (500)
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a `BadRequest` error from a string message
    #[must_use]
    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create an `Unauthorized` error from a string message
    #[must_use]
    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a `NotFound` error from a string message
    #[must_use]
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileSizeExceeded { actual, limit } => {
                Self::PayloadTooLarge { actual, limit }
            }
            StorageError::InvalidMimeType { actual, .. } => Self::UnsupportedMedia(actual),
            StorageError::TooManyFiles { .. } => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            Self::UnsupportedMedia(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string()),
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
