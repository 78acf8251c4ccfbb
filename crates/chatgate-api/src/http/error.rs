//! Application error type mapping to HTTP status codes.
//!
//! Responses carry a flat `{"error": message}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use chatgate_types::error::{ConnectorError, MediaError, RepositoryError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request input.
    Validation(String),
    /// The chat session is not connected.
    NotConnected,
    /// Requested resource does not exist.
    NotFound(String),
    /// The connector sidecar failed.
    Upstream(String),
    /// Storage (database or filesystem) failure.
    Storage(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("Not found".to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotFound => AppError::NotFound("No media for this message".to_string()),
            MediaError::Download(msg) => AppError::Upstream(msg),
            MediaError::Storage(msg) => AppError::Storage(msg),
        }
    }
}

impl From<ConnectorError> for AppError {
    fn from(e: ConnectorError) -> Self {
        match e {
            ConnectorError::NotConnected => AppError::NotConnected,
            ConnectorError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotConnected => (
                StatusCode::BAD_REQUEST,
                "Chat session is not connected".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
