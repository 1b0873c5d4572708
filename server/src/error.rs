//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::sync::RemoteError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Remote write token is not configured")]
    TokenMissing,

    #[error("Could not save {0} to the remote store")]
    SaveFailed(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    #[allow(dead_code)]
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::Remote(e) => {
                tracing::error!("Remote store error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Remote store error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::TokenMissing => {
                tracing::error!("Write attempted without a remote token");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.to_string(),
                    None,
                )
            }
            AppError::SaveFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
