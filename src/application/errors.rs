use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::password::PasswordError;
use crate::auth::SigningError;
use crate::domain::repositories::ledger_store::StoreError;

/// Handler-layer failures.
///
/// Raised only after authentication succeeded, or on the public auth routes.
/// Token failures use [`crate::auth::AuthError`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// `message` is what the client sees; `source` is only logged
    #[error("{message}: {source}")]
    Persistence {
        message: &'static str,
        source: StoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn persistence(message: &'static str, source: StoreError) -> Self {
        ApiError::Persistence { message, source }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::Validation(rejection.body_text())
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(e: SigningError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg.clone())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Persistence { message, source } => {
                tracing::error!("{}: {}", message, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "persistence",
                    message.to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}
