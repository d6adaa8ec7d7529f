use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Reasons a protected request is rejected.
///
/// Each maps to HTTP 401 with a stable `kind` so clients can tell
/// "log in again" (`expired`) from "fix the request" (`missing`, `invalid`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer credential")]
    MissingCredential,

    /// Malformed header or token, bad signature, wrong issuer, or revoked
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing",
            AuthError::InvalidToken(_) => "invalid",
            AuthError::ExpiredToken => "expired",
        }
    }

    /// Client-facing message. Never includes decoder details.
    fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "Authorization: Bearer <token> header is required",
            AuthError::InvalidToken(_) => "Session token is malformed or its signature is invalid",
            AuthError::ExpiredToken => "Session token has expired, log in again",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "kind": self.kind(),
            "message": self.public_message(),
        }));

        let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}
