use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::AuthenticatedUser;
use crate::domain::entities::user::{NewUser, User};
use crate::domain::repositories::ledger_store::StoreError;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let username = req.username.trim();
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::Validation(
            "Username must be between 3 and 32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ApiError::Validation(
            "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }

    let email = req.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(ApiError::Validation("Email address is invalid".to_string())),
    }

    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    Ok(())
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload?;
    validate_registration(&req)?;

    let password_hash = hash_password_blocking(req.password).await?;
    let user = state
        .credentials
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                ApiError::Conflict("Email or username is already registered".to_string())
            }
            other => ApiError::persistence("Error creating user", other),
        })?;

    let issued = state.tokens.issue(&user.id)?;
    tracing::info!(user_id = %user.id, "✓ Registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }),
    ))
}

/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;

    let credentials = state
        .credentials
        .find_by_email(&normalize_email(&req.email))
        .await
        .map_err(|e| ApiError::persistence("Error logging in", e))?;

    let Some(credentials) = credentials else {
        tracing::warn!("Login failed: unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password_blocking(req.password, credentials.password_hash).await? {
        tracing::warn!(user_id = %credentials.user.id, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let issued = state.tokens.issue(&credentials.user.id)?;
    tracing::info!(user_id = %credentials.user.id, "✓ User logged in");

    Ok(Json(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: credentials.user,
    }))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<User>, ApiError> {
    state
        .credentials
        .find_by_id(&identity)
        .await
        .map_err(|e| ApiError::persistence("Error fetching user", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User no longer exists".to_string()))
}
