use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::token::{Claims, TokenService};
use crate::auth::AuthError;
use crate::domain::entities::identity::Identity;

/// Hook for rejecting individual tokens before their expiry.
///
/// Runs after signature and expiry checks. It is synchronous so the
/// middleware never suspends between verification and the handler.
pub trait RevocationCheck: Send + Sync {
    fn is_revoked(&self, claims: &Claims) -> bool;
}

/// Default hook: no token is ever revoked
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevocation;

impl RevocationCheck for NoRevocation {
    fn is_revoked(&self, _claims: &Claims) -> bool {
        false
    }
}

/// Read-only state shared by every invocation of [`require_auth`]
#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<TokenService>,
    revocation: Arc<dyn RevocationCheck>,
}

impl AuthState {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            revocation: Arc::new(NoRevocation),
        }
    }

    pub fn with_revocation(mut self, revocation: Arc<dyn RevocationCheck>) -> Self {
        self.revocation = revocation;
        self
    }

    /// Authenticate a request's headers against the current time
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        self.authenticate_at(headers, Utc::now())
    }

    /// Presence → signature/structure → expiry → identity, in that order
    pub fn authenticate_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.tokens.verify_at(token, now)?;

        if self.revocation.is_revoked(&claims) {
            return Err(AuthError::InvalidToken("token revoked".to_string()));
        }

        Ok(Identity::new(claims.sub))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A missing header or an empty token is [`AuthError::MissingCredential`];
/// any other scheme or an undecodable header is [`AuthError::InvalidToken`].
/// Scheme and token must be separated by a single space; a tab is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("authorization header is not valid ASCII".to_string()))?
        .trim();

    if value.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidToken(
            "unsupported authorization scheme".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// Middleware to require a valid session token on protected routes.
///
/// Either attaches [`AuthenticatedUser`] to the request and runs the handler,
/// or returns 401 without running it.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = match auth.authenticate(request.headers()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(
                kind = e.kind(),
                path = %request.uri().path(),
                "Rejected unauthenticated request: {}",
                e
            );
            return Err(e);
        }
    };

    tracing::debug!(identity = %identity, "Authenticated request");
    request.extensions_mut().insert(AuthenticatedUser(identity));
    Ok(next.run(request).await)
}

/// Identity attached by [`require_auth`].
///
/// Extracting it on a route without the middleware fails closed with
/// [`AuthError::MissingCredential`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}
