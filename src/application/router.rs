use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::handlers::{auth, health_check, orders, portfolio};
use crate::application::state::AppState;
use crate::auth::require_auth;
use crate::config::{ConfigError, ServerConfig};
use crate::rate_limit::{create_rate_limiter, rate_limit_middleware, RateLimiterConfig};

/// Maximum accepted request body size.
///
/// Enforced by the body extractors, so it only applies once a protected
/// request has passed [`require_auth`].
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// HTTP-surface settings taken from [`ServerConfig`]
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_allowed_origin: Option<String>,
    pub auth_rate_limit_per_minute: u32,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_allowed_origin: None,
            auth_rate_limit_per_minute: RateLimiterConfig::default().requests_per_minute,
        }
    }
}

impl From<&ServerConfig> for RouterOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            cors_allowed_origin: config.cors_allowed_origin.clone(),
            auth_rate_limit_per_minute: config.auth_rate_limit_per_minute,
        }
    }
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    match origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidValue {
                key: "CORS_ALLOWED_ORIGIN",
                value: origin.to_string(),
            })?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
        }
        None => Ok(CorsLayer::permissive()),
    }
}

/// Build the application router.
///
/// Ledger routes and `/api/auth/me` sit behind [`require_auth`]; register and
/// login are public but rate-limited.
pub fn build_router(state: AppState, options: &RouterOptions) -> Result<Router, ConfigError> {
    let protected = Router::new()
        .route("/allholdings", get(portfolio::all_holdings))
        .route("/allPositions", get(portfolio::all_positions))
        .route("/newOrder", post(orders::new_order))
        .route("/api/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state.auth_state(), require_auth));

    let limiter = create_rate_limiter(RateLimiterConfig {
        requests_per_minute: options.auth_rate_limit_per_minute,
    });
    let public_auth = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware));

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .merge(public_auth)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(options.cors_allowed_origin.as_deref())?)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state);

    Ok(router)
}
