use crate::persistence::DatabaseConfig;
use crate::secrets::{SecretError, SigningSecret};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default session lifetime: 24 hours
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Longest accepted session lifetime: 10 years
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Errors that prevent the server from starting
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is not set. Generate one with: openssl rand -base64 48")]
    MissingSigningSecret,

    #[error("JWT_SECRET is unusable: {0}")]
    InvalidSigningSecret(#[from] SecretError),

    #[error("Token TTL must be between 1 and {max} seconds, got {0}", max = MAX_TOKEN_TTL_SECONDS)]
    InvalidTokenTtl(i64),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Session token settings
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: SigningSecret,
    pub ttl_seconds: i64,
}

/// Server configuration, read once at startup and passed down explicitly
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    /// Single browser origin allowed with credentials; permissive CORS when unset
    pub cors_allowed_origin: Option<String>,
    pub auth_rate_limit_per_minute: u32,
    pub seed_sample_data: bool,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<ServerConfig, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<ServerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSigningSecret)?;
        let secret = SigningSecret::new(secret)?;

        let ttl_seconds = match lookup("TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let value = raw.trim().parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                    key: "TOKEN_TTL_SECONDS",
                    value: raw.clone(),
                })?;
                if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&value) {
                    return Err(ConfigError::InvalidTokenTtl(value));
                }
                value
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let host = match lookup("HOST") {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                value: raw.clone(),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 3002,
        };

        let mut auth_rate_limit_per_minute = 30;
        if let Ok(value) = lookup("AUTH_RATE_LIMIT_PER_MINUTE")
            .unwrap_or_default()
            .parse::<u32>()
        {
            if value > 0 && value <= 10_000 {
                auth_rate_limit_per_minute = value;
            }
        }

        let seed_sample_data = lookup("SEED_SAMPLE_DATA")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        Ok(ServerConfig {
            host,
            port,
            database: DatabaseConfig::from_lookup(&lookup),
            token: TokenConfig { secret, ttl_seconds },
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|s| !s.trim().is_empty()),
            auth_rate_limit_per_minute,
            seed_sample_data,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
