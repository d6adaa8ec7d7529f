//! Persistence Layer
//!
//! SQLite-backed storage for the ledger: holdings, positions, orders and the
//! user credential table. Async access goes through a shared `sqlx` pool.
//!
//! # Database Schema
//!
//! ## Holdings Table
//! - id: INTEGER primary key
//! - name: Instrument name (e.g., "INFY")
//! - qty, avg, price: REAL
//! - net, day: Display-formatted percentage change
//!
//! ## Positions Table
//! - Same columns as holdings plus `product` and `is_loss`
//!
//! ## Orders Table
//! - id: UUID
//! - name, qty, price
//! - mode: "buy" or "sell"
//! - placed_by: Identity of the authenticated submitter
//! - created_at: Timestamp
//!
//! ## Users Table
//! - id: UUID (the token identity)
//! - username, email: Unique
//! - password_hash: argon2 PHC string
//! - created_at: Timestamp

pub mod models;
pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

/// Initialize the database connection pool and run migrations
///
/// # Errors
/// Returns error if the connection fails or a migration fails
pub async fn init_database(config: &DatabaseConfig) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", config.url);

    // Ensure data directory exists
    if let Some(db_path) = config.url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
            })?;
        }
    }

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !config.log_queries {
        options = options.disable_statement_logging();
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

/// Run database migrations
async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    let statements: [(&str, &str); 7] = [
        (
            "holdings table",
            r#"
            CREATE TABLE IF NOT EXISTS holdings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                qty REAL NOT NULL,
                avg REAL NOT NULL,
                price REAL NOT NULL,
                net TEXT NOT NULL,
                day TEXT NOT NULL
            )
            "#,
        ),
        (
            "positions table",
            r#"
            CREATE TABLE IF NOT EXISTS positions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product TEXT NOT NULL,
                name TEXT NOT NULL,
                qty REAL NOT NULL,
                avg REAL NOT NULL,
                price REAL NOT NULL,
                net TEXT NOT NULL,
                day TEXT NOT NULL,
                is_loss BOOLEAN NOT NULL DEFAULT 0
            )
            "#,
        ),
        (
            "users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        (
            "orders table",
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                qty REAL NOT NULL,
                price REAL NOT NULL,
                mode TEXT NOT NULL CHECK(mode IN ('buy', 'sell')),
                placed_by TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        (
            "orders index",
            "CREATE INDEX IF NOT EXISTS idx_orders_placed_by ON orders(placed_by)",
        ),
        (
            "orders index",
            "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
        ),
        (
            "users index",
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        ),
    ];

    for (what, sql) in statements {
        sqlx::query(sql).execute(pool).await.map_err(|e| {
            DatabaseError::MigrationError(format!("Failed to create {}: {}", what, e))
        })?;
    }

    info!("✓ Database migrations completed successfully");

    Ok(())
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/ledger.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Enable query logging
    pub log_queries: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/ledger.db".to_string(),
            max_connections: 5,
            log_queries: cfg!(debug_assertions),
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory database, used by tests
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            log_queries: false,
        }
    }

    /// Load from a variable lookup (see [`crate::config::ServerConfig::from_lookup`])
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = lookup("DATABASE_URL").unwrap_or(defaults.url);

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .filter(|n: &u32| *n > 0)
            .unwrap_or(defaults.max_connections);

        let log_queries = lookup("DATABASE_LOG_QUERIES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_queries);

        Self {
            url,
            max_connections,
            log_queries,
        }
    }
}
