use std::sync::Arc;

use trade_ledger::application::router::{build_router, RouterOptions};
use trade_ledger::application::state::AppState;
use trade_ledger::auth::TokenService;
use trade_ledger::config::ServerConfig;
use trade_ledger::persistence::init_database;
use trade_ledger::persistence::repository::SqliteStore;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_ledger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Trade ledger server starting...");

    // Configuration errors are fatal: never accept connections without a signing secret
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("✗ Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    let tokens = Arc::new(TokenService::from_config(&config.token)?);
    info!(
        "✓ Session tokens configured (ttl: {}s)",
        config.token.ttl_seconds
    );

    let pool = init_database(&config.database).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));

    if config.seed_sample_data {
        match store.seed_sample_portfolio().await {
            Ok(true) => info!("✓ Sample portfolio seeded"),
            Ok(false) => info!("Sample portfolio already present"),
            Err(e) => warn!("Failed to seed sample portfolio: {}", e),
        }
    }

    let state = AppState::new(store.clone(), store, tokens);
    let app = build_router(state, &RouterOptions::from(&config))?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Listening on {}", addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutting down gracefully...");
    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}
