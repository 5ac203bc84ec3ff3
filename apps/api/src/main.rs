//! # TeknoRoma API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup                                                                │
//! │    1. tracing (RUST_LOG, else config.log_level)                         │
//! │    2. AppConfig::load()   defaults → teknoroma.toml → TEKNOROMA_*       │
//! │    3. Database::new()     pool + embedded migrations                    │
//! │    4. AppState            NotificationHub + ExchangeRateService         │
//! │    5. axum::serve         until SIGINT / SIGTERM                        │
//! │    6. Database::close()                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use teknoroma_api::config::AppConfig;
use teknoroma_api::services::{ExchangeRateService, NotificationHub};
use teknoroma_api::{create_app, AppState};
use teknoroma_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!("Starting TeknoRoma API server...");
    info!(
        addr = %config.addr(),
        database = %config.database_path,
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path)
            .max_connections(config.max_connections)
            .busy_timeout(config.busy_timeout()),
    )
    .await
    .context("opening database")?;
    info!("Database ready");

    let hub = NotificationHub::new(config.notification_capacity);
    let (today_ttl, history_ttl) = config.rate_cache_ttls();
    let rates = ExchangeRateService::with_fallback().with_ttls(today_ttl, history_ttl);
    let state = AppState::new(db.clone(), hub, rates);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;
    info!(addr = %config.addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. If a handler cannot be installed that
/// branch never resolves and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
