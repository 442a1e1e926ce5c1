//! stocklens — historical stock price REST API
//!
//! Serves stock price history loaded from a CSV file through a small
//! read-only HTTP API, plus a derived cumulative-return calculation.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod services;
pub mod state;

use crate::config::Config;
use crate::state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging, build state, and serve requests until shutdown.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stocklens=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Serving stock data from {}", config.csv_path.display());

    let state = Arc::new(AppState::new(&config));
    let app = api::router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
