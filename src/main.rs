//! magpie server entrypoint

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use magpie::config::ServerConfig;
use magpie::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = ServerConfig::parse();
    let state = AppState::with_defaults(&config)?;
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!("listening on http://{}", config.bind);
    tracing::info!("store is in-memory; data resets on restart");

    axum::serve(listener, app).await.context("Server error")
}
