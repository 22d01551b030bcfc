// src/main.rs

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tracing::{error, info};

mod api;
mod config;
mod core;
mod logging;

use api::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let config = AppConfig::from_env()?;
    let bind = config.bind;
    info!(
        %bind,
        portscan_timeout_s = config.timeouts.portscan.as_secs(),
        fuzz_timeout_s = config.timeouts.fuzz.as_secs(),
        crawl_timeout_s = config.timeouts.crawl.as_secs(),
        "Configuration loaded."
    );

    let app = api::create_router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(bind)
        .await
        .wrap_err_with(|| format!("Could not bind to {bind}"))?;
    info!(%bind, "recon-api listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!("Server stopped.");
    Ok(())
}

/// Resolves on Ctrl+C so in-flight requests can finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for the shutdown signal.");
    }
}
