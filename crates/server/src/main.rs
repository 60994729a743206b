mod bootstrap;
mod health;
mod webhook;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::{Context, Result};
use pricewire_core::config::{AppConfig, LoadOptions};
use tokio::{net::TcpListener, sync::watch};

fn init_logging(config: &AppConfig) {
    use pricewire_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();

    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let listen_address = app.config.server.listen_address();
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    let listener = TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("failed to bind listener on {listen_address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        listen_address = %listen_address,
        "pricewire-server accepting webhooks"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(
        axum::serve(listener, app.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .into_future(),
    );

    tokio::select! {
        result = &mut server => {
            result.context("server task panicked")??;
            return Ok(());
        }
        signal = wait_for_shutdown() => signal?,
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "pricewire-server stopping"
    );
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined.context("server task panicked")??,
        Err(_) => tracing::warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not finish within the grace period"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
