//! pmo_server: standalone REST server for project reporting.
//!
//! Configuration is read from the environment (and `.env` when present);
//! see `pmo_server::config` for the variables.

use std::sync::Arc;

use anyhow::Context;
use pmo_core::RecordService;
use pmo_server::config::ServerConfig;
use pmo_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pmo_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = config.open_store().await?;

    let service = Arc::new(
        RecordService::new(Arc::clone(&store)).with_fetch_limit(config.fetch_limit),
    );
    let app = build_router(service, &config.cors_origins);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!(
        store = store.backend(),
        "pmo_server listening on {}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    store.close().await;
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("could not register signal handlers, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
