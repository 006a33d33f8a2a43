//! pmo_seed: load demo projects, tasks and project details into the
//! configured store. Safe to run more than once.
//!
//! Usage:
//!   cargo run --bin pmo_seed

use std::sync::Arc;

use pmo_core::RecordService;
use pmo_server::config::ServerConfig;
use pmo_server::seed::seed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = config.open_store().await?;
    let service = RecordService::new(Arc::clone(&store)).with_fetch_limit(config.fetch_limit);

    let report = seed(&service).await?;
    tracing::info!(
        projects_created = report.projects_created,
        projects_existing = report.projects_existing,
        tasks_created = report.tasks_created,
        details_created = report.details_created,
        "seeding finished"
    );

    store.close().await;
    Ok(())
}
