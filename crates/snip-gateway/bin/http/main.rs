mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use snip_core::Repository;
use snip_gateway::{telemetry, App, AppState};
use snip_shortener::{RandomGenerator, ShortenerService};
use snip_storage::{InMemoryRepository, SqliteRepository};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        debug = config.debug,
        min_key_length = config.min_key_length,
        "starting snip gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(&config, InMemoryRepository::new()).await?;
        }
        StorageBackendArg::Sqlite => {
            let database_url = config
                .database_url
                .as_deref()
                .context("database url is required when storage backend is sqlite")?;
            let repository = SqliteRepository::connect(database_url).await?;
            run_server(&config, repository).await?;
        }
    }

    Ok(())
}

async fn run_server<R: Repository>(config: &CLI, repository: R) -> anyhow::Result<()> {
    let allocator_config = App::allocator_config(
        config.min_key_length,
        config.max_attempts,
        config.reserved.iter().cloned(),
    );
    let service = ShortenerService::new(repository, RandomGenerator, allocator_config)?;
    let router = App::router(AppState::new(Arc::new(service), config.debug));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
