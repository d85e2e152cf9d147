mod cli;
mod telemetry;

use crate::cli::{Cli, StorageBackendArg};
use anyhow::Context;
use burrow_core::{Repository, Shortener};
use burrow_gateway::{App, AppState};
use burrow_generator::RandomGenerator;
use burrow_shortener::{spawn_sweeper, ShortenerService};
use burrow_storage::{InMemoryRepository, MySqlRepository, RedisRepository};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Cli::parse();
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        "starting burrow gateway"
    );

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => build_shortener(&config, InMemoryRepository::new()),
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            repository
                .ensure_schema()
                .await
                .context("failed to prepare mysql schema")?;
            build_shortener(&config, repository)
        }
        StorageBackendArg::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let repository = RedisRepository::connect(url)
                .await
                .context("failed to connect to redis")?;
            build_shortener(&config, repository)
        }
    };

    let sweeper = config.sweep_interval().map(|interval| {
        info!(interval_secs = interval.as_secs(), "starting expiry sweeper");
        spawn_sweeper(Arc::clone(&shortener), interval)
    });

    let app = App::router(AppState::new(shortener, config.base_url.clone()));
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("gateway stopped");

    Ok(())
}

fn build_shortener<R: Repository>(config: &Cli, repository: R) -> Arc<dyn Shortener> {
    let service =
        ShortenerService::new(repository, RandomGenerator::new()).with_settings(config.settings());
    Arc::new(service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
