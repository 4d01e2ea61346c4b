use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use discover_api::app::{app, AppState};
use discover_api::config::config;
use discover_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use discover_api::{is_development, is_production};

#[derive(Parser)]
#[command(name = "discover-api")]
#[command(about = "Access classification and dual-account routing service")]
#[command(version)]
struct Args {
    #[arg(long, help = "Serve from an in-memory store instead of Postgres (not allowed in production)")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config().clone();

    let default_filter = if config.api.enable_request_logging {
        "discover_api=info,tower_http=debug"
    } else {
        "discover_api=info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let args = Args::parse();
    tracing::info!("Starting Discover API in {:?} mode", config.environment);

    let store = open_store(args.memory, &config).await?;
    let bind_addr = config.bind_addr();
    let router = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Discover API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Discover API stopped");
    Ok(())
}

async fn open_store(memory: bool, config: &discover_api::config::AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    let no_database = std::env::var("DATABASE_URL").is_err();

    if memory || (is_development!() && no_database) {
        if is_production!() {
            anyhow::bail!("the in-memory store cannot be used in production");
        }
        tracing::warn!("Using the in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    if config.database.run_migrations {
        manager.migrate().await.context("failed to apply migrations")?;
    }
    Ok(Arc::new(PgStore::new(manager.pool().clone())))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
