//! dbpulse - database replica monitoring daemon.
//!
//! Probes two replication clusters (PostgreSQL and MySQL, each one primary
//! plus two secondaries) on a fixed interval, records connectivity and
//! replication health in SQLite, and serves uptime and cluster-health
//! summaries over HTTP.

mod config;
mod db;
mod probe;
mod scheduler;
mod web;

use config::{ServerConfig, TargetRegistry};
use db::Store;
use scheduler::Scheduler;
use web::Server;

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("dbpulse=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    let registry = Arc::new(TargetRegistry::load());
    tracing::info!("Starting dbpulse on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    // Start the collection scheduler
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        registry.clone(),
        Duration::from_secs(cfg.collect_interval_secs),
    ));
    scheduler.clone().start();

    // Start web server
    let server = Server::new(cfg, store, registry, scheduler);
    server.start().await?;

    Ok(())
}
