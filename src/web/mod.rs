//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::{ServerConfig, TargetRegistry};
use crate::db::Store;
use crate::scheduler::Scheduler;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<Store>,
    pub registry: Arc<TargetRegistry>,
    pub scheduler: Arc<Scheduler>,
}

/// Web server for dbpulse.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(
        config: ServerConfig,
        store: Arc<Store>,
        registry: Arc<TargetRegistry>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            state: AppState {
                config,
                store,
                registry,
                scheduler,
            },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Collection endpoints
            .route("/metrics", get(handlers::handle_metrics))
            .route("/metrics/history", get(handlers::handle_metrics_history))
            .route("/metrics/collect", post(handlers::handle_collect))
            .route("/cluster/history", get(handlers::handle_cluster_history))
            // Read-only summary endpoints
            .route("/api/cluster-summary", get(handlers::handle_cluster_summary))
            .route("/api/node-status", get(handlers::handle_node_status))
            .route("/api/uptime-stats", get(handlers::handle_uptime_stats))
            .route("/api/cluster-trend", get(handlers::handle_cluster_trend))
            .route("/api/replication-lag", get(handlers::handle_replication_lag))
            .route(
                "/api/connection-timeline",
                get(handlers::handle_connection_timeline),
            )
            .route(
                "/api/historical-events",
                get(handlers::handle_historical_events),
            )
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
