//! Engine health probes.
//!
//! One implementation per engine family, normalized into the common
//! [`NodeMetrics`] shape so callers never need to know which engine produced
//! a result.

mod mysql;
mod postgres;

pub use mysql::MySqlProbe;
pub use postgres::PostgresProbe;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TargetConfig;
use crate::db::{Engine, NodeMetrics, Role, Store};

/// Hard ceiling on one probe's connect plus queries. A hung network call is
/// bounded only by this.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(e) => ProbeError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => ProbeError::Connection(e.to_string()),
            sqlx::Error::Configuration(e) => ProbeError::Connection(e.to_string()),
            other => ProbeError::Query(other.to_string()),
        }
    }
}

/// Capability set one engine family must provide: connect, get version, get
/// start time, get replication state for secondaries. Adding a third engine
/// means adding one implementation; the aggregator and scheduler stay
/// untouched.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, role: Role, target: &TargetConfig) -> Result<NodeMetrics, ProbeError>;
}

/// Select the prober for an engine family.
pub fn prober_for(engine: Engine) -> &'static dyn HealthProbe {
    match engine {
        Engine::Postgres => &PostgresProbe,
        Engine::Mysql => &MySqlProbe,
    }
}

/// Run one probe against one target. Never fails past this boundary: any
/// connection, query, or timeout error becomes a `down` result with the
/// diagnostic logged. Exactly one status log entry is appended with the
/// resolved status, on the success and failure paths alike.
pub async fn probe_target(
    store: &Store,
    engine: Engine,
    role: Role,
    target: &TargetConfig,
) -> NodeMetrics {
    let outcome = tokio::time::timeout(PROBE_TIMEOUT, prober_for(engine).check(role, target)).await;

    let metrics = match outcome {
        Ok(Ok(metrics)) => metrics,
        Ok(Err(e)) => {
            tracing::error!(
                "Probe failed for {} {} at {}:{}: {}",
                engine.as_str(),
                role.as_str(),
                target.host,
                target.port,
                e
            );
            NodeMetrics::unreachable(engine, role, &target.host, target.port)
        }
        Err(_) => {
            tracing::error!(
                "Probe timed out for {} {} at {}:{} after {:?}",
                engine.as_str(),
                role.as_str(),
                target.host,
                target.port,
                PROBE_TIMEOUT
            );
            NodeMetrics::unreachable(engine, role, &target.host, target.port)
        }
    };

    if let Err(e) = store.append_status(engine, role, &target.host, metrics.connection_status) {
        tracing::error!(
            "Failed to log status for {} {}: {}",
            engine.as_str(),
            role.as_str(),
            e
        );
    }

    metrics
}
