//! PostgreSQL family probe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use super::{HealthProbe, ProbeError};
use crate::config::TargetConfig;
use crate::db::{ConnectionStatus, Engine, NodeMetrics, Role};

pub struct PostgresProbe;

#[async_trait]
impl HealthProbe for PostgresProbe {
    async fn check(&self, role: Role, target: &TargetConfig) -> Result<NodeMetrics, ProbeError> {
        let options = PgConnectOptions::new()
            .host(&target.host)
            .port(target.port)
            .username(&target.user)
            .password(&target.password)
            .database(&target.database);

        let mut conn = PgConnection::connect_with(&options).await?;

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&mut conn)
            .await?;

        let start_time: DateTime<Utc> = sqlx::query_scalar("SELECT pg_postmaster_start_time()")
            .fetch_one(&mut conn)
            .await?;

        let mut metrics = NodeMetrics {
            engine: Engine::Postgres,
            role,
            host: target.host.clone(),
            port: target.port,
            connection_status: ConnectionStatus::Up,
            server_version: Some(version),
            cluster_start_time: Some(start_time),
            replication_lag_seconds: None,
            replication_io_running: None,
            replication_sql_running: None,
        };

        if role.is_secondary() {
            // NULL when the node has never replayed a transaction (or is not
            // actually in recovery).
            let lag: Option<f64> = sqlx::query_scalar(
                "SELECT EXTRACT(EPOCH FROM (now() - pg_last_xact_replay_timestamp()))::float8",
            )
            .fetch_one(&mut conn)
            .await?;
            metrics.replication_lag_seconds = lag;
        }

        conn.close().await.ok();
        Ok(metrics)
    }
}
