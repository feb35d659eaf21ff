//! MySQL family probe.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{Connection, MySqlConnection, Row};

use super::{HealthProbe, ProbeError};
use crate::config::TargetConfig;
use crate::db::{ConnectionStatus, Engine, NodeMetrics, Role};

pub struct MySqlProbe;

#[async_trait]
impl HealthProbe for MySqlProbe {
    async fn check(&self, role: Role, target: &TargetConfig) -> Result<NodeMetrics, ProbeError> {
        let options = MySqlConnectOptions::new()
            .host(&target.host)
            .port(target.port)
            .username(&target.user)
            .password(&target.password)
            .database(&target.database);

        let mut conn = MySqlConnection::connect_with(&options).await?;

        let version: String = sqlx::query_scalar("SELECT VERSION()")
            .fetch_one(&mut conn)
            .await?;

        // MySQL reports uptime seconds rather than a start timestamp; derive
        // the start time from it.
        let start_time = sqlx::query("SHOW GLOBAL STATUS LIKE 'Uptime'")
            .fetch_optional(&mut conn)
            .await?
            .and_then(|row| row.try_get::<String, _>("Value").ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(|secs| Utc::now() - Duration::seconds(secs));

        let mut metrics = NodeMetrics {
            engine: Engine::Mysql,
            role,
            host: target.host.clone(),
            port: target.port,
            connection_status: ConnectionStatus::Up,
            server_version: Some(version),
            cluster_start_time: start_time,
            replication_lag_seconds: None,
            replication_io_running: None,
            replication_sql_running: None,
        };

        if role.is_secondary() {
            if let Some(row) = sqlx::query("SHOW SLAVE STATUS")
                .fetch_optional(&mut conn)
                .await?
            {
                metrics.replication_lag_seconds = seconds_behind(&row);
                metrics.replication_io_running =
                    row.try_get::<Option<String>, _>("Slave_IO_Running").ok().flatten();
                metrics.replication_sql_running =
                    row.try_get::<Option<String>, _>("Slave_SQL_Running").ok().flatten();
            }
        }

        conn.close().await.ok();
        Ok(metrics)
    }
}

/// `Seconds_Behind_Master` arrives as an integer or a string depending on the
/// server version; NULL while the SQL thread is stopped.
fn seconds_behind(row: &MySqlRow) -> Option<f64> {
    if let Ok(value) = row.try_get::<Option<i64>, _>("Seconds_Behind_Master") {
        return value.map(|v| v as f64);
    }
    row.try_get::<Option<String>, _>("Seconds_Behind_Master")
        .ok()
        .flatten()
        .and_then(|v| v.parse().ok())
}
