//! SQLite store for probe results, status logs, and cluster aggregations.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::models::*;
use super::uptime::summarize_window;

/// Timestamps are stored as UTC strings in this format so that SQLite's
/// `datetime('now', …)` comparisons work lexically.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The rolling uptime statistic only ever looks at this many of the most
/// recent status log rows per target.
pub const WINDOW_LIMIT: usize = 1000;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Thread-safe store over a single SQLite file. The connection mutex
/// serializes all writers, which keeps the status-log row counts that the
/// uptime window depends on consistent under concurrent collections.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database with migrations.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // --- Status log ---

    /// Append one status log entry stamped with the current time.
    pub fn append_status(
        &self,
        engine: Engine,
        role: Role,
        host: &str,
        status: ConnectionStatus,
    ) -> Result<(), DbError> {
        self.append_status_at(engine, role, host, status, Utc::now())
    }

    /// Append one status log entry with an explicit timestamp.
    pub fn append_status_at(
        &self,
        engine: Engine,
        role: Role,
        host: &str,
        status: ConnectionStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO status_logs (timestamp, db_type, role, host, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format_ts(at),
                engine.as_str(),
                role.as_str(),
                host,
                status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// The most recent status log entries for one target, newest first,
    /// bounded at [`WINDOW_LIMIT`] rows.
    pub fn recent_window(
        &self,
        engine: Engine,
        role: Role,
    ) -> Result<Vec<(DateTime<Utc>, ConnectionStatus)>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT timestamp, status FROM status_logs
             WHERE db_type = ?1 AND role = ?2
             ORDER BY timestamp DESC, id DESC
             LIMIT ?3",
        )?;

        let rows = stmt
            .query_map(
                params![engine.as_str(), role.as_str(), WINDOW_LIMIT as i64],
                |row| {
                    let ts: String = row.get(0)?;
                    let status: String = row.get(1)?;
                    Ok((ts, status))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|(ts, status)| {
                (
                    parse_ts(&ts).unwrap_or_else(Utc::now),
                    ConnectionStatus::parse(&status),
                )
            })
            .collect())
    }

    /// Rolling uptime over the bounded window for one target.
    pub fn rolling_uptime(&self, engine: Engine, role: Role) -> Result<UptimeSummary, DbError> {
        let window = self.recent_window(engine, role)?;
        Ok(summarize_window(&window))
    }

    // --- Metrics ---

    /// Append one full probe measurement together with the rolling uptime
    /// figures computed for the same target.
    pub fn insert_metrics(
        &self,
        metrics: &NodeMetrics,
        uptime: &UptimeSummary,
    ) -> Result<i64, DbError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO metrics (
                timestamp, db_type, role, host, port, connection_status,
                cluster_version, cluster_creation_timestamp, replication_lag_seconds,
                replication_io_running, replication_sql_running,
                uptime_percentage, last_node_down_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                format_ts(Utc::now()),
                metrics.engine.as_str(),
                metrics.role.as_str(),
                metrics.host,
                metrics.port,
                metrics.connection_status.as_str(),
                metrics.server_version,
                metrics.cluster_start_time.map(format_ts),
                metrics.replication_lag_seconds,
                metrics.replication_io_running,
                metrics.replication_sql_running,
                uptime.uptime_percentage,
                uptime.last_down_time.map(format_ts),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // --- Cluster status ---

    /// Append one cluster aggregation row. The three role statuses the
    /// verdict was derived from are always stored alongside it.
    pub fn insert_cluster_status(
        &self,
        engine: Engine,
        health: ClusterHealth,
        primary: ConnectionStatus,
        secondary1: ConnectionStatus,
        secondary2: ConnectionStatus,
    ) -> Result<i64, DbError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO cluster_status (
                timestamp, db_type, status, primary_status, secondary1_status, secondary2_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                format_ts(Utc::now()),
                engine.as_str(),
                health.as_str(),
                primary.as_str(),
                secondary1.as_str(),
                secondary2.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Format a timestamp for storage.
pub fn format_ts(dt: DateTime<Utc>) -> String {
    dt.format(TS_FORMAT).to_string()
}

/// Parse a timestamp string from the database.
pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, TS_FORMAT) {
        return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
    }
    // Tolerate ISO 8601 in case rows were written by other tooling.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn test_store() -> (NamedTempFile, Store) {
        let tmp = NamedTempFile::new().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_status_window_newest_first() {
        let (_tmp, store) = test_store();
        let base = Utc::now() - Duration::minutes(10);

        for i in 0..5 {
            store
                .append_status_at(
                    Engine::Postgres,
                    Role::Primary,
                    "127.0.0.1",
                    ConnectionStatus::Up,
                    base + Duration::minutes(i),
                )
                .unwrap();
        }

        let window = store.recent_window(Engine::Postgres, Role::Primary).unwrap();
        assert_eq!(window.len(), 5);
        for pair in window.windows(2) {
            assert!(pair[0].0 >= pair[1].0);
        }
    }

    #[test]
    fn test_window_is_per_target() {
        let (_tmp, store) = test_store();
        store
            .append_status(Engine::Postgres, Role::Primary, "a", ConnectionStatus::Up)
            .unwrap();
        store
            .append_status(Engine::Mysql, Role::Primary, "b", ConnectionStatus::Down)
            .unwrap();

        let pg = store.recent_window(Engine::Postgres, Role::Primary).unwrap();
        assert_eq!(pg.len(), 1);
        assert_eq!(pg[0].1, ConnectionStatus::Up);
    }

    #[test]
    fn test_window_bounded_at_limit() {
        let (_tmp, store) = test_store();
        let base = Utc::now() - Duration::hours(2);

        // Oldest entry is down; the following WINDOW_LIMIT entries are up.
        store
            .append_status_at(
                Engine::Mysql,
                Role::Secondary1,
                "127.0.0.1",
                ConnectionStatus::Down,
                base,
            )
            .unwrap();
        for i in 0..WINDOW_LIMIT {
            store
                .append_status_at(
                    Engine::Mysql,
                    Role::Secondary1,
                    "127.0.0.1",
                    ConnectionStatus::Up,
                    base + Duration::seconds(i as i64 + 1),
                )
                .unwrap();
        }

        let uptime = store.rolling_uptime(Engine::Mysql, Role::Secondary1).unwrap();
        // The down entry has fallen out of the bounded window.
        assert_eq!(uptime.samples, WINDOW_LIMIT);
        assert_eq!(uptime.uptime_percentage, Some(100.0));
        assert_eq!(uptime.last_down_time, None);
    }

    #[test]
    fn test_rolling_uptime_mixed_window() {
        let (_tmp, store) = test_store();
        let base = Utc::now() - Duration::minutes(30);
        let down_at = base + Duration::minutes(10);

        // Oldest to newest: up, down, up, up.
        for (offset, status) in [
            (0, ConnectionStatus::Up),
            (10, ConnectionStatus::Down),
            (20, ConnectionStatus::Up),
            (25, ConnectionStatus::Up),
        ] {
            store
                .append_status_at(
                    Engine::Postgres,
                    Role::Secondary2,
                    "127.0.0.1",
                    status,
                    base + Duration::minutes(offset),
                )
                .unwrap();
        }

        let uptime = store.rolling_uptime(Engine::Postgres, Role::Secondary2).unwrap();
        assert_eq!(uptime.uptime_percentage, Some(75.0));
        assert_eq!(uptime.last_down_time.map(format_ts), Some(format_ts(down_at)));
        assert_eq!(uptime.samples, 4);
    }

    #[test]
    fn test_rolling_uptime_empty_window() {
        let (_tmp, store) = test_store();
        let uptime = store.rolling_uptime(Engine::Postgres, Role::Primary).unwrap();
        assert_eq!(uptime, UptimeSummary::no_data());
    }

    #[test]
    fn test_insert_metrics_and_cluster_rows() {
        let (_tmp, store) = test_store();
        let metrics = NodeMetrics::unreachable(Engine::Mysql, Role::Primary, "10.0.0.9", 3306);

        let id = store.insert_metrics(&metrics, &UptimeSummary::no_data()).unwrap();
        assert!(id > 0);

        let cluster_id = store
            .insert_cluster_status(
                Engine::Mysql,
                ClusterHealth::Critical,
                ConnectionStatus::Down,
                ConnectionStatus::Up,
                ConnectionStatus::Up,
            )
            .unwrap();
        assert!(cluster_id > 0);
    }

    #[test]
    fn test_ts_round_trip() {
        let now = Utc::now();
        let parsed = parse_ts(&format_ts(now)).unwrap();
        assert_eq!(format_ts(parsed), format_ts(now));
        assert!(parse_ts("not a timestamp").is_none());
    }
}
