//! Time-range-filtered read access over the durable stores.
//!
//! All queries here tolerate concurrent writers and may observe a
//! partially-completed collection cycle; they never take the scheduler's run
//! lock.

use rusqlite::params;
use serde::Serialize;

use super::models::*;
use super::store::{DbError, Store};

/// Shorthand time range: `{N}m`, `{N}h`, `{N}d`, or `{N}M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUnit {
    Minutes,
    Hours,
    Days,
    Months,
}

impl RangeUnit {
    fn sqlite_name(&self) -> &'static str {
        match self {
            RangeUnit::Minutes => "minutes",
            RangeUnit::Hours => "hours",
            RangeUnit::Days => "days",
            RangeUnit::Months => "months",
        }
    }
}

/// A parsed logical time range reaching back from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub amount: i64,
    pub unit: RangeUnit,
}

impl TimeRange {
    /// The window used whenever a range parameter is missing or malformed.
    pub const FALLBACK: TimeRange = TimeRange {
        amount: 1,
        unit: RangeUnit::Days,
    };

    pub const fn hours(amount: i64) -> TimeRange {
        TimeRange {
            amount,
            unit: RangeUnit::Hours,
        }
    }

    /// Parse a shorthand string. Anything unrecognized falls back to one day
    /// instead of erroring.
    pub fn parse(s: &str) -> TimeRange {
        let Some(unit) = s.chars().last().and_then(|c| match c {
            'm' => Some(RangeUnit::Minutes),
            'h' => Some(RangeUnit::Hours),
            'd' => Some(RangeUnit::Days),
            'M' => Some(RangeUnit::Months),
            _ => None,
        }) else {
            return TimeRange::FALLBACK;
        };

        match s[..s.len() - 1].parse::<i64>() {
            Ok(amount) if amount > 0 => TimeRange { amount, unit },
            _ => TimeRange::FALLBACK,
        }
    }

    /// Parse an optional query parameter, falling back when absent.
    pub fn parse_or(s: Option<&str>, default: TimeRange) -> TimeRange {
        match s {
            Some(s) => TimeRange::parse(s),
            None => default,
        }
    }

    /// Render as a SQLite `datetime('now', …)` modifier, e.g. `-10 minutes`.
    pub fn sqlite_modifier(&self) -> String {
        format!("-{} {}", self.amount, self.unit.sqlite_name())
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self.unit {
            RangeUnit::Minutes => 'm',
            RangeUnit::Hours => 'h',
            RangeUnit::Days => 'd',
            RangeUnit::Months => 'M',
        };
        write!(f, "{}{}", self.amount, suffix)
    }
}

/// Per-node aggregate over a calendar range.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatusStat {
    pub db_type: String,
    pub role: String,
    pub current_status: String,
    pub uptime_percentage: f64,
    pub total_checks: i64,
    pub up_count: i64,
    pub down_count: i64,
    pub last_check: String,
}

/// Calendar-range statistics over the stored `uptime_percentage` column.
/// Not the rolling window figure; see `db::uptime` for that one.
#[derive(Debug, Clone, Serialize)]
pub struct UptimeStat {
    pub db_type: String,
    pub role: String,
    pub average_uptime: f64,
    pub minimum_uptime: f64,
    pub maximum_uptime: f64,
    pub measurement_count: i64,
}

/// One hourly status bucket of cluster history.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub db_type: String,
    pub timestamp: String,
    pub status: String,
    pub count: i64,
}

/// One replication lag sample.
#[derive(Debug, Clone, Serialize)]
pub struct LagPoint {
    pub db_type: String,
    pub role: String,
    pub lag_seconds: f64,
    pub timestamp: String,
}

/// One connection status sample with its hour bucket.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub db_type: String,
    pub role: String,
    pub status: String,
    pub timestamp: String,
    pub hour: String,
}

/// An outage event derived from the status log.
#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub event: String,
    pub severity: String,
    pub timestamp: String,
}

/// Latest cluster verdict per engine.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub db_type: String,
    pub status: String,
    pub primary_status: String,
    pub secondary1_status: String,
    pub secondary2_status: String,
    pub timestamp: String,
}

impl Store {
    /// Metrics rows within the last `hours`, optionally filtered by engine
    /// and role, newest first.
    pub fn metrics_history(
        &self,
        hours: i64,
        engine: Option<Engine>,
        role: Option<Role>,
    ) -> Result<Vec<MetricsRow>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, db_type, role, host, port, connection_status,
                    cluster_version, cluster_creation_timestamp, replication_lag_seconds,
                    replication_io_running, replication_sql_running,
                    uptime_percentage, last_node_down_time
             FROM metrics
             WHERE timestamp >= datetime('now', ?1)
               AND (?2 IS NULL OR db_type = ?2)
               AND (?3 IS NULL OR role = ?3)
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(
                params![
                    TimeRange::hours(hours).sqlite_modifier(),
                    engine.map(|e| e.as_str()),
                    role.map(|r| r.as_str()),
                ],
                |row| {
                    Ok(MetricsRow {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        db_type: row.get(2)?,
                        role: row.get(3)?,
                        host: row.get(4)?,
                        port: row.get(5)?,
                        connection_status: row.get(6)?,
                        cluster_version: row.get(7)?,
                        cluster_creation_timestamp: row.get(8)?,
                        replication_lag_seconds: row.get(9)?,
                        replication_io_running: row.get(10)?,
                        replication_sql_running: row.get(11)?,
                        uptime_percentage: row.get(12)?,
                        last_node_down_time: row.get(13)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Cluster aggregation rows within the last `hours`, newest first.
    pub fn cluster_history(
        &self,
        hours: i64,
        engine: Option<Engine>,
    ) -> Result<Vec<ClusterStatusRow>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, db_type, status,
                    primary_status, secondary1_status, secondary2_status
             FROM cluster_status
             WHERE timestamp >= datetime('now', ?1)
               AND (?2 IS NULL OR db_type = ?2)
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(
                params![
                    TimeRange::hours(hours).sqlite_modifier(),
                    engine.map(|e| e.as_str()),
                ],
                |row| {
                    Ok(ClusterStatusRow {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        db_type: row.get(2)?,
                        status: row.get(3)?,
                        primary_status: row.get(4)?,
                        secondary1_status: row.get(5)?,
                        secondary2_status: row.get(6)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// The most recent cluster verdict for each engine.
    pub fn cluster_summary(&self) -> Result<Vec<ClusterSummary>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, status, primary_status, secondary1_status, secondary2_status, timestamp
             FROM cluster_status
             WHERE id IN (SELECT MAX(id) FROM cluster_status GROUP BY db_type)
             ORDER BY db_type",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ClusterSummary {
                    db_type: row.get(0)?,
                    status: row.get(1)?,
                    primary_status: row.get(2)?,
                    secondary1_status: row.get(3)?,
                    secondary2_status: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Per-node check counts and current status over a range. The bare
    /// `connection_status` column rides along with `MAX(timestamp)`, which
    /// SQLite resolves to the newest row in each group.
    pub fn node_status(&self, range: &TimeRange) -> Result<Vec<NodeStatusStat>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, role, connection_status,
                    COUNT(*) AS total_checks,
                    SUM(CASE WHEN connection_status = 'up' THEN 1 ELSE 0 END) AS up_count,
                    MAX(timestamp) AS last_check
             FROM metrics
             WHERE timestamp >= datetime('now', ?1)
             GROUP BY db_type, role",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                let total: i64 = row.get(3)?;
                let up: i64 = row.get(4)?;
                let ratio = if total > 0 {
                    (up as f64 / total as f64) * 100.0
                } else {
                    0.0
                };
                Ok(NodeStatusStat {
                    db_type: row.get(0)?,
                    role: row.get(1)?,
                    current_status: row.get(2)?,
                    uptime_percentage: (ratio * 100.0).round() / 100.0,
                    total_checks: total,
                    up_count: up,
                    down_count: total - up,
                    last_check: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Calendar-range aggregate of the stored `uptime_percentage` column.
    pub fn uptime_stats(&self, range: &TimeRange) -> Result<Vec<UptimeStat>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, role,
                    AVG(uptime_percentage), MIN(uptime_percentage), MAX(uptime_percentage),
                    COUNT(*)
             FROM metrics
             WHERE timestamp >= datetime('now', ?1)
               AND uptime_percentage IS NOT NULL
             GROUP BY db_type, role",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                let avg: f64 = row.get(2)?;
                Ok(UptimeStat {
                    db_type: row.get(0)?,
                    role: row.get(1)?,
                    average_uptime: (avg * 100.0).round() / 100.0,
                    minimum_uptime: row.get(3)?,
                    maximum_uptime: row.get(4)?,
                    measurement_count: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Hourly-bucketed cluster status counts per engine, oldest first.
    pub fn cluster_trend(&self, range: &TimeRange) -> Result<Vec<TrendPoint>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type,
                    strftime('%Y-%m-%d %H:00:00', timestamp) AS hour_timestamp,
                    status,
                    COUNT(*) AS status_count
             FROM cluster_status
             WHERE timestamp >= datetime('now', ?1)
             GROUP BY db_type, hour_timestamp, status
             ORDER BY hour_timestamp ASC",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                Ok(TrendPoint {
                    db_type: row.get(0)?,
                    timestamp: row.get(1)?,
                    status: row.get(2)?,
                    count: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Replication lag samples for secondaries, oldest first.
    pub fn replication_lag(&self, range: &TimeRange) -> Result<Vec<LagPoint>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, role, replication_lag_seconds, timestamp
             FROM metrics
             WHERE role IN ('secondary1', 'secondary2')
               AND timestamp >= datetime('now', ?1)
               AND replication_lag_seconds IS NOT NULL
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                Ok(LagPoint {
                    db_type: row.get(0)?,
                    role: row.get(1)?,
                    lag_seconds: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Connection status samples with their hour buckets, oldest first.
    pub fn connection_timeline(&self, range: &TimeRange) -> Result<Vec<TimelinePoint>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, role, connection_status, timestamp,
                    strftime('%Y-%m-%d %H:00:00', timestamp) AS hour_group
             FROM metrics
             WHERE timestamp >= datetime('now', ?1)
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                Ok(TimelinePoint {
                    db_type: row.get(0)?,
                    role: row.get(1)?,
                    status: row.get(2)?,
                    timestamp: row.get(3)?,
                    hour: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Outage events derived from the status log: every `down` row becomes
    /// one event, newest first, capped at 100. Primary outages are critical,
    /// secondary outages are warnings.
    pub fn recent_outage_events(&self, range: &TimeRange) -> Result<Vec<EventRow>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT db_type, role, host, timestamp
             FROM status_logs
             WHERE status = 'down'
               AND timestamp >= datetime('now', ?1)
             ORDER BY timestamp DESC, id DESC
             LIMIT 100",
        )?;

        let rows = stmt
            .query_map(params![range.sqlite_modifier()], |row| {
                let db_type: String = row.get(0)?;
                let role: String = row.get(1)?;
                let host: String = row.get(2)?;
                let timestamp: String = row.get(3)?;
                Ok(EventRow {
                    event: format!("{} {} ({}) reported down", db_type, role, host),
                    severity: if role == "primary" {
                        "critical".to_string()
                    } else {
                        "warning".to_string()
                    },
                    timestamp,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{format_ts, UptimeSummary};
    use chrono::{Duration, Utc};
    use tempfile::NamedTempFile;

    #[test]
    fn test_range_shorthand_parsing() {
        assert_eq!(
            TimeRange::parse("10m"),
            TimeRange { amount: 10, unit: RangeUnit::Minutes }
        );
        assert_eq!(
            TimeRange::parse("2h"),
            TimeRange { amount: 2, unit: RangeUnit::Hours }
        );
        assert_eq!(
            TimeRange::parse("3d"),
            TimeRange { amount: 3, unit: RangeUnit::Days }
        );
        assert_eq!(
            TimeRange::parse("1M"),
            TimeRange { amount: 1, unit: RangeUnit::Months }
        );
    }

    #[test]
    fn test_range_fallback_on_garbage() {
        for s in ["", "h", "10", "10x", "abc", "-5h", "0d", "1.5h"] {
            assert_eq!(TimeRange::parse(s), TimeRange::FALLBACK, "input {:?}", s);
        }
        assert_eq!(TimeRange::parse_or(None, TimeRange::hours(12)), TimeRange::hours(12));
        assert_eq!(
            TimeRange::parse_or(Some("30m"), TimeRange::hours(12)),
            TimeRange { amount: 30, unit: RangeUnit::Minutes }
        );
    }

    #[test]
    fn test_sqlite_modifier() {
        assert_eq!(TimeRange::parse("10m").sqlite_modifier(), "-10 minutes");
        assert_eq!(TimeRange::parse("2h").sqlite_modifier(), "-2 hours");
        assert_eq!(TimeRange::parse("3d").sqlite_modifier(), "-3 days");
        assert_eq!(TimeRange::parse("1M").sqlite_modifier(), "-1 months");
        assert_eq!(TimeRange::FALLBACK.sqlite_modifier(), "-1 days");
    }

    fn test_store() -> (NamedTempFile, Store) {
        let tmp = NamedTempFile::new().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        (tmp, store)
    }

    fn sample_metrics(engine: Engine, role: Role, up: bool) -> NodeMetrics {
        let mut m = NodeMetrics::unreachable(engine, role, "127.0.0.1", 5432);
        if up {
            m.connection_status = ConnectionStatus::Up;
            m.server_version = Some("16.3".to_string());
            if role.is_secondary() {
                m.replication_lag_seconds = Some(0.25);
            }
        }
        m
    }

    #[test]
    fn test_metrics_history_filters_and_order() {
        let (_tmp, store) = test_store();
        store
            .insert_metrics(&sample_metrics(Engine::Postgres, Role::Primary, true), &UptimeSummary::no_data())
            .unwrap();
        store
            .insert_metrics(&sample_metrics(Engine::Postgres, Role::Secondary1, true), &UptimeSummary::no_data())
            .unwrap();
        store
            .insert_metrics(&sample_metrics(Engine::Mysql, Role::Primary, false), &UptimeSummary::no_data())
            .unwrap();

        let all = store.metrics_history(24, None, None).unwrap();
        assert_eq!(all.len(), 3);
        // Newest first.
        assert_eq!(all[0].db_type, "mysql");

        let pg = store.metrics_history(24, Some(Engine::Postgres), None).unwrap();
        assert_eq!(pg.len(), 2);

        let pg_primary = store
            .metrics_history(24, Some(Engine::Postgres), Some(Role::Primary))
            .unwrap();
        assert_eq!(pg_primary.len(), 1);
        assert_eq!(pg_primary[0].connection_status, "up");
    }

    #[test]
    fn test_metrics_history_range_excludes_old_rows() {
        let (_tmp, store) = test_store();
        store
            .insert_metrics(&sample_metrics(Engine::Postgres, Role::Primary, true), &UptimeSummary::no_data())
            .unwrap();

        // Backdate a second row past the queried window.
        {
            let conn = store.lock();
            conn.execute(
                "INSERT INTO metrics (timestamp, db_type, role, host, port, connection_status)
                 VALUES (?1, 'postgres', 'primary', '127.0.0.1', 5432, 'down')",
                params![format_ts(Utc::now() - Duration::hours(48))],
            )
            .unwrap();
        }

        let recent = store.metrics_history(24, None, None).unwrap();
        assert_eq!(recent.len(), 1);
        let wide = store.metrics_history(72, None, None).unwrap();
        assert_eq!(wide.len(), 2);
    }

    #[test]
    fn test_cluster_summary_is_latest_per_engine() {
        let (_tmp, store) = test_store();
        use ConnectionStatus::{Down, Up};

        store
            .insert_cluster_status(Engine::Postgres, ClusterHealth::Healthy, Up, Up, Up)
            .unwrap();
        store
            .insert_cluster_status(Engine::Postgres, ClusterHealth::Degraded, Up, Down, Up)
            .unwrap();
        store
            .insert_cluster_status(Engine::Mysql, ClusterHealth::Critical, Down, Down, Down)
            .unwrap();

        let summary = store.cluster_summary().unwrap();
        assert_eq!(summary.len(), 2);
        // Ordered by db_type: mysql before postgres.
        assert_eq!(summary[0].db_type, "mysql");
        assert_eq!(summary[0].status, "critical");
        assert_eq!(summary[1].db_type, "postgres");
        assert_eq!(summary[1].status, "degraded");
        assert_eq!(summary[1].secondary1_status, "down");
    }

    #[test]
    fn test_node_status_counts() {
        let (_tmp, store) = test_store();
        // Backdate the up row so the two checks have distinct timestamps.
        {
            let conn = store.lock();
            conn.execute(
                "INSERT INTO metrics (timestamp, db_type, role, host, port, connection_status)
                 VALUES (?1, 'mysql', 'primary', '127.0.0.1', 3306, 'up')",
                params![format_ts(Utc::now() - Duration::minutes(5))],
            )
            .unwrap();
        }
        store
            .insert_metrics(&sample_metrics(Engine::Mysql, Role::Primary, false), &UptimeSummary::no_data())
            .unwrap();

        let stats = store.node_status(&TimeRange::hours(12)).unwrap();
        assert_eq!(stats.len(), 1);
        let stat = &stats[0];
        assert_eq!(stat.total_checks, 2);
        assert_eq!(stat.up_count, 1);
        assert_eq!(stat.down_count, 1);
        assert_eq!(stat.uptime_percentage, 50.0);
        // Newest row's status rides along with MAX(timestamp).
        assert_eq!(stat.current_status, "down");
    }

    #[test]
    fn test_uptime_stats_aggregates_stored_column() {
        let (_tmp, store) = test_store();
        let up = sample_metrics(Engine::Postgres, Role::Primary, true);
        for pct in [90.0, 100.0] {
            store
                .insert_metrics(
                    &up,
                    &UptimeSummary {
                        uptime_percentage: Some(pct),
                        last_down_time: None,
                        samples: 10,
                    },
                )
                .unwrap();
        }
        // Rows without a stored percentage are excluded from the aggregate.
        store
            .insert_metrics(&up, &UptimeSummary::no_data())
            .unwrap();

        let stats = store.uptime_stats(&TimeRange::hours(24)).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].average_uptime, 95.0);
        assert_eq!(stats[0].minimum_uptime, 90.0);
        assert_eq!(stats[0].maximum_uptime, 100.0);
        assert_eq!(stats[0].measurement_count, 2);
    }

    #[test]
    fn test_cluster_trend_buckets_by_hour() {
        let (_tmp, store) = test_store();
        use ConnectionStatus::{Down, Up};

        store
            .insert_cluster_status(Engine::Postgres, ClusterHealth::Healthy, Up, Up, Up)
            .unwrap();
        store
            .insert_cluster_status(Engine::Postgres, ClusterHealth::Healthy, Up, Up, Up)
            .unwrap();
        store
            .insert_cluster_status(Engine::Postgres, ClusterHealth::Critical, Down, Up, Up)
            .unwrap();

        let trend = store.cluster_trend(&TimeRange::hours(1)).unwrap();
        let healthy: Vec<_> = trend.iter().filter(|t| t.status == "healthy").collect();
        let critical: Vec<_> = trend.iter().filter(|t| t.status == "critical").collect();
        assert_eq!(healthy.iter().map(|t| t.count).sum::<i64>(), 2);
        assert_eq!(critical.iter().map(|t| t.count).sum::<i64>(), 1);
        for t in &trend {
            assert!(t.timestamp.ends_with(":00:00"), "hour bucket: {}", t.timestamp);
        }
    }

    #[test]
    fn test_replication_lag_secondaries_only() {
        let (_tmp, store) = test_store();
        store
            .insert_metrics(&sample_metrics(Engine::Mysql, Role::Primary, true), &UptimeSummary::no_data())
            .unwrap();
        store
            .insert_metrics(&sample_metrics(Engine::Mysql, Role::Secondary1, true), &UptimeSummary::no_data())
            .unwrap();
        store
            .insert_metrics(&sample_metrics(Engine::Mysql, Role::Secondary2, false), &UptimeSummary::no_data())
            .unwrap();

        let lag = store.replication_lag(&TimeRange::hours(24)).unwrap();
        // Primary has no lag field; the down secondary has none recorded.
        assert_eq!(lag.len(), 1);
        assert_eq!(lag[0].role, "secondary1");
        assert_eq!(lag[0].lag_seconds, 0.25);
    }

    #[test]
    fn test_connection_timeline_hour_groups() {
        let (_tmp, store) = test_store();
        store
            .insert_metrics(&sample_metrics(Engine::Postgres, Role::Primary, true), &UptimeSummary::no_data())
            .unwrap();

        let timeline = store.connection_timeline(&TimeRange::hours(48)).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].status, "up");
        assert!(timeline[0].hour.ends_with(":00:00"));
    }

    #[test]
    fn test_outage_events_from_status_log() {
        let (_tmp, store) = test_store();
        store
            .append_status(Engine::Mysql, Role::Primary, "10.0.0.5", ConnectionStatus::Down)
            .unwrap();
        store
            .append_status(Engine::Mysql, Role::Secondary1, "10.0.0.6", ConnectionStatus::Down)
            .unwrap();
        store
            .append_status(Engine::Mysql, Role::Secondary2, "10.0.0.7", ConnectionStatus::Up)
            .unwrap();

        let events = store.recent_outage_events(&TimeRange::hours(72)).unwrap();
        assert_eq!(events.len(), 2);
        let primary_event = events.iter().find(|e| e.event.contains("primary")).unwrap();
        assert_eq!(primary_event.severity, "critical");
        let secondary_event = events.iter().find(|e| e.event.contains("secondary1")).unwrap();
        assert_eq!(secondary_event.severity, "warning");
    }
}
