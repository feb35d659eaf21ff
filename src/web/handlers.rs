//! HTTP request handlers.
//!
//! Presentation-layer formatting (timestamp strings, the "No data"/"Never"
//! sentinels) happens here and only here; everything below this layer works
//! with typed values.

use super::AppState;
use crate::db::{
    format_ts, ClusterHealth, ConnectionStatus, Engine, NodeMetrics, Role, TimeRange,
    UptimeSummary,
};
use crate::probe::probe_target;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Shared helpers
// ============================================================================

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message,
            "timestamp": format_ts(Utc::now()),
        })),
    )
        .into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

fn engine_filter(raw: Option<&str>) -> Result<Option<Engine>, Response> {
    match raw {
        None => Ok(None),
        Some(s) => Engine::parse(s).map(Some).ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, &format!("unknown db_type: {}", s))
        }),
    }
}

fn role_filter(raw: Option<&str>) -> Result<Option<Role>, Response> {
    match raw {
        None => Ok(None),
        Some(s) => Role::parse(s).map(Some).ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, &format!("unknown role: {}", s))
        }),
    }
}

/// Merge one probe result with its rolling uptime into the per-node payload.
fn node_payload(metrics: &NodeMetrics, uptime: &UptimeSummary) -> Value {
    json!({
        "connection_status": metrics.connection_status.as_str(),
        "cluster_version": metrics.server_version,
        "cluster_creation_timestamp": metrics.cluster_start_time.map(format_ts),
        "replication_lag_seconds": metrics.replication_lag_seconds,
        "replication_io_running": metrics.replication_io_running,
        "replication_sql_running": metrics.replication_sql_running,
        "uptime_percentage": match uptime.uptime_percentage {
            Some(pct) => json!(pct),
            None => json!("No data"),
        },
        "last_node_down_time": match (uptime.uptime_percentage, uptime.last_down_time) {
            (None, _) => json!("No data"),
            (Some(_), Some(ts)) => json!(format_ts(ts)),
            (Some(_), None) => json!("Never"),
        },
    })
}

// ============================================================================
// Collection endpoints
// ============================================================================

/// `GET /metrics` — probe all six targets on demand and report both clusters.
///
/// The probes append status log entries (that is a probe side effect), but
/// nothing is written to the metrics or cluster stores; only collection
/// cycles persist those rows.
pub async fn handle_metrics(State(state): State<AppState>) -> Response {
    let mut body = Map::new();

    for engine in Engine::ALL {
        let mut role_status = [ConnectionStatus::Down; 3];
        let mut cluster = Map::new();

        for (i, role) in Role::ALL.into_iter().enumerate() {
            let Some(target) = state.registry.get(engine, role) else {
                continue;
            };
            let metrics = probe_target(&state.store, engine, role, target).await;
            let uptime = state.store.rolling_uptime(engine, role).unwrap_or_else(|e| {
                tracing::error!("Uptime lookup failed: {}", e);
                UptimeSummary::no_data()
            });

            role_status[i] = metrics.connection_status;
            cluster.insert(
                format!("{}_node", role.as_str()),
                node_payload(&metrics, &uptime),
            );
        }

        let health = ClusterHealth::summarize(role_status[0], role_status[1], role_status[2]);
        cluster.insert("status".to_string(), json!(health.as_str()));
        body.insert(format!("{}_cluster", engine.as_str()), Value::Object(cluster));
    }

    Json(Value::Object(body)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<i64>,
    pub db_type: Option<String>,
    pub role: Option<String>,
}

/// `GET /metrics/history?hours&db_type&role`
pub async fn handle_metrics_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let hours = query.hours.filter(|h| *h > 0).unwrap_or(24);
    let engine = match engine_filter(query.db_type.as_deref()) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let role = match role_filter(query.role.as_deref()) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match state.store.metrics_history(hours, engine, role) {
        Ok(rows) => Json(json!({
            "total_records": rows.len(),
            "time_range_hours": hours,
            "filters": {
                "db_type": engine.map(|e| e.as_str()),
                "role": role.map(|r| r.as_str()),
            },
            "metrics": rows,
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /cluster/history?hours&db_type`
pub async fn handle_cluster_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let hours = query.hours.filter(|h| *h > 0).unwrap_or(24);
    let engine = match engine_filter(query.db_type.as_deref()) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    match state.store.cluster_history(hours, engine) {
        Ok(rows) => Json(json!({
            "total_records": rows.len(),
            "time_range_hours": hours,
            "filters": { "db_type": engine.map(|e| e.as_str()) },
            "cluster_status_history": rows,
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `POST /metrics/collect` — manually trigger one collection cycle. Runs the
/// same cycle function as the scheduler, so the persisted shape is identical.
pub async fn handle_collect(State(state): State<AppState>) -> Response {
    match state.scheduler.run_cycle().await {
        Ok(()) => Json(json!({
            "status": "success",
            "message": "Metrics collection completed successfully",
            "timestamp": format_ts(Utc::now()),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Manual metrics collection failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Metrics collection failed: {}", e),
            )
        }
    }
}

// ============================================================================
// Read-only summary endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

/// `GET /api/cluster-summary`
pub async fn handle_cluster_summary(State(state): State<AppState>) -> Response {
    match state.store.cluster_summary() {
        Ok(clusters) => Json(json!({ "clusters": clusters })).into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /api/node-status?range` (default 12h)
pub async fn handle_node_status(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(12));
    match state.store.node_status(&range) {
        Ok(nodes) => Json(json!({
            "nodes": nodes,
            "time_range": range.to_string(),
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /api/uptime-stats?range` (default 24h)
///
/// Calendar-range statistics over the stored uptime column; distinct from
/// the rolling-window figure that `/metrics` reports.
pub async fn handle_uptime_stats(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(24));
    match state.store.uptime_stats(&range) {
        Ok(stats) => Json(json!({
            "uptime_statistics": stats,
            "time_range": range.to_string(),
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /api/cluster-trend?range` (default 24h)
pub async fn handle_cluster_trend(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(24));
    match state.store.cluster_trend(&range) {
        Ok(points) => {
            let mut trends: BTreeMap<String, Vec<Value>> = BTreeMap::new();
            for point in points {
                trends.entry(point.db_type.clone()).or_default().push(json!({
                    "timestamp": point.timestamp,
                    "status": point.status,
                    "count": point.count,
                }));
            }
            Json(json!({
                "trends": trends,
                "time_range": range.to_string(),
            }))
            .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /api/replication-lag?range` (default 24h)
pub async fn handle_replication_lag(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(24));
    match state.store.replication_lag(&range) {
        Ok(lag) => Json(json!({
            "replication_lag": lag,
            "time_range": range.to_string(),
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /api/connection-timeline?range` (default 48h)
pub async fn handle_connection_timeline(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(48));
    match state.store.connection_timeline(&range) {
        Ok(points) => {
            let mut timeline: BTreeMap<String, Vec<Value>> = BTreeMap::new();
            for point in points {
                let key = format!("{}_{}", point.db_type, point.role);
                timeline.entry(key).or_default().push(json!({
                    "timestamp": point.timestamp,
                    "status": point.status,
                    "hour": point.hour,
                }));
            }
            Json(json!({
                "timeline": timeline,
                "time_range": range.to_string(),
            }))
            .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /api/historical-events?range` (default 72h)
pub async fn handle_historical_events(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = TimeRange::parse_or(query.range.as_deref(), TimeRange::hours(72));
    match state.store.recent_outage_events(&range) {
        Ok(events) => Json(json!({
            "events": events,
            "time_range": range.to_string(),
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn up_metrics() -> NodeMetrics {
        NodeMetrics {
            engine: Engine::Postgres,
            role: Role::Primary,
            host: "127.0.0.1".to_string(),
            port: 5432,
            connection_status: ConnectionStatus::Up,
            server_version: Some("PostgreSQL 16.3".to_string()),
            cluster_start_time: Some(Utc::now() - Duration::days(3)),
            replication_lag_seconds: None,
            replication_io_running: None,
            replication_sql_running: None,
        }
    }

    #[test]
    fn test_node_payload_sentinels() {
        let metrics = up_metrics();

        let no_data = node_payload(&metrics, &UptimeSummary::no_data());
        assert_eq!(no_data["uptime_percentage"], json!("No data"));
        assert_eq!(no_data["last_node_down_time"], json!("No data"));

        let never_down = node_payload(
            &metrics,
            &UptimeSummary {
                uptime_percentage: Some(100.0),
                last_down_time: None,
                samples: 40,
            },
        );
        assert_eq!(never_down["uptime_percentage"], json!(100.0));
        assert_eq!(never_down["last_node_down_time"], json!("Never"));

        let down_at = Utc::now();
        let with_outage = node_payload(
            &metrics,
            &UptimeSummary {
                uptime_percentage: Some(75.0),
                last_down_time: Some(down_at),
                samples: 4,
            },
        );
        assert_eq!(with_outage["last_node_down_time"], json!(format_ts(down_at)));
    }

    #[test]
    fn test_node_payload_formats_timestamps_at_boundary() {
        let metrics = up_metrics();
        let payload = node_payload(&metrics, &UptimeSummary::no_data());
        let created = payload["cluster_creation_timestamp"].as_str().unwrap();
        // Canonical boundary format, not RFC 3339.
        assert_eq!(created.len(), 19);
        assert!(created.contains(' ') && !created.contains('T'));
    }
}
