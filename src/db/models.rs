//! Core model types shared across the probe, storage, and web layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database engine family of a monitored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgres,
    Mysql,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Postgres, Engine::Mysql];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::Mysql => "mysql",
        }
    }

    /// Parse a query-parameter value. Unknown values are rejected so that
    /// filters are validated once at the boundary.
    pub fn parse(s: &str) -> Option<Engine> {
        match s {
            "postgres" => Some(Engine::Postgres),
            "mysql" => Some(Engine::Mysql),
            _ => None,
        }
    }
}

/// Position of a node within its replication cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary1,
    Secondary2,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Primary, Role::Secondary1, Role::Secondary2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary1 => "secondary1",
            Role::Secondary2 => "secondary2",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "primary" => Some(Role::Primary),
            "secondary1" => Some(Role::Secondary1),
            "secondary2" => Some(Role::Secondary2),
            _ => None,
        }
    }

    pub fn is_secondary(&self) -> bool {
        !matches!(self, Role::Primary)
    }
}

/// Binary connectivity outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Up,
    Down,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Up => "up",
            ConnectionStatus::Down => "down",
        }
    }

    pub fn parse(s: &str) -> ConnectionStatus {
        if s == "up" {
            ConnectionStatus::Up
        } else {
            ConnectionStatus::Down
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ConnectionStatus::Up)
    }
}

/// Aggregate health verdict for one engine's cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterHealth {
    Healthy,
    Degraded,
    Critical,
    Unknown,
}

impl ClusterHealth {
    /// Roll three node statuses up into one verdict. Primary failure
    /// dominates secondary failure; the Unknown arm keeps the function total.
    pub fn summarize(
        primary: ConnectionStatus,
        secondary1: ConnectionStatus,
        secondary2: ConnectionStatus,
    ) -> ClusterHealth {
        use ConnectionStatus::*;
        match (primary, secondary1, secondary2) {
            (Up, Up, Up) => ClusterHealth::Healthy,
            (Down, _, _) => ClusterHealth::Critical,
            (Up, Down, _) | (Up, _, Down) => ClusterHealth::Degraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterHealth::Healthy => "healthy",
            ClusterHealth::Degraded => "degraded",
            ClusterHealth::Critical => "critical",
            ClusterHealth::Unknown => "unknown",
        }
    }
}

/// One normalized probe measurement. Engine-specific field names are mapped
/// into this shape by the probe implementations, so nothing downstream needs
/// to know which engine produced it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMetrics {
    pub engine: Engine,
    pub role: Role,
    pub host: String,
    pub port: u16,
    pub connection_status: ConnectionStatus,
    pub server_version: Option<String>,
    pub cluster_start_time: Option<DateTime<Utc>>,
    pub replication_lag_seconds: Option<f64>,
    pub replication_io_running: Option<String>,
    pub replication_sql_running: Option<String>,
}

impl NodeMetrics {
    /// A result for a target that could not be reached. All optional fields
    /// stay absent.
    pub fn unreachable(engine: Engine, role: Role, host: &str, port: u16) -> Self {
        Self {
            engine,
            role,
            host: host.to_string(),
            port,
            connection_status: ConnectionStatus::Down,
            server_version: None,
            cluster_start_time: None,
            replication_lag_seconds: None,
            replication_io_running: None,
            replication_sql_running: None,
        }
    }
}

/// Rolling uptime derived from the bounded status-log window.
///
/// `uptime_percentage == None` means the window held no data at all;
/// `last_down_time == None` with a present percentage means the node was
/// never down within the window. The "No data"/"Never" strings shown to
/// clients are produced only at the HTTP boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct UptimeSummary {
    pub uptime_percentage: Option<f64>,
    pub last_down_time: Option<DateTime<Utc>>,
    pub samples: usize,
}

impl UptimeSummary {
    pub fn no_data() -> Self {
        Self {
            uptime_percentage: None,
            last_down_time: None,
            samples: 0,
        }
    }
}

/// A stored metrics row, read back for history queries.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    pub id: i64,
    pub timestamp: String,
    pub db_type: String,
    pub role: String,
    pub host: String,
    pub port: u16,
    pub connection_status: String,
    pub cluster_version: Option<String>,
    pub cluster_creation_timestamp: Option<String>,
    pub replication_lag_seconds: Option<f64>,
    pub replication_io_running: Option<String>,
    pub replication_sql_running: Option<String>,
    pub uptime_percentage: Option<f64>,
    pub last_node_down_time: Option<String>,
}

/// A stored cluster aggregation row.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStatusRow {
    pub id: i64,
    pub timestamp: String,
    pub db_type: String,
    pub status: String,
    pub primary_status: String,
    pub secondary1_status: String,
    pub secondary2_status: String,
}
