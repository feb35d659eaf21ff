//! Configuration for dbpulse.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The target registry (which hosts to probe) is part of configuration and
//! immutable for the process lifetime.

use std::env;

use crate::db::{Engine, Role};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "dbpulse.db")
    pub db_path: String,
    /// Seconds between scheduled collection cycles (default: 600)
    pub collect_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            db_path: "dbpulse.db".to_string(),
            collect_interval_secs: 600,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DBPULSE_HTTP_PORT`: HTTP port (default: 8080)
    /// - `DBPULSE_DB_PATH`: Database file path (default: "dbpulse.db")
    /// - `DBPULSE_COLLECT_INTERVAL_SECS`: collection interval (default: 600)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("DBPULSE_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(db_path) = env::var("DBPULSE_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Ok(interval_str) = env::var("DBPULSE_COLLECT_INTERVAL_SECS") {
            if let Ok(interval) = interval_str.parse() {
                cfg.collect_interval_secs = interval;
            }
        }

        cfg
    }
}

/// Connection parameters for one monitored node.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Static mapping from (engine, role) to connection parameters.
///
/// The six entries are loaded once at startup; iteration order is fixed
/// (postgres primary, secondary1, secondary2, then mysql in the same order)
/// so a collection cycle always probes in the same sequence.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    entries: Vec<(Engine, Role, TargetConfig)>,
}

impl TargetRegistry {
    /// Load all six targets from `DBPULSE_{PG|MYSQL}_{ROLE}_{FIELD}` env
    /// variables, defaulting to localhost on the engine's conventional port.
    pub fn load() -> Self {
        let mut entries = Vec::with_capacity(6);
        for engine in Engine::ALL {
            for role in Role::ALL {
                entries.push((engine, role, load_target(engine, role)));
            }
        }
        Self { entries }
    }

    /// Build a registry from explicit entries (used by tests).
    pub fn from_entries(entries: Vec<(Engine, Role, TargetConfig)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, engine: Engine, role: Role) -> Option<&TargetConfig> {
        self.entries
            .iter()
            .find(|(e, r, _)| *e == engine && *r == role)
            .map(|(_, _, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Engine, Role, &TargetConfig)> {
        self.entries.iter().map(|(e, r, t)| (*e, *r, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_target(engine: Engine, role: Role) -> TargetConfig {
    let prefix = format!(
        "DBPULSE_{}_{}",
        match engine {
            Engine::Postgres => "PG",
            Engine::Mysql => "MYSQL",
        },
        role.as_str().to_uppercase()
    );

    let (default_port, default_db) = match engine {
        Engine::Postgres => (5432, "postgres"),
        Engine::Mysql => (3306, "mysql"),
    };

    TargetConfig {
        host: env_or(&format!("{prefix}_HOST"), "127.0.0.1"),
        port: env::var(format!("{prefix}_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port),
        user: env_or(&format!("{prefix}_USER"), "replica_user"),
        password: env_or(&format!("{prefix}_PASS"), ""),
        database: env_or(&format!("{prefix}_DB"), default_db),
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
