//! Storage layer for dbpulse.
//!
//! One SQLite database holds the metrics time series, the append-only status
//! log, and the cluster aggregation history.

mod history;
mod models;
mod store;
mod uptime;

pub use history::*;
pub use models::*;
pub use store::*;
pub use uptime::*;
