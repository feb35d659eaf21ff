//! Rolling uptime derivation over the bounded status-log window.
//!
//! This is a point statistic over a sliding, count-bounded window, not
//! calendar time: the denominator grows and shrinks with polling frequency.
//! The calendar-range statistic served by `/api/uptime-stats` is a different
//! number and lives in the history query layer.

use chrono::{DateTime, Utc};

use super::models::{ConnectionStatus, UptimeSummary};

/// Summarize a window of (timestamp, status) entries, newest first.
///
/// An empty window yields the no-data sentinel for both fields. Otherwise the
/// percentage is `100 * up / total` rounded to two decimals, and the last
/// down time is the newest entry whose outcome is down (absent when the
/// window holds no down entries at all).
pub fn summarize_window(window: &[(DateTime<Utc>, ConnectionStatus)]) -> UptimeSummary {
    if window.is_empty() {
        return UptimeSummary::no_data();
    }

    let total = window.len();
    let up = window.iter().filter(|(_, s)| s.is_up()).count();
    let percentage = (up as f64 / total as f64) * 100.0;

    UptimeSummary {
        uptime_percentage: Some((percentage * 100.0).round() / 100.0),
        last_down_time: window.iter().find(|(_, s)| !s.is_up()).map(|(ts, _)| *ts),
        samples: total,
    }
}
