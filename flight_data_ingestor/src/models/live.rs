//! Live departure/arrival board records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One row of a live departure or arrival board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFlight {
    /// Carrier display name.
    pub airline: String,

    /// Flight number as printed.
    pub flight_number: String,

    /// Destination city for departures, origin city for arrivals.
    pub counterpart: String,

    /// Scheduled local time, `HH:MM`.
    pub scheduled_time: String,

    /// Currently estimated local time, `HH:MM`.
    pub estimated_time: String,

    /// Free-text status as shown on the board (e.g. "출발", "지연").
    pub status: String,
}

/// Raw extraction result for one airport's live boards, before the
/// orchestrator stamps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSnapshot {
    /// Rows of the departures board.
    pub departures: Vec<LiveFlight>,
    /// Rows of the arrivals board.
    pub arrivals: Vec<LiveFlight>,
}

/// Persisted live-status aggregate for one airport and one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBoard {
    /// 3-letter airport code.
    pub airport_code: String,

    /// When the boards were captured (Seoul local).
    pub crawled_at: DateTime<FixedOffset>,

    /// Departures board rows.
    pub departures: Vec<LiveFlight>,

    /// Arrivals board rows.
    pub arrivals: Vec<LiveFlight>,
}

impl LiveBoard {
    /// Stamps a raw snapshot into a persistable board.
    pub fn new(
        airport_code: impl Into<String>,
        crawled_at: DateTime<FixedOffset>,
        snapshot: LiveSnapshot,
    ) -> Self {
        Self {
            airport_code: airport_code.into(),
            crawled_at,
            departures: snapshot.departures,
            arrivals: snapshot.arrivals,
        }
    }
}
