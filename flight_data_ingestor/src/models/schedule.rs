//! Aggregate schedule for one airport and one refresh cycle.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::flight::FlightRecord;

/// How a set of records was obtained from the page.
///
/// Text-scan results are low confidence and must stay distinguishable from
/// structured extraction all the way into the cache, so consumers never
/// mistake degraded data for the real table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Structured rows from a recognized results table.
    Table,
    /// Degraded full-page text scan.
    TextScan,
}

/// Everything scraped for one airport in one cycle.
///
/// Built fresh each cycle; there is no incremental merge with prior data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportSchedule {
    /// 3-letter airport code the query was made for.
    pub airport_code: String,

    /// Display name, when the configuration knows one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport_name: Option<String>,

    /// When the orchestrator accepted the extractor's output (Seoul local).
    pub crawled_at: DateTime<FixedOffset>,

    /// Provenance of the records below.
    pub method: ExtractionMethod,

    /// Always `flights.len()`; recomputed on construction and on write,
    /// never trusted from outside.
    pub total_flights: usize,

    /// The extracted records, in page order.
    pub flights: Vec<FlightRecord>,
}

impl AirportSchedule {
    /// Builds a schedule, deriving `total_flights` from the record list.
    pub fn new(
        airport_code: impl Into<String>,
        airport_name: Option<String>,
        crawled_at: DateTime<FixedOffset>,
        method: ExtractionMethod,
        flights: Vec<FlightRecord>,
    ) -> Self {
        let total_flights = flights.len();
        Self {
            airport_code: airport_code.into(),
            airport_name,
            crawled_at,
            method,
            total_flights,
            flights,
        }
    }

    /// Re-derives `total_flights` from the record list.
    pub fn recompute_total(&mut self) {
        self.total_flights = self.flights.len();
    }
}
