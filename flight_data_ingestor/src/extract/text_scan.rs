//! Last-resort extraction from the page's visible text.
//!
//! When no table shape matches, flight-number-shaped tokens are paired
//! positionally with time-shaped tokens from the page text. Records from
//! this path carry no day information (all flags false) and get their
//! destination from the query's counterpart — the caller tags the whole
//! result as degraded, so consumers can tell it apart from the table path.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::days::OperatingDays;
use crate::models::direction::Direction;
use crate::models::flight::FlightRecord;
use crate::navigator::ScheduleQuery;
use crate::session::PageSession;

// Carrier designator: two characters with at least one letter (covers
// KE, OZ, 7C, ...) followed by a 3-4 digit flight number.
static FLIGHT_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][A-Z0-9]|[0-9][A-Z])(\d{3,4})\b").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{2}:\d{2})\b").unwrap());

/// Display names for carriers commonly seen on the portal. Unknown
/// designators fall back to the designator itself.
static AIRLINE_NAMES: Lazy<IndexMap<&'static str, &'static str>> = Lazy::new(|| {
    IndexMap::from([
        ("KE", "대한항공"),
        ("OZ", "아시아나항공"),
        ("BX", "에어부산"),
        ("ZE", "이스타항공"),
        ("TW", "티웨이항공"),
        ("LJ", "진에어"),
        ("7C", "제주항공"),
    ])
});

/// Scan results are low confidence; a noisy page must not flood the cache.
pub const MAX_SCANNED_RECORDS: usize = 20;

/// Scans the rendered page's text. Never fails; an unreadable page yields
/// an empty list.
pub async fn scan(session: &dyn PageSession, query: &ScheduleQuery) -> Vec<FlightRecord> {
    let text = match session.page_text().await {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "page text unavailable");
            return Vec::new();
        }
    };
    scan_text(&text, query)
}

/// Pure half of the scan, separated so it can be tested without a session.
///
/// The i-th flight token is paired with the 2i-th and 2i+1-th time tokens
/// (departure, arrival); missing times stay empty. Records without a
/// destination (no counterpart on a departure query) fail validity and are
/// dropped.
pub fn scan_text(text: &str, query: &ScheduleQuery) -> Vec<FlightRecord> {
    let times: Vec<&str> = TIME.find_iter(text).map(|m| m.as_str()).collect();
    let mut records = Vec::new();

    for (i, caps) in FLIGHT_NO.captures_iter(text).take(MAX_SCANNED_RECORDS).enumerate() {
        let designator = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let flight_number = caps.get(0).map(|m| m.as_str()).unwrap_or_default().to_string();
        let airline = AIRLINE_NAMES
            .get(designator)
            .copied()
            .unwrap_or(designator)
            .to_string();

        let counterpart = query.counterpart.clone().unwrap_or_default();
        let (origin, destination) = match query.direction {
            Direction::Departure => (query.airport.clone(), counterpart),
            Direction::Arrival => (counterpart, query.airport.clone()),
        };

        let record = FlightRecord {
            airline,
            flight_number,
            origin,
            destination,
            departure_time: times.get(i * 2).copied().unwrap_or_default().to_string(),
            arrival_time: times.get(i * 2 + 1).copied().unwrap_or_default().to_string(),
            aircraft: String::new(),
            days: OperatingDays::default(),
        };
        if record.is_valid() {
            records.push(record);
        }
    }
    records
}
