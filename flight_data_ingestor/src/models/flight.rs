//! Canonical in-memory representation of one scheduled flight leg.
//!
//! This struct is the standard output of every extraction path (structured
//! table or degraded text scan) and the unit the cache layer persists.

use serde::{Deserialize, Serialize};

use crate::models::days::OperatingDays;

/// One scheduled flight leg as scraped from the portal.
///
/// Times are kept as the portal prints them: local `HH:MM`, optionally
/// suffixed `+1` for a next-day arrival. One of `origin`/`destination` is
/// supplied by the query context rather than scraped for single-direction
/// queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Carrier display name as shown on the page (not an IATA code).
    pub airline: String,

    /// Alphanumeric carrier designator plus digits (e.g. "KE1234", "7C1151").
    pub flight_number: String,

    /// 3-letter origin airport code.
    pub origin: String,

    /// 3-letter destination airport code.
    pub destination: String,

    /// Local departure time, `HH:MM`.
    pub departure_time: String,

    /// Local arrival time, `HH:MM`, optionally `+1` suffixed.
    pub arrival_time: String,

    /// Aircraft type. Many page layouts omit it.
    #[serde(default)]
    pub aircraft: String,

    /// Which weekdays the flight operates.
    pub days: OperatingDays,
}

impl FlightRecord {
    /// A record is usable only when its two lookup keys are present.
    /// Invalid records are dropped at extraction time and never persisted.
    pub fn is_valid(&self) -> bool {
        !self.flight_number.trim().is_empty() && !self.destination.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FlightRecord {
        FlightRecord {
            airline: "에어부산".into(),
            flight_number: "BX164".into(),
            origin: "PUS".into(),
            destination: "NRT".into(),
            departure_time: "07:35".into(),
            arrival_time: "10:05".into(),
            aircraft: String::new(),
            days: OperatingDays::every_day(),
        }
    }

    #[test]
    fn validity_requires_flight_number_and_destination() {
        assert!(record().is_valid());

        let mut missing_number = record();
        missing_number.flight_number = "  ".into();
        assert!(!missing_number.is_valid());

        let mut missing_destination = record();
        missing_destination.destination = String::new();
        assert!(!missing_destination.is_valid());
    }

    #[test]
    fn json_keys_are_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["flightNumber"], "BX164");
        assert_eq!(json["departureTime"], "07:35");
        assert_eq!(json["days"]["mon"], true);
    }
}
