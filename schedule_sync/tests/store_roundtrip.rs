mod common;

use std::collections::HashMap;

use common::*;
use flight_data_ingestor::models::days::{OperatingDays, Weekday};
use flight_data_ingestor::models::flight::FlightRecord;
use flight_data_ingestor::models::schedule::{AirportSchedule, ExtractionMethod};
use schedule_sync::service::FlightDataService;
use schedule_sync::store::{CacheFormat, CacheKind, DAY_MARKER, StoreError, parse_rows};

fn flight(number: &str, days: OperatingDays) -> FlightRecord {
    FlightRecord {
        airline: "에어부산".into(),
        flight_number: number.into(),
        origin: "PUS".into(),
        destination: "NRT".into(),
        departure_time: "07:35".into(),
        arrival_time: "10:05".into(),
        aircraft: String::new(),
        days,
    }
}

#[test]
fn csv_weekday_columns_round_trip_exactly() {
    let rig = rig(&[("PUS", "김해공항")], HashMap::new(), |_| {});

    let mut alternating = OperatingDays::default();
    for day in [Weekday::Mon, Weekday::Wed, Weekday::Fri, Weekday::Sun] {
        alternating.set(day, true);
    }
    let schedule = AirportSchedule::new(
        "PUS",
        Some("김해공항".into()),
        "2025-07-01T03:00:00+09:00".parse().unwrap(),
        ExtractionMethod::Table,
        vec![
            flight("BX164", OperatingDays::every_day()),
            flight("ZE605", alternating),
            flight("LJ201", OperatingDays::default()),
        ],
    );
    rig.refresher
        .store()
        .write_schedule("20250701_030000", &schedule)
        .unwrap();

    let bytes = rig
        .refresher
        .store()
        .read_latest("PUS", CacheKind::Schedule, CacheFormat::Csv)
        .unwrap();
    let rows = parse_rows(&String::from_utf8(bytes).unwrap());

    // Header plus one row per flight.
    assert_eq!(rows.len(), 1 + schedule.flights.len());

    for (row, flight) in rows[1..].iter().zip(&schedule.flights) {
        assert_eq!(row[1], flight.flight_number);
        let mut reconstructed = OperatingDays::default();
        for (i, day) in Weekday::ALL.iter().enumerate() {
            reconstructed.set(*day, row[5 + i] == DAY_MARKER);
        }
        assert_eq!(reconstructed, flight.days, "days for {}", flight.flight_number);
    }
}

#[test]
fn service_reports_not_found_for_unconfigured_airports() {
    let rig = rig(&[("GMP", "김포공항")], HashMap::new(), |_| {});
    let service = FlightDataService::new(rig.refresher.clone());

    // Not configured at all: rejected before touching the disk.
    let err = service
        .get_latest_schedule("NRT", CacheFormat::Json)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    // Configured but never crawled: also NotFound.
    let err = service
        .get_latest_live_status("gmp", CacheFormat::Json)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn service_serves_the_latest_bytes_and_normalizes_case() {
    let rig = rig(&[("PUS", "김해공항")], HashMap::new(), |_| {});
    let service = FlightDataService::new(rig.refresher.clone());

    let schedule = AirportSchedule::new(
        "PUS",
        Some("김해공항".into()),
        "2025-07-01T03:00:00+09:00".parse().unwrap(),
        ExtractionMethod::Table,
        vec![flight("BX164", OperatingDays::every_day())],
    );
    rig.refresher
        .store()
        .write_schedule("20250701_030000", &schedule)
        .unwrap();

    let payload = service.get_latest_schedule("pus", CacheFormat::Json).unwrap();
    let parsed: AirportSchedule = serde_json::from_slice(&payload).unwrap();
    assert_eq!(parsed.airport_code, "PUS");
    assert_eq!(parsed.total_flights, 1);

    assert_eq!(service.airports(), vec![("PUS".to_string(), "김해공항".to_string())]);
}
