//! Never-failing extraction of flight records from a rendered results page.
//!
//! Extraction tries an ordered list of table recognizers; the first one
//! whose selector matches at least one row wins and no merging happens
//! across recognizers. When no table shape matches at all, a degraded
//! full-text scan runs instead and the outcome is tagged accordingly.

pub mod live;
pub mod recognizers;
pub mod text_scan;

use tracing::{info, warn};

use crate::models::flight::FlightRecord;
use crate::models::schedule::ExtractionMethod;
use crate::navigator::ScheduleQuery;
use crate::session::PageSession;

pub use live::extract_live;

use recognizers::{TABLE_RECOGNIZERS, row_to_record};

/// Extracted records plus how they were obtained.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Valid records, in page order.
    pub flights: Vec<FlightRecord>,
    /// Provenance: structured table or degraded text scan.
    pub method: ExtractionMethod,
}

/// Extracts schedule rows from the currently rendered page.
///
/// Total failure is an empty outcome, never an error; unusable rows are
/// skipped and extraction keeps going. Partial results are expected.
pub async fn extract_schedule(
    session: &dyn PageSession,
    query: &ScheduleQuery,
) -> ExtractionOutcome {
    for recognizer in TABLE_RECOGNIZERS {
        let Some(rows) = recognizer.rows(session).await else {
            continue;
        };
        let total = rows.len();
        let flights: Vec<FlightRecord> =
            rows.iter().filter_map(|row| row_to_record(row, query)).collect();
        if flights.len() < total {
            info!(
                recognizer = recognizer.name,
                kept = flights.len(),
                rows = total,
                "skipped unusable rows"
            );
        }
        return ExtractionOutcome {
            flights,
            method: ExtractionMethod::Table,
        };
    }

    warn!(airport = %query.airport, "no table recognizer matched; falling back to text scan");
    let flights = text_scan::scan(session, query).await;
    ExtractionOutcome {
        flights,
        method: ExtractionMethod::TextScan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::direction::Direction;
    use crate::session::fake::{FakePageSession, Scripted};
    use std::collections::HashMap;

    fn schedule_row(airline: &str, number: &str, city: &str) -> Vec<String> {
        vec![
            airline.to_string(),
            number.to_string(),
            city.to_string(),
            "07:35".to_string(),
            "10:05".to_string(),
            "월화수목금토일".to_string(),
        ]
    }

    async fn session_for(selector: &str, rows: Vec<Vec<String>>) -> FakePageSession {
        let session = FakePageSession::new(HashMap::from([(
            "PUS".to_string(),
            Scripted::Rows {
                selector: selector.to_string(),
                rows,
            },
        )]));
        // Selecting the airport is what arms the scripted outcome.
        session.select_option("#airportCode", "PUS").await.unwrap();
        session
    }

    #[tokio::test]
    async fn first_matching_recognizer_wins() {
        let rows = vec![schedule_row("에어부산", "BX164", "NRT")];
        let session = session_for("table.schedule-table tbody tr", rows).await;

        let outcome = extract_schedule(&session, &ScheduleQuery::departures("PUS")).await;
        assert_eq!(outcome.method, ExtractionMethod::Table);
        assert_eq!(outcome.flights.len(), 1);
        assert_eq!(outcome.flights[0].flight_number, "BX164");
        assert_eq!(outcome.flights[0].origin, "PUS");
        assert_eq!(outcome.flights[0].destination, "NRT");
    }

    #[tokio::test]
    async fn later_candidates_are_tried_when_earlier_shapes_miss() {
        let rows = vec![schedule_row("진에어", "LJ201", "NRT")];
        let session = session_for(".list_table tbody tr", rows).await;

        let outcome = extract_schedule(&session, &ScheduleQuery::departures("PUS")).await;
        assert_eq!(outcome.method, ExtractionMethod::Table);
        assert_eq!(outcome.flights.len(), 1);
    }

    #[tokio::test]
    async fn unusable_rows_are_skipped_not_fatal() {
        let rows = vec![
            schedule_row("에어부산", "BX164", "NRT"),
            vec!["short".to_string(), "row".to_string()],
            schedule_row("제주항공", "", "NRT"), // no flight number
            schedule_row("티웨이항공", "TW251", "NRT"),
        ];
        let session = session_for("table.schedule-table tbody tr", rows).await;

        let outcome = extract_schedule(&session, &ScheduleQuery::departures("PUS")).await;
        let numbers: Vec<_> = outcome
            .flights
            .iter()
            .map(|f| f.flight_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["BX164", "TW251"]);
    }

    #[tokio::test]
    async fn arrival_queries_swap_origin_and_destination() {
        let rows = vec![schedule_row("대한항공", "KE1234", "GMP")];
        let session = session_for("table.schedule-table tbody tr", rows).await;

        let query = ScheduleQuery {
            airport: "CJU".to_string(),
            direction: Direction::Arrival,
            counterpart: None,
        };
        let outcome = extract_schedule(&session, &query).await;
        assert_eq!(outcome.flights[0].origin, "GMP");
        assert_eq!(outcome.flights[0].destination, "CJU");
    }

    #[tokio::test]
    async fn tableless_page_falls_back_to_text_scan() {
        let session = FakePageSession::new(HashMap::from([(
            "PUS".to_string(),
            Scripted::BodyText("항공편 BX164 07:35 10:05 / ZE605 08:20 10:50".to_string()),
        )]));
        session.select_option("#airportCode", "PUS").await.unwrap();

        let query = ScheduleQuery {
            airport: "PUS".to_string(),
            direction: Direction::Departure,
            counterpart: Some("NRT".to_string()),
        };
        let outcome = extract_schedule(&session, &query).await;
        assert_eq!(outcome.method, ExtractionMethod::TextScan);
        assert_eq!(outcome.flights.len(), 2);
        assert!(outcome.flights.iter().all(|f| f.destination == "NRT"));
    }
}
