//! Live departure/arrival board extraction.

use tracing::debug;

use crate::models::live::{LiveFlight, LiveSnapshot};
use crate::session::PageSession;

const DEPARTURES_ROWS: &str = "div.departure-table table tbody tr";
const ARRIVALS_ROWS: &str = "div.arrival-table table tbody tr";

/// Airline, number, city, scheduled, estimated, status.
const MIN_LIVE_COLUMNS: usize = 6;

/// Reads both live boards from the currently rendered page. Never fails;
/// a missing board is an empty list.
pub async fn extract_live(session: &dyn PageSession) -> LiveSnapshot {
    LiveSnapshot {
        departures: board(session, DEPARTURES_ROWS).await,
        arrivals: board(session, ARRIVALS_ROWS).await,
    }
}

async fn board(session: &dyn PageSession, selector: &str) -> Vec<LiveFlight> {
    let rows = match session.query_rows(selector).await {
        Ok(rows) => rows,
        Err(e) => {
            debug!(%selector, error = %e, "live board query failed");
            return Vec::new();
        }
    };
    rows.iter()
        .filter_map(|cells| {
            if cells.len() < MIN_LIVE_COLUMNS {
                return None;
            }
            let cell = |i: usize| cells[i].trim().to_string();
            Some(LiveFlight {
                airline: cell(0),
                flight_number: cell(1),
                counterpart: cell(2),
                scheduled_time: cell(3),
                estimated_time: cell(4),
                status: cell(5),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{FakePageSession, Scripted};
    use std::collections::HashMap;

    fn live_row(number: &str, status: &str) -> Vec<String> {
        vec![
            "대한항공".to_string(),
            number.to_string(),
            "NRT".to_string(),
            "09:00".to_string(),
            "09:10".to_string(),
            status.to_string(),
        ]
    }

    #[tokio::test]
    async fn reads_both_boards_and_skips_short_rows() {
        let session = FakePageSession::new(HashMap::from([(
            "GMP".to_string(),
            Scripted::Live {
                departures: vec![live_row("KE1234", "출발"), vec!["short".to_string()]],
                arrivals: vec![live_row("KE1235", "지연")],
            },
        )]));
        session.select_option("#airportCode", "GMP").await.unwrap();

        let snapshot = extract_live(&session).await;
        assert_eq!(snapshot.departures.len(), 1);
        assert_eq!(snapshot.departures[0].status, "출발");
        assert_eq!(snapshot.arrivals.len(), 1);
        assert_eq!(snapshot.arrivals[0].flight_number, "KE1235");
    }

    #[tokio::test]
    async fn boardless_page_yields_empty_snapshot() {
        let session = FakePageSession::new(HashMap::new());
        let snapshot = extract_live(&session).await;
        assert!(snapshot.departures.is_empty() && snapshot.arrivals.is_empty());
    }
}
