//! Ordered row-shape recognizers for the schedule results table.

use tracing::debug;

use crate::models::days::OperatingDays;
use crate::models::direction::Direction;
use crate::models::flight::FlightRecord;
use crate::navigator::ScheduleQuery;
use crate::session::PageSession;

/// Raw cell texts for one table row.
pub type RawRow = Vec<String>;

/// A named row selector. Recognizers are tried in declaration order; the
/// first whose selector matches at least one row wins.
#[derive(Debug, Clone, Copy)]
pub struct TableRecognizer {
    /// Short name for logs.
    pub name: &'static str,
    /// Row selector this shape answers to.
    pub selector: &'static str,
}

/// Known markup generations, most specific first. The bare `table tbody tr`
/// shape stays last so it only catches pages none of the named layouts
/// match.
pub const TABLE_RECOGNIZERS: &[TableRecognizer] = &[
    TableRecognizer {
        name: "schedule-table",
        selector: "table.schedule-table tbody tr",
    },
    TableRecognizer {
        name: "schedule_table",
        selector: "table.schedule_table tbody tr",
    },
    TableRecognizer {
        name: "schedule-id",
        selector: "table#scheduleTable tbody tr",
    },
    TableRecognizer {
        name: "schedule-class",
        selector: "table[class*=\"schedule\"] tbody tr",
    },
    TableRecognizer {
        name: "flight-class",
        selector: "table[class*=\"flight\"] tbody tr",
    },
    TableRecognizer {
        name: "list-table",
        selector: ".list_table tbody tr",
    },
    TableRecognizer {
        name: "any-table",
        selector: "table tbody tr",
    },
];

impl TableRecognizer {
    /// Returns `Some(rows)` when this shape matches the rendered page.
    /// Session errors count as a miss; the next recognizer gets its turn.
    pub async fn rows(&self, session: &dyn PageSession) -> Option<Vec<RawRow>> {
        match session.query_rows(self.selector).await {
            Ok(rows) if !rows.is_empty() => Some(rows),
            Ok(_) => None,
            Err(e) => {
                debug!(recognizer = self.name, error = %e, "row query failed");
                None
            }
        }
    }
}

/// Minimum usable cells: through the arrival-time column.
pub const MIN_SCHEDULE_COLUMNS: usize = 5;

/// Maps one raw row onto a [`FlightRecord`].
///
/// Cell order is fixed: airline, flight number, counterpart city, departure
/// time, arrival time, then aircraft and operating days where present. A
/// six-cell row carries the day text in the sixth cell; seven or more put
/// the aircraft in between. Rows below the minimum, and records missing
/// their lookup keys, map to `None`.
pub fn row_to_record(cells: &RawRow, query: &ScheduleQuery) -> Option<FlightRecord> {
    if cells.len() < MIN_SCHEDULE_COLUMNS {
        return None;
    }
    let cell = |i: usize| cells.get(i).map(|s| s.trim().to_string()).unwrap_or_default();

    let (aircraft, days_text) = match cells.len() {
        5 => (String::new(), String::new()),
        6 => (String::new(), cell(5)),
        _ => (cell(5), cell(6)),
    };

    let counterpart = cell(2);
    let (origin, destination) = match query.direction {
        Direction::Departure => (query.airport.clone(), counterpart),
        Direction::Arrival => (counterpart, query.airport.clone()),
    };

    let record = FlightRecord {
        airline: cell(0),
        flight_number: cell(1),
        origin,
        destination,
        departure_time: cell(3),
        arrival_time: cell(4),
        aircraft,
        days: OperatingDays::parse(&days_text),
    };
    record.is_valid().then_some(record)
}
