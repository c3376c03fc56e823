//! CSV rendering for cache artifacts, plus a tolerant reader.
//!
//! The files are meant to open directly in Excel for spot checks, hence
//! the UTF-8 BOM and the Korean headers. The live file stacks two sections
//! (departures, arrivals) separated by a blank row, each with its own
//! header — it is a report, not a uniform table.

use flight_data_ingestor::models::live::LiveBoard;
use flight_data_ingestor::models::schedule::AirportSchedule;

// Excel needs the BOM to detect UTF-8.
const BOM: &str = "\u{feff}";

/// Marker written in a weekday column when the flight operates that day;
/// non-operating days stay blank.
pub const DAY_MARKER: &str = "O";

const SCHEDULE_HEADER: &[&str] = &[
    "항공사", "편명", "도착지", "출발시간", "도착시간", "월", "화", "수", "목", "금", "토", "일",
];
const LIVE_DEPARTURE_HEADER: &[&str] =
    &["항공사", "편명", "도착지", "예정시간", "예상시간", "상태"];
const LIVE_ARRIVAL_HEADER: &[&str] =
    &["항공사", "편명", "출발지", "예정시간", "예상시간", "상태"];

pub(crate) fn schedule_to_csv(schedule: &AirportSchedule) -> String {
    let mut out = String::from(BOM);
    write_row(&mut out, SCHEDULE_HEADER.iter().copied());
    for flight in &schedule.flights {
        let mut cells: Vec<&str> = vec![
            &flight.airline,
            &flight.flight_number,
            &flight.destination,
            &flight.departure_time,
            &flight.arrival_time,
        ];
        for (_, operates) in flight.days.flags() {
            cells.push(if operates { DAY_MARKER } else { "" });
        }
        write_row(&mut out, cells);
    }
    out
}

pub(crate) fn live_to_csv(board: &LiveBoard) -> String {
    let mut out = String::from(BOM);

    write_row(&mut out, ["=== 출발 ==="]);
    write_row(&mut out, LIVE_DEPARTURE_HEADER.iter().copied());
    for flight in &board.departures {
        write_row(&mut out, live_cells(flight));
    }

    out.push('\n'); // blank row between the sections

    write_row(&mut out, ["=== 도착 ==="]);
    write_row(&mut out, LIVE_ARRIVAL_HEADER.iter().copied());
    for flight in &board.arrivals {
        write_row(&mut out, live_cells(flight));
    }

    out
}

fn live_cells(flight: &flight_data_ingestor::models::live::LiveFlight) -> [&str; 6] {
    [
        &flight.airline,
        &flight.flight_number,
        &flight.counterpart,
        &flight.scheduled_time,
        &flight.estimated_time,
        &flight.status,
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Minimal CSV parser (quotes + CRLF tolerant).
///
/// Strips a leading BOM and skips blank lines, so it reads back exactly
/// the data rows this module writes. Exposed for consumers and round-trip
/// tests.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing field/row even if the text had no final newline.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
