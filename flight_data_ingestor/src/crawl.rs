//! High-level fetch operations composing navigation and extraction.

use crate::extract::{self, ExtractionOutcome};
use crate::models::live::LiveSnapshot;
use crate::navigator::{self, CrawlOptions, NavigatorError, ScheduleQuery};
use crate::session::PageSession;

/// Runs one schedule query against an open session.
///
/// Navigation problems surface as errors; once the page has rendered,
/// extraction itself never fails (worst case is an empty, text-scan-tagged
/// outcome).
pub async fn fetch_schedule(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    query: &ScheduleQuery,
) -> Result<ExtractionOutcome, NavigatorError> {
    navigator::open_schedule(session, opts, query).await?;
    Ok(extract::extract_schedule(session, query).await)
}

/// Fetches the live departure/arrival boards for one airport.
pub async fn fetch_live_board(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    airport: &str,
) -> Result<LiveSnapshot, NavigatorError> {
    navigator::open_live_board(session, opts, airport).await?;
    Ok(extract::extract_live(session).await)
}
