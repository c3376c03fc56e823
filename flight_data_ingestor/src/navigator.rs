//! Drives the portal's query pages up to the point where results render.
//!
//! The portal serves several markup generations, so every control is
//! addressed through an ordered candidate list; the first selector that
//! matches wins. Submitting waits for network quiescence and then a fixed
//! settle delay, because the result table keeps rendering asynchronously
//! after the page itself has settled.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::direction::Direction;
use crate::session::{PageSession, errors::SessionError};

/// Portal origin used when the configuration does not override it.
pub const DEFAULT_BASE_URL: &str = "https://www.airportal.go.kr";

/// Schedule query page path.
pub const SCHEDULE_PAGE: &str = "/knowledge/airplanSchedule/airplaneSchedule.do";

/// Live departure/arrival board page path.
pub const LIVE_PAGE: &str = "/knowledge/aircraftInfo/aircraftInfo.do";

const AIRPORT_SELECTS: &[&str] = &[
    "#airportCode",
    "select[name=\"sch_dpt_cd\"]",
    "select[id=\"sch_dpt_cd\"]",
    "select[name=\"depAirportCode\"]",
    "#depAirportCode",
];

const COUNTERPART_SELECTS: &[&str] = &[
    "select[name=\"sch_arr_cd\"]",
    "select[id=\"sch_arr_cd\"]",
    "select[name=\"arrAirportCode\"]",
    "#arrAirportCode",
];

const DIRECTION_SELECTS: &[&str] = &[
    "select[name=\"current_dep_arr\"]",
    "select[name=\"depArr\"]",
];

const SEARCH_BUTTONS: &[&str] = &[
    "button.btn-search",
    "button[type=\"submit\"]",
    "input[type=\"submit\"]",
    "a.btn_search",
    "#searchBtn",
];

/// Knobs for one crawl pass.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Portal origin, without a trailing slash.
    pub base_url: String,
    /// Bound on every quiescence wait.
    pub page_timeout: Duration,
    /// Extra wait after submit for asynchronous result rendering.
    pub settle_delay: Duration,
    /// Additional attempts for the initial page load. Zero keeps the
    /// next-cycle-is-the-retry policy.
    pub nav_retries: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(3),
            nav_retries: 0,
        }
    }
}

/// One schedule query: which airport, which side of the board, and an
/// optional counterpart airport to narrow the route.
#[derive(Debug, Clone)]
pub struct ScheduleQuery {
    /// 3-letter airport code supplied by configuration.
    pub airport: String,
    /// Departure or arrival board.
    pub direction: Direction,
    /// Optional route filter (e.g. NRT when asking for PUS→NRT only).
    pub counterpart: Option<String>,
}

impl ScheduleQuery {
    /// The common case: all departures of one airport.
    pub fn departures(airport: &str) -> Self {
        Self {
            airport: airport.to_string(),
            direction: Direction::Departure,
            counterpart: None,
        }
    }
}

/// Failures while driving the query page.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// The configured code has no option in the portal's airport select.
    /// Persistent until the configuration changes.
    #[error("Airport {code} is not offered by the portal")]
    InvalidAirport {
        /// The rejected code.
        code: String,
    },

    /// Everything the underlying session can fail with.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Opens the schedule page, applies the query's filters, and submits.
///
/// On success the session's page holds rendered results ready for
/// extraction.
pub async fn open_schedule(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    query: &ScheduleQuery,
) -> Result<(), NavigatorError> {
    goto(session, opts, SCHEDULE_PAGE).await?;

    select_airport(session, &query.airport).await?;

    if let Err(e) = select_first(session, DIRECTION_SELECTS, query.direction.portal_label()).await {
        // Some page generations serve a single-direction board with no
        // direction control at all.
        debug!(error = %e, "no direction control; assuming single-direction page");
    }

    if let Some(code) = &query.counterpart {
        if let Err(e) = select_first(session, COUNTERPART_SELECTS, code).await {
            debug!(error = %e, counterpart = %code, "counterpart select unavailable");
        }
    }

    submit_and_settle(session, opts).await?;
    Ok(())
}

/// Opens the live departure/arrival board page for one airport.
pub async fn open_live_board(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    airport: &str,
) -> Result<(), NavigatorError> {
    goto(session, opts, LIVE_PAGE).await?;
    select_airport(session, airport).await?;
    submit_and_settle(session, opts).await?;
    Ok(())
}

async fn select_airport(session: &dyn PageSession, airport: &str) -> Result<(), NavigatorError> {
    match select_first(session, AIRPORT_SELECTS, airport).await {
        Ok(()) => Ok(()),
        Err(SessionError::InvalidOption { .. }) => Err(NavigatorError::InvalidAirport {
            code: airport.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

async fn goto(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    page: &str,
) -> Result<(), SessionError> {
    let url = format!("{}{}", opts.base_url.trim_end_matches('/'), page);
    let mut attempt = 0;
    loop {
        let result = match session.navigate(&url).await {
            Ok(()) => session.wait_for_quiescence(opts.page_timeout).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => return Ok(()),
            Err(e) if attempt < opts.nav_retries => {
                warn!(%url, error = %e, attempt, "page load failed; retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Tries each candidate selector in order; the first present select wins.
/// An existing select without the requested option is a hard stop — the
/// page was found, the value is simply not offered.
async fn select_first(
    session: &dyn PageSession,
    selectors: &[&str],
    value: &str,
) -> Result<(), SessionError> {
    let mut last_missing = None;
    for selector in selectors {
        match session.select_option(selector, value).await {
            Ok(()) => return Ok(()),
            Err(e @ SessionError::MissingElement { .. }) => {
                last_missing = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_missing.unwrap_or_else(|| SessionError::MissingElement {
        selector: selectors.join(", "),
    }))
}

async fn submit_and_settle(
    session: &dyn PageSession,
    opts: &CrawlOptions,
) -> Result<(), SessionError> {
    let mut clicked = false;
    for selector in SEARCH_BUTTONS {
        match session.click(selector).await {
            Ok(()) => {
                clicked = true;
                break;
            }
            Err(SessionError::MissingElement { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    if !clicked {
        return Err(SessionError::Navigation {
            message: "no search control found on the query page".to_string(),
        });
    }
    session.wait_for_quiescence(opts.page_timeout).await?;
    tokio::time::sleep(opts.settle_delay).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{FakePageSession, Scripted};
    use std::collections::HashMap;

    fn fast_opts() -> CrawlOptions {
        CrawlOptions {
            settle_delay: Duration::from_millis(0),
            ..CrawlOptions::default()
        }
    }

    fn rows_outcome() -> Scripted {
        Scripted::Rows {
            selector: "table.schedule-table tbody tr".to_string(),
            rows: vec![],
        }
    }

    #[tokio::test]
    async fn opens_the_schedule_page_and_submits() {
        let session =
            FakePageSession::new(HashMap::from([("PUS".to_string(), rows_outcome())]));
        open_schedule(&session, &fast_opts(), &ScheduleQuery::departures("PUS"))
            .await
            .unwrap();

        let visited = session.visited();
        assert_eq!(visited.len(), 1);
        assert_eq!(
            visited[0],
            format!("{DEFAULT_BASE_URL}{SCHEDULE_PAGE}")
        );
        assert_eq!(session.clicked().len(), 1);
    }

    #[tokio::test]
    async fn unknown_airport_option_maps_to_invalid_airport() {
        let session =
            FakePageSession::new(HashMap::from([("XXX".to_string(), Scripted::UnknownAirport)]));
        let err = open_schedule(&session, &fast_opts(), &ScheduleQuery::departures("XXX"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavigatorError::InvalidAirport { code } if code == "XXX"));
    }

    #[tokio::test]
    async fn scripted_timeout_surfaces_as_session_timeout() {
        let session = FakePageSession::new(HashMap::from([(
            "PUS".to_string(),
            Scripted::TimeoutOnQuiescence,
        )]));
        let err = open_schedule(&session, &fast_opts(), &ScheduleQuery::departures("PUS"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NavigatorError::Session(SessionError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn falls_back_across_search_button_candidates() {
        let session = FakePageSession::new(HashMap::from([("PUS".to_string(), rows_outcome())]))
            .with_missing_selectors(&["button.btn-search", "button[type=\"submit\"]"]);
        open_schedule(&session, &fast_opts(), &ScheduleQuery::departures("PUS"))
            .await
            .unwrap();
        assert_eq!(session.clicked(), vec!["input[type=\"submit\"]".to_string()]);
    }

    #[tokio::test]
    async fn page_without_any_search_control_is_a_navigation_error() {
        let session = FakePageSession::new(HashMap::from([("PUS".to_string(), rows_outcome())]))
            .with_missing_selectors(SEARCH_BUTTONS);
        let err = open_schedule(&session, &fast_opts(), &ScheduleQuery::departures("PUS"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NavigatorError::Session(SessionError::Navigation { .. })
        ));
    }
}
