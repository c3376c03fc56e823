//! Scripted in-memory [`PageSession`] for exercising the crawl pipeline
//! without a browser.
//!
//! Scripts are keyed by airport code: selecting a code in any `<select>`
//! switches the fake page to that airport's scripted outcome, which then
//! drives what `wait_for_quiescence`, `query_rows`, and `page_text` return.
//! Navigating resets the current outcome, matching how a real page load
//! discards prior results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::session::{PageSession, SessionFactory, errors::SessionError};

/// What the fake portal "renders" once a given airport has been selected.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// A results table under `selector`, one cell-text vector per row.
    Rows {
        /// Row selector the table answers to.
        selector: String,
        /// Cell texts per row.
        rows: Vec<Vec<String>>,
    },
    /// No recognizable table; only free text for the degraded scan.
    BodyText(String),
    /// Live departure/arrival boards.
    Live {
        /// Departure board rows.
        departures: Vec<Vec<String>>,
        /// Arrival board rows.
        arrivals: Vec<Vec<String>>,
    },
    /// The airport select has no option for this code.
    UnknownAirport,
    /// The post-submit wait never settles.
    TimeoutOnQuiescence,
}

#[derive(Default)]
struct FakeState {
    current: Option<String>,
    visited: Vec<String>,
    clicked: Vec<String>,
}

/// The scripted session. Construct directly or via [`FakeSessionFactory`].
pub struct FakePageSession {
    outcomes: Arc<HashMap<String, Scripted>>,
    missing_selectors: Arc<Vec<String>>,
    state: Mutex<FakeState>,
    closed: AtomicBool,
}

impl FakePageSession {
    /// Builds a session over per-airport scripts.
    pub fn new(outcomes: HashMap<String, Scripted>) -> Self {
        Self::from_shared(Arc::new(outcomes), Arc::new(Vec::new()))
    }

    /// Marks selectors the fake page pretends not to have, for exercising
    /// candidate-fallback paths.
    pub fn with_missing_selectors(mut self, selectors: &[&str]) -> Self {
        self.missing_selectors = Arc::new(selectors.iter().map(|s| s.to_string()).collect());
        self
    }

    fn from_shared(outcomes: Arc<HashMap<String, Scripted>>, missing: Arc<Vec<String>>) -> Self {
        Self {
            outcomes,
            missing_selectors: missing,
            state: Mutex::new(FakeState::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// URLs navigated to, in order.
    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    /// Selectors clicked, in order.
    pub fn clicked(&self) -> Vec<String> {
        self.state.lock().unwrap().clicked.clone()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn scripted(&self) -> Option<Scripted> {
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|code| self.outcomes.get(code))
            .cloned()
    }

    fn is_missing(&self, selector: &str) -> bool {
        self.missing_selectors.iter().any(|s| s == selector)
    }
}

#[async_trait]
impl PageSession for FakePageSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.visited.push(url.to_string());
        state.current = None;
        Ok(())
    }

    async fn wait_for_quiescence(&self, _timeout: Duration) -> Result<(), SessionError> {
        match self.scripted() {
            Some(Scripted::TimeoutOnQuiescence) => Err(SessionError::Timeout {
                operation: "waiting for the page to settle".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        if self.is_missing(selector) {
            return Err(SessionError::MissingElement {
                selector: selector.to_string(),
            });
        }
        if let Some(outcome) = self.outcomes.get(value) {
            if matches!(outcome, Scripted::UnknownAirport) {
                return Err(SessionError::InvalidOption {
                    selector: selector.to_string(),
                    value: value.to_string(),
                });
            }
            self.state.lock().unwrap().current = Some(value.to_string());
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        if self.is_missing(selector) {
            return Err(SessionError::MissingElement {
                selector: selector.to_string(),
            });
        }
        self.state.lock().unwrap().clicked.push(selector.to_string());
        Ok(())
    }

    async fn query_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>, SessionError> {
        match self.scripted() {
            Some(Scripted::Rows { selector, rows }) if selector == row_selector => Ok(rows),
            Some(Scripted::Live {
                departures,
                arrivals,
            }) => {
                if row_selector.contains("departure") {
                    Ok(departures)
                } else if row_selector.contains("arrival") {
                    Ok(arrivals)
                } else {
                    Ok(Vec::new())
                }
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn page_text(&self) -> Result<String, SessionError> {
        match self.scripted() {
            Some(Scripted::BodyText(text)) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out [`FakePageSession`]s sharing one script, and counts how many
/// were opened — cycle tests assert on that count.
pub struct FakeSessionFactory {
    outcomes: Arc<HashMap<String, Scripted>>,
    missing_selectors: Arc<Vec<String>>,
    fail_open: AtomicBool,
    opened: AtomicUsize,
}

impl FakeSessionFactory {
    /// Builds a factory over per-airport scripts.
    pub fn new(outcomes: HashMap<String, Scripted>) -> Self {
        Self {
            outcomes: Arc::new(outcomes),
            missing_selectors: Arc::new(Vec::new()),
            fail_open: AtomicBool::new(false),
            opened: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent `open` fail, simulating a launch failure.
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// How many sessions have been opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeSessionFactory {
    async fn open(&self) -> Result<Box<dyn PageSession>, SessionError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(SessionError::Browser {
                message: "scripted launch failure".to_string(),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePageSession::from_shared(
            Arc::clone(&self.outcomes),
            Arc::clone(&self.missing_selectors),
        )))
    }
}
