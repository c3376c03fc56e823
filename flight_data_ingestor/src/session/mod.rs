//! Browser-session abstraction for the portal crawl.
//!
//! This module defines the [`PageSession`] trait, the seam between the
//! scraping logic and whatever actually renders the page. The production
//! implementation drives a headless Chromium over CDP ([`ChromeSession`]);
//! tests script a [`fake::FakePageSession`] instead, so navigation and
//! extraction are exercised without a browser.
//!
//! [`SessionFactory`] produces sessions; the refresh orchestrator opens one
//! session per cycle through it and is responsible for closing it on every
//! exit path.

pub mod chrome;
pub mod errors;
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;

pub use chrome::{ChromeLauncher, ChromeSession, SessionOptions};
pub use errors::SessionError;

/// One open browser page the crawl logic can drive.
///
/// All calls are suspension points; implementations may block internally but
/// must not hold the async executor hostage (the Chrome implementation
/// pushes every CDP call onto the blocking pool).
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Loads a URL in the session's page.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Waits for the page to reach a quiescent state, bounded by `timeout`.
    async fn wait_for_quiescence(&self, timeout: Duration) -> Result<(), SessionError>;

    /// Selects `value` in the `<select>` matched by `selector`.
    ///
    /// Fails with [`SessionError::MissingElement`] when the selector matches
    /// nothing and [`SessionError::InvalidOption`] when the select exists but
    /// offers no such option.
    async fn select_option(&self, selector: &str, value: &str) -> Result<(), SessionError>;

    /// Clicks the first element matched by `selector`.
    async fn click(&self, selector: &str) -> Result<(), SessionError>;

    /// Returns the cell texts of every row matched by `row_selector`,
    /// one inner `Vec` per row in document order.
    async fn query_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>, SessionError>;

    /// The page's full visible text, for the degraded scan path.
    async fn page_text(&self) -> Result<String, SessionError>;

    /// Releases the session. Safe to call more than once.
    async fn close(&self) -> Result<(), SessionError>;
}

/// Opens fresh page sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Launches a session. A failure here is a cycle-level setup failure
    /// for the caller, not a per-airport one.
    async fn open(&self) -> Result<Box<dyn PageSession>, SessionError>;
}
