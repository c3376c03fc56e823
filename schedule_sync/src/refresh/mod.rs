//! Cycle orchestration over the configured airports.
//!
//! A cycle walks the airport list in configuration order, crawling one
//! airport at a time over a single shared browser session and always
//! sleeping the configured inter-airport delay, whatever the outcome —
//! the pacing bounds our request rate against the portal, not our own
//! throughput. One airport's failure is caught, logged, and recorded;
//! only a setup failure (no browser at all) fails the cycle itself.
//!
//! The two schedules share one browser, so cycles are serialized by a
//! gate: scheduled runs wait their turn, manual triggers are rejected
//! while anything is running.

pub mod status;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use flight_data_ingestor::crawl;
use flight_data_ingestor::models::live::LiveBoard;
use flight_data_ingestor::models::schedule::{AirportSchedule, ExtractionMethod};
use flight_data_ingestor::navigator::{CrawlOptions, NavigatorError, ScheduleQuery};
use flight_data_ingestor::session::{PageSession, SessionFactory};

use crate::config::CrawlerConfig;
use crate::kst;
use crate::store::{FlightStore, StoreError};
use status::StatusBoard;

/// Which refresh schedule a cycle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    /// Full schedule refresh, once a day.
    Daily,
    /// Lightweight live-status refresh, every few minutes.
    Periodic,
}

impl std::fmt::Display for CycleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleKind::Daily => write!(f, "daily"),
            CycleKind::Periodic => write!(f, "periodic"),
        }
    }
}

/// States a cycle moves through: `pending → running → {success | partial
/// | failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Never run since process start.
    Pending,
    /// Currently walking the airport list.
    Running,
    /// Every airport succeeded.
    Success,
    /// At least one airport failed; the rest were still attempted.
    Partial,
    /// Setup failed before any airport was attempted.
    Failed,
}

/// Summary of one finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Which schedule ran.
    pub kind: CycleKind,
    /// How it ended.
    pub outcome: CycleOutcome,
    /// Airports the cycle attempted.
    pub attempted: usize,
    /// Airports that failed, in attempt order.
    pub failed_airports: Vec<String>,
    /// When the cycle started (Seoul local).
    pub started_at: DateTime<FixedOffset>,
    /// When the cycle finished (Seoul local).
    pub finished_at: DateTime<FixedOffset>,
}

/// Acknowledgement for a fire-and-forget trigger.
#[derive(Debug)]
pub enum TriggerAck {
    /// The cycle was started; the handle resolves to its report. Callers
    /// that only wanted the acknowledgement may drop it.
    Started(JoinHandle<CycleReport>),
    /// A cycle already holds the browser; nothing was started.
    AlreadyRunning,
}

/// Why one airport failed within a cycle.
#[derive(Debug, Error)]
enum AirportFailure {
    #[error(transparent)]
    Navigation(#[from] NavigatorError),

    #[error("extraction yielded {got} flights, below the configured minimum {need}")]
    BelowMinimum { got: usize, need: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs refresh cycles and owns everything they touch: configuration,
/// the cache store, the session factory, and the status board.
pub struct Refresher {
    config: CrawlerConfig,
    store: FlightStore,
    sessions: Arc<dyn SessionFactory>,
    status: StatusBoard,
    gate: Arc<Mutex<()>>,
}

impl Refresher {
    /// Assembles a refresher. Nothing runs until a cycle is requested.
    pub fn new(config: CrawlerConfig, store: FlightStore, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            config,
            store,
            sessions,
            status: StatusBoard::new(),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// The cache store cycles write into.
    pub fn store(&self) -> &FlightStore {
        &self.store
    }

    /// The status board cycles report to.
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Runs one cycle, waiting for the browser gate if another cycle is
    /// in flight. This is the path scheduled jobs use.
    pub async fn run_cycle(&self, kind: CycleKind) -> CycleReport {
        let _guard = self.gate.lock().await;
        self.run_locked(kind).await
    }

    /// Starts a cycle without waiting: if any cycle currently holds the
    /// browser, returns [`TriggerAck::AlreadyRunning`] and starts
    /// nothing. This is the path manual triggers use — a second trigger
    /// must never open a second browser session.
    pub fn try_trigger(self: &Arc<Self>, kind: CycleKind) -> TriggerAck {
        match Arc::clone(&self.gate).try_lock_owned() {
            Ok(guard) => {
                let refresher = Arc::clone(self);
                TriggerAck::Started(tokio::spawn(async move {
                    let _guard = guard;
                    refresher.run_locked(kind).await
                }))
            }
            Err(_) => TriggerAck::AlreadyRunning,
        }
    }

    async fn run_locked(&self, kind: CycleKind) -> CycleReport {
        let started_at = kst::now();
        let stamp = kst::cycle_stamp(started_at);
        self.status.mark_running(kind);
        info!(%kind, "starting refresh cycle");

        let session = match self.sessions.open().await {
            Ok(session) => session,
            Err(e) => {
                error!(%kind, error = %e, "could not open a browser session; cycle failed");
                let report = CycleReport {
                    kind,
                    outcome: CycleOutcome::Failed,
                    attempted: 0,
                    failed_airports: Vec::new(),
                    started_at,
                    finished_at: kst::now(),
                };
                self.status.record(&report);
                return report;
            }
        };

        let failed = match kind {
            CycleKind::Daily => self.schedule_pass(session.as_ref(), &stamp).await,
            CycleKind::Periodic => self.live_pass(session.as_ref(), &stamp).await,
        };

        if let Err(e) = session.close().await {
            warn!(error = %e, "browser session did not close cleanly");
        }

        let report = CycleReport {
            kind,
            outcome: if failed.is_empty() {
                CycleOutcome::Success
            } else {
                CycleOutcome::Partial
            },
            attempted: self.config.airports.len(),
            failed_airports: failed,
            started_at,
            finished_at: kst::now(),
        };
        self.status.record(&report);
        info!(
            %kind,
            outcome = ?report.outcome,
            failed = report.failed_airports.len(),
            "cycle finished"
        );
        report
    }

    async fn schedule_pass(&self, session: &dyn PageSession, stamp: &str) -> Vec<String> {
        let opts = self.config.crawler.crawl_options();
        let delay = Duration::from_millis(self.config.crawler.schedule_delay_ms);
        let mut failed = Vec::new();

        for (code, name) in &self.config.airports {
            match self.crawl_one_schedule(session, &opts, stamp, code, name).await {
                Ok(total) => info!(airport = %code, flights = total, "cached schedule"),
                Err(e) => {
                    warn!(airport = %code, error = %e, "schedule crawl failed");
                    failed.push(code.clone());
                }
            }
            tokio::time::sleep(delay).await;
        }
        failed
    }

    async fn crawl_one_schedule(
        &self,
        session: &dyn PageSession,
        opts: &CrawlOptions,
        stamp: &str,
        code: &str,
        name: &str,
    ) -> Result<usize, AirportFailure> {
        let query = ScheduleQuery::departures(code);
        let outcome = crawl::fetch_schedule(session, opts, &query).await?;
        if outcome.method == ExtractionMethod::TextScan {
            warn!(airport = %code, "structured extraction failed; records are text-scan confidence");
        }

        let min = self.config.crawler.min_flight_count;
        if outcome.flights.len() < min {
            return Err(AirportFailure::BelowMinimum {
                got: outcome.flights.len(),
                need: min,
            });
        }

        let schedule = AirportSchedule::new(
            code,
            Some(name.to_string()),
            kst::now(),
            outcome.method,
            outcome.flights,
        );
        self.store.write_schedule(stamp, &schedule)?;
        Ok(schedule.total_flights)
    }

    async fn live_pass(&self, session: &dyn PageSession, stamp: &str) -> Vec<String> {
        let opts = self.config.crawler.crawl_options();
        let delay = Duration::from_millis(self.config.crawler.live_delay_ms);
        let mut failed = Vec::new();

        for code in self.config.airports.keys() {
            match self.crawl_one_live(session, &opts, stamp, code).await {
                Ok((departures, arrivals)) => {
                    info!(airport = %code, departures, arrivals, "cached live boards");
                }
                Err(e) => {
                    warn!(airport = %code, error = %e, "live crawl failed");
                    failed.push(code.clone());
                }
            }
            tokio::time::sleep(delay).await;
        }
        failed
    }

    async fn crawl_one_live(
        &self,
        session: &dyn PageSession,
        opts: &CrawlOptions,
        stamp: &str,
        code: &str,
    ) -> Result<(usize, usize), AirportFailure> {
        let snapshot = crawl::fetch_live_board(session, opts, code).await?;
        // No acceptance gate here: an empty board is a valid observation.
        let board = LiveBoard::new(code, kst::now(), snapshot);
        let counts = (board.departures.len(), board.arrivals.len());
        self.store.write_live(stamp, &board)?;
        Ok(counts)
    }
}
