//! Lock-free, read-mostly refresh status.
//!
//! Readers (the health interface) call [`StatusBoard::snapshot`], which
//! loads an `Arc<RefreshStatus>` with no locking contention. The
//! orchestrator swaps in a new snapshot when a cycle starts and when it
//! finishes. State lives in the board instance handed around by the
//! owner; there is no process-wide static.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::refresh::{CycleKind, CycleOutcome, CycleReport};

/// Summary of the most recent run of one cycle kind.
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    /// Where the run currently stands, or how it ended.
    pub outcome: CycleOutcome,
    /// When the run ended; `None` while pending or running.
    pub finished_at: Option<DateTime<FixedOffset>>,
    /// Airports that failed during the run.
    pub failed_airports: Vec<String>,
}

impl Default for RunInfo {
    fn default() -> Self {
        Self {
            outcome: CycleOutcome::Pending,
            finished_at: None,
            failed_airports: Vec::new(),
        }
    }
}

/// Process-wide refresh state. Never persisted; reset by restart.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStatus {
    /// Most recent daily schedule cycle.
    pub last_daily: RunInfo,
    /// Most recent periodic live cycle.
    pub last_periodic: RunInfo,
}

/// Holder of the current [`RefreshStatus`] snapshot.
pub struct StatusBoard {
    inner: ArcSwap<RefreshStatus>,
}

impl StatusBoard {
    /// A board with both cycles pending.
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(RefreshStatus::default()),
        }
    }

    /// The current snapshot. Cheap: one atomic load.
    pub fn snapshot(&self) -> Arc<RefreshStatus> {
        self.inner.load_full()
    }

    pub(crate) fn mark_running(&self, kind: CycleKind) {
        self.update(kind, |run| {
            run.outcome = CycleOutcome::Running;
            run.finished_at = None;
            run.failed_airports.clear();
        });
    }

    pub(crate) fn record(&self, report: &CycleReport) {
        self.update(report.kind, |run| {
            run.outcome = report.outcome;
            run.finished_at = Some(report.finished_at);
            run.failed_airports = report.failed_airports.clone();
        });
    }

    fn update(&self, kind: CycleKind, mutate: impl FnOnce(&mut RunInfo)) {
        let mut next = RefreshStatus::clone(&self.inner.load());
        let slot = match kind {
            CycleKind::Daily => &mut next.last_daily,
            CycleKind::Periodic => &mut next.last_periodic,
        };
        mutate(slot);
        self.inner.store(Arc::new(next));
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kst;

    fn report(kind: CycleKind, outcome: CycleOutcome, failed: &[&str]) -> CycleReport {
        CycleReport {
            kind,
            outcome,
            attempted: 3,
            failed_airports: failed.iter().map(|s| s.to_string()).collect(),
            started_at: kst::now(),
            finished_at: kst::now(),
        }
    }

    #[test]
    fn starts_pending_and_tracks_each_kind_separately() {
        let board = StatusBoard::new();
        let initial = board.snapshot();
        assert_eq!(initial.last_daily.outcome, CycleOutcome::Pending);
        assert_eq!(initial.last_periodic.outcome, CycleOutcome::Pending);

        board.mark_running(CycleKind::Daily);
        let running = board.snapshot();
        assert_eq!(running.last_daily.outcome, CycleOutcome::Running);
        assert_eq!(running.last_periodic.outcome, CycleOutcome::Pending);

        board.record(&report(CycleKind::Daily, CycleOutcome::Partial, &["TAE"]));
        let done = board.snapshot();
        assert_eq!(done.last_daily.outcome, CycleOutcome::Partial);
        assert_eq!(done.last_daily.failed_airports, vec!["TAE"]);
        assert!(done.last_daily.finished_at.is_some());
    }

    #[test]
    fn old_snapshots_are_unaffected_by_later_updates() {
        let board = StatusBoard::new();
        let before = board.snapshot();
        board.record(&report(CycleKind::Periodic, CycleOutcome::Success, &[]));
        assert_eq!(before.last_periodic.outcome, CycleOutcome::Pending);
        assert_eq!(
            board.snapshot().last_periodic.outcome,
            CycleOutcome::Success
        );
    }

    #[test]
    fn a_new_run_clears_the_previous_failure_set() {
        let board = StatusBoard::new();
        board.record(&report(CycleKind::Daily, CycleOutcome::Partial, &["TAE"]));
        board.mark_running(CycleKind::Daily);
        let snapshot = board.snapshot();
        assert!(snapshot.last_daily.failed_airports.is_empty());
        assert!(snapshot.last_daily.finished_at.is_none());
    }
}
