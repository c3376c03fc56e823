//! Read/trigger/health facade over the refresher.
//!
//! REST front ends mount on this one injected service instead of sharing
//! module-level dictionaries. Reads always come from the `latest/` tier;
//! a failed refresh therefore keeps serving the last good data
//! indefinitely.

use std::sync::Arc;

use crate::refresh::status::RefreshStatus;
use crate::refresh::{CycleKind, Refresher, TriggerAck};
use crate::store::{CacheFormat, CacheKind, NotFoundSnafu, StoreError};

/// The read, trigger, and health interface consumers are built on.
pub struct FlightDataService {
    refresher: Arc<Refresher>,
}

impl FlightDataService {
    /// Wraps a refresher.
    pub fn new(refresher: Arc<Refresher>) -> Self {
        Self { refresher }
    }

    /// Latest schedule payload for one airport, in the requested format.
    ///
    /// Airports outside the configured list report `NotFound` without
    /// touching the disk.
    pub fn get_latest_schedule(
        &self,
        airport: &str,
        format: CacheFormat,
    ) -> Result<Vec<u8>, StoreError> {
        let code = airport.to_uppercase();
        self.ensure_configured(&code, CacheKind::Schedule)?;
        self.refresher
            .store()
            .read_latest(&code, CacheKind::Schedule, format)
    }

    /// Latest live-status payload for one airport, in the requested format.
    pub fn get_latest_live_status(
        &self,
        airport: &str,
        format: CacheFormat,
    ) -> Result<Vec<u8>, StoreError> {
        let code = airport.to_uppercase();
        self.ensure_configured(&code, CacheKind::LiveStatus)?;
        self.refresher
            .store()
            .read_latest(&code, CacheKind::LiveStatus, format)
    }

    /// The configured airports, code and display name, in crawl order.
    pub fn airports(&self) -> Vec<(String, String)> {
        self.refresher
            .config()
            .airports
            .iter()
            .map(|(code, name)| (code.clone(), name.clone()))
            .collect()
    }

    /// Snapshot of both cycles' status, for the health interface.
    pub fn status(&self) -> Arc<RefreshStatus> {
        self.refresher.status().snapshot()
    }

    /// Fire-and-forget daily refresh. Returns immediately with an
    /// acknowledgement, never the result.
    pub fn trigger_daily_refresh(&self) -> TriggerAck {
        self.refresher.try_trigger(CycleKind::Daily)
    }

    /// Fire-and-forget live-status refresh.
    pub fn trigger_periodic_refresh(&self) -> TriggerAck {
        self.refresher.try_trigger(CycleKind::Periodic)
    }

    fn ensure_configured(&self, code: &str, kind: CacheKind) -> Result<(), StoreError> {
        if self.refresher.config().airports.contains_key(code) {
            Ok(())
        } else {
            NotFoundSnafu {
                airport: code,
                kind,
            }
            .fail()
        }
    }
}
