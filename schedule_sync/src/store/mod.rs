//! Latest/archive cache for crawled artifacts.
//!
//! Two tiers: `latest/` holds the current artifact per airport and is
//! overwritten in place on every successful cycle; `archive/<stamp>/`
//! holds an immutable copy per cycle and is never read back by the
//! running system. Every write produces a JSON and a CSV rendition in
//! both tiers, and every file lands via an atomic temp-file rename so a
//! torn write can never corrupt the previous latest.
//!
//! Write failures surface as [`StoreError`] and are the caller's problem:
//! an unwritten cache must never be reported as a success.

mod csv;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use flight_data_ingestor::models::live::LiveBoard;
use flight_data_ingestor::models::schedule::AirportSchedule;
use serde::Serialize;
use snafu::{Backtrace, ResultExt, Snafu};

pub use csv::{DAY_MARKER, parse_rows};

/// Which artifact family a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CacheKind {
    /// Daily flight schedules.
    Schedule,
    /// Periodic live departure/arrival boards.
    LiveStatus,
}

impl CacheKind {
    fn prefix(self) -> &'static str {
        match self {
            CacheKind::Schedule => "schedule",
            CacheKind::LiveStatus => "live",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Schedule => write!(f, "schedule"),
            CacheKind::LiveStatus => write!(f, "live status"),
        }
    }
}

/// Serialization format of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CacheFormat {
    /// Pretty-printed JSON, the primary machine-readable form.
    Json,
    /// Excel-friendly CSV.
    Csv,
}

impl CacheFormat {
    fn extension(self) -> &'static str {
        match self {
            CacheFormat::Json => "json",
            CacheFormat::Csv => "csv",
        }
    }
}

/// Errors from the cache writer and reader.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// A cache artifact could not be written to disk.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Captured at construction.
        backtrace: Backtrace,
    },

    /// A payload could not be serialized.
    #[snafu(display("Failed to encode {what}: {source}"))]
    Encode {
        /// What was being serialized.
        what: String,
        /// Underlying serialization error.
        source: serde_json::Error,
        /// Captured at construction.
        backtrace: Backtrace,
    },

    /// A cached artifact could not be read back.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Read {
        /// Source path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Captured at construction.
        backtrace: Backtrace,
    },

    /// No latest artifact exists for this airport and kind.
    #[snafu(display("No cached {kind} data for {airport}"))]
    NotFound {
        /// Requested airport code.
        airport: String,
        /// Requested artifact family.
        kind: CacheKind,
    },
}

/// The on-disk cache, rooted at one output directory.
pub struct FlightStore {
    latest_dir: PathBuf,
    archive_dir: PathBuf,
}

impl FlightStore {
    /// Opens (and creates, if needed) the cache under `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let latest_dir = root.join("latest");
        let archive_dir = root.join("archive");
        fs::create_dir_all(&latest_dir).context(WriteSnafu {
            path: latest_dir.clone(),
        })?;
        fs::create_dir_all(&archive_dir).context(WriteSnafu {
            path: archive_dir.clone(),
        })?;
        Ok(Self {
            latest_dir,
            archive_dir,
        })
    }

    /// The mutable current-state tier.
    pub fn latest_dir(&self) -> &Path {
        &self.latest_dir
    }

    /// The append-only historical tier.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Persists one airport's schedule for the cycle stamped `stamp`.
    ///
    /// `total_flights` is recomputed before anything hits the disk, so a
    /// caller-tampered count can never be persisted.
    pub fn write_schedule(
        &self,
        stamp: &str,
        schedule: &AirportSchedule,
    ) -> Result<(), StoreError> {
        let mut schedule = schedule.clone();
        schedule.recompute_total();
        let json = encode_json(&schedule, || {
            format!("schedule for {}", schedule.airport_code)
        })?;
        let csv = csv::schedule_to_csv(&schedule).into_bytes();
        self.write_pair(stamp, CacheKind::Schedule, &schedule.airport_code, &json, &csv)
    }

    /// Persists one airport's live board for the cycle stamped `stamp`.
    /// Empty boards are stored as-is.
    pub fn write_live(&self, stamp: &str, board: &LiveBoard) -> Result<(), StoreError> {
        let json = encode_json(board, || format!("live board for {}", board.airport_code))?;
        let csv = csv::live_to_csv(board).into_bytes();
        self.write_pair(stamp, CacheKind::LiveStatus, &board.airport_code, &json, &csv)
    }

    /// Reads the latest artifact for an airport.
    ///
    /// The archive is never consulted; a missing latest file is
    /// [`StoreError::NotFound`].
    pub fn read_latest(
        &self,
        airport: &str,
        kind: CacheKind,
        format: CacheFormat,
    ) -> Result<Vec<u8>, StoreError> {
        let path = self.latest_dir.join(file_name(kind, airport, format));
        if !path.exists() {
            return NotFoundSnafu { airport, kind }.fail();
        }
        fs::read(&path).context(ReadSnafu { path })
    }

    fn write_pair(
        &self,
        stamp: &str,
        kind: CacheKind,
        airport: &str,
        json: &[u8],
        csv: &[u8],
    ) -> Result<(), StoreError> {
        let archive = self.archive_dir.join(stamp);
        fs::create_dir_all(&archive).context(WriteSnafu {
            path: archive.clone(),
        })?;

        for (format, bytes) in [(CacheFormat::Json, json), (CacheFormat::Csv, csv)] {
            let name = file_name(kind, airport, format);
            for dir in [&archive, &self.latest_dir] {
                let path = dir.join(&name);
                shared_utils::fs::write_atomic(&path, bytes)
                    .context(WriteSnafu { path: path.clone() })?;
            }
        }
        Ok(())
    }
}

fn encode_json<T: Serialize>(
    value: &T,
    what: impl FnOnce() -> String,
) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).context(EncodeSnafu { what: what() })
}

fn file_name(kind: CacheKind, airport: &str, format: CacheFormat) -> String {
    format!("{}_{}.{}", kind.prefix(), airport, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use flight_data_ingestor::models::days::OperatingDays;
    use flight_data_ingestor::models::flight::FlightRecord;
    use flight_data_ingestor::models::schedule::ExtractionMethod;
    use tempfile::TempDir;

    fn crawled_at() -> DateTime<chrono::FixedOffset> {
        "2025-07-01T03:00:00+09:00".parse().unwrap()
    }

    fn sample_schedule() -> AirportSchedule {
        AirportSchedule::new(
            "PUS",
            Some("김해공항".into()),
            crawled_at(),
            ExtractionMethod::Table,
            vec![FlightRecord {
                airline: "에어부산".into(),
                flight_number: "BX164".into(),
                origin: "PUS".into(),
                destination: "NRT".into(),
                departure_time: "07:35".into(),
                arrival_time: "10:05".into(),
                aircraft: String::new(),
                days: OperatingDays::every_day(),
            }],
        )
    }

    #[test]
    fn writes_all_four_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        store.write_schedule("20250701_030000", &sample_schedule()).unwrap();

        for name in ["schedule_PUS.json", "schedule_PUS.csv"] {
            assert!(store.latest_dir().join(name).exists(), "latest {name}");
            assert!(
                store.archive_dir().join("20250701_030000").join(name).exists(),
                "archive {name}"
            );
        }
    }

    #[test]
    fn read_latest_round_trips_json() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        store.write_schedule("20250701_030000", &sample_schedule()).unwrap();

        let bytes = store
            .read_latest("PUS", CacheKind::Schedule, CacheFormat::Json)
            .unwrap();
        let parsed: AirportSchedule = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, {
            let mut s = sample_schedule();
            s.recompute_total();
            s
        });
    }

    #[test]
    fn tampered_total_is_recomputed_on_write() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        let mut schedule = sample_schedule();
        schedule.total_flights = 99;
        store.write_schedule("20250701_030000", &schedule).unwrap();

        let bytes = store
            .read_latest("PUS", CacheKind::Schedule, CacheFormat::Json)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["totalFlights"], 1);
    }

    #[test]
    fn missing_entry_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        let err = store
            .read_latest("PUS", CacheKind::Schedule, CacheFormat::Json)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(err.to_string().contains("PUS"));
    }

    #[test]
    fn no_temporary_droppings_survive_a_write() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        store.write_schedule("20250701_030000", &sample_schedule()).unwrap();

        let archive = store.archive_dir().join("20250701_030000");
        for tier in [store.latest_dir(), archive.as_path()] {
            let leftovers: Vec<_> = fs::read_dir(tier)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                .collect();
            assert!(leftovers.is_empty());
        }
    }

    #[test]
    fn archive_entries_from_distinct_stamps_coexist() {
        let dir = TempDir::new().unwrap();
        let store = FlightStore::new(dir.path()).unwrap();
        store.write_schedule("20250701_030000", &sample_schedule()).unwrap();
        store.write_schedule("20250701_030001", &sample_schedule()).unwrap();

        let cycles: Vec<_> = fs::read_dir(store.archive_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(cycles.len(), 2);
    }
}
