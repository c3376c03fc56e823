//! Crawler configuration: parsing, normalization, and loading.
//!
//! This module defines a TOML-backed configuration that describes:
//! - Which airports to crawl (ordered code → display-name map)
//! - Where cache artifacts go and how the browser is driven
//! - Pacing, acceptance, and scheduling knobs for both refresh cycles
//!
//! Key behaviors:
//! - Normalization trims and uppercases airport codes, de-duplicates
//!   entries while preserving order, and checks the three-letter shape.
//! - Codes missing from the bundled Korean airport table are warned about
//!   or rejected depending on [`UnknownAirportPolicy`].
//! - A couple of deployment-sensitive settings can be overridden from the
//!   environment (`FLIGHT_OUTPUT_DIR`, `FLIGHT_HEADLESS`).
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]
//! - Normalization with explicit policy: [`normalize_config_with_policy`]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use flight_data_ingestor::navigator::{CrawlOptions, DEFAULT_BASE_URL};
use flight_data_ingestor::session::SessionOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared_utils::env::optional_env_var;
use toml::from_str;
use tracing::warn;

/// Domestic airports the portal serves, code and Korean display name.
/// Used to sanity-check configured codes; the portal itself remains the
/// final authority at crawl time.
pub const KNOWN_AIRPORTS: &[(&str, &str)] = &[
    ("ICN", "인천공항"),
    ("GMP", "김포공항"),
    ("CJJ", "청주공항"),
    ("YNY", "양양공항"),
    ("KUV", "군산공항"),
    ("WJU", "원주공항"),
    ("PUS", "김해공항"),
    ("CJU", "제주공항"),
    ("TAE", "대구공항"),
    ("KWJ", "광주공항"),
    ("RSU", "여수공항"),
    ("USN", "울산공항"),
    ("KPO", "포항경주공항"),
    ("HIN", "사천공항"),
    ("MWX", "무안공항"),
];

/// Looks up the bundled display name for an airport code.
pub fn known_airport_name(code: &str) -> Option<&'static str> {
    KNOWN_AIRPORTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Top-level crawler configuration.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Behavior knobs shared by both refresh cycles.
    #[serde(default)]
    pub crawler: CrawlerSettings,

    /// Ordered map of airport code → display name. Codes are normalized
    /// (trimmed, uppercased) by [`normalize_config_with_policy`].
    pub airports: IndexMap<String, String>,
}

/// Behavior knobs for the crawl and its two schedules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CrawlerSettings {
    /// Portal origin, without a trailing slash.
    pub base_url: String,

    /// Root directory for `latest/` and `archive/`.
    pub output_dir: PathBuf,

    /// Run the browser without a visible window.
    pub headless: bool,

    /// Schedules with fewer extracted flights than this are rejected and
    /// the airport joins the failure set. A data-quality heuristic, not a
    /// business rule; tune freely.
    pub min_flight_count: usize,

    /// Pause between airports during the daily schedule cycle.
    pub schedule_delay_ms: u64,

    /// Pause between airports during the periodic live cycle.
    pub live_delay_ms: u64,

    /// Bound on every page-settle wait.
    pub page_timeout_secs: u64,

    /// Extra wait after submitting a query, for asynchronous rendering.
    pub settle_delay_ms: u64,

    /// Additional attempts for the initial page load of each query.
    /// Zero keeps the next-cycle-is-the-retry policy.
    pub nav_retries: u32,

    /// Cron expression (six fields, seconds first) for the daily schedule
    /// cycle, evaluated in server-local time.
    pub daily_cron: String,

    /// Interval of the periodic live-status cycle.
    pub live_interval_minutes: u64,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("./out"),
            headless: true,
            min_flight_count: 10,
            schedule_delay_ms: 1000,
            live_delay_ms: 500,
            page_timeout_secs: 30,
            settle_delay_ms: 3000,
            nav_retries: 0,
            daily_cron: "0 0 3 * * *".to_string(),
            live_interval_minutes: 10,
        }
    }
}

impl CrawlerSettings {
    /// Per-query navigation options derived from these settings.
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            base_url: self.base_url.clone(),
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            nav_retries: self.nav_retries,
        }
    }

    /// Browser launch options derived from these settings.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.headless,
            ..SessionOptions::default()
        }
    }

    /// Applies environment overrides: `FLIGHT_OUTPUT_DIR` replaces the
    /// output root, `FLIGHT_HEADLESS=0|false|no` disables headless mode.
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = optional_env_var("FLIGHT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(flag) = optional_env_var("FLIGHT_HEADLESS") {
            self.headless = !matches!(flag.trim().to_lowercase().as_str(), "0" | "false" | "no");
        }
    }
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default)]
pub struct NormalizationReport {
    /// Number of airport codes that changed when trimming/uppercasing.
    pub codes_renamed: usize,
    /// Count of removed duplicate codes after normalization (first
    /// occurrence wins).
    pub duplicates_dropped: usize,
    /// Count of configured codes absent from [`KNOWN_AIRPORTS`].
    pub unknown_airports: usize,
}

/// Policy for configured codes the bundled airport table does not know.
#[derive(Copy, Clone, Debug)]
pub enum UnknownAirportPolicy {
    /// Keep the code and log a warning; the portal decides at crawl time.
    Warn,
    /// Treat as a configuration error.
    Error,
}

/// Normalize a configuration in-place with an explicit unknown-code policy.
///
/// What normalization does:
/// - Trim + uppercase airport codes; reject empties and non-three-letter
///   shapes
/// - Drop duplicate codes after normalization, preserving first-occurrence
///   order
/// - Trim display names; an empty name falls back to the bundled table
///   when the code is known, and is an error otherwise
///
/// Returns a [`NormalizationReport`] detailing the changes made.
pub fn normalize_config_with_policy(
    cfg: &mut CrawlerConfig,
    policy: UnknownAirportPolicy,
) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();

    let mut rebuilt: IndexMap<String, String> = IndexMap::new();
    let old = std::mem::take(&mut cfg.airports);

    for (raw_code, raw_name) in old {
        let code = raw_code.trim().to_uppercase();
        if code.is_empty() {
            bail!("airport code cannot be empty after trimming");
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("airport code must be three letters: {code}");
        }
        if code != raw_code {
            report.codes_renamed += 1;
        }
        if rebuilt.contains_key(&code) {
            report.duplicates_dropped += 1;
            continue;
        }

        if known_airport_name(&code).is_none() {
            report.unknown_airports += 1;
            match policy {
                UnknownAirportPolicy::Warn => {
                    warn!(airport = %code, "configured airport is not in the bundled table");
                }
                UnknownAirportPolicy::Error => {
                    bail!("unknown airport code: {code}");
                }
            }
        }

        let name = raw_name.trim().to_string();
        let name = if name.is_empty() {
            match known_airport_name(&code) {
                Some(known) => known.to_string(),
                None => bail!("no display name for airport {code} and none bundled"),
            }
        } else {
            name
        };

        rebuilt.insert(code, name);
    }

    cfg.airports = rebuilt;
    Ok(report)
}

/// [`normalize_config_with_policy`] with [`UnknownAirportPolicy::Warn`],
/// so unknown codes are kept and only logged.
pub fn normalize_config(cfg: &mut CrawlerConfig) -> anyhow::Result<NormalizationReport> {
    normalize_config_with_policy(cfg, UnknownAirportPolicy::Warn)
}

/// Parse and normalize a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<CrawlerConfig> {
    let mut cfg: CrawlerConfig = from_str(toml_str).context("failed to parse crawler TOML")?;
    let _report = normalize_config(&mut cfg).context("normalize_config failed")?;
    Ok(cfg)
}

/// Read a configuration TOML file from disk, parse, and normalize it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<CrawlerConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
