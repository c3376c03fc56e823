#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use flight_data_ingestor::session::SessionFactory;
use flight_data_ingestor::session::fake::{FakeSessionFactory, Scripted};
use indexmap::IndexMap;
use schedule_sync::config::{CrawlerConfig, CrawlerSettings};
use schedule_sync::refresh::Refresher;
use schedule_sync::store::FlightStore;
use tempfile::TempDir;

/// Row selector the scripted schedule tables answer to (the first
/// recognizer candidate).
pub const SCHEDULE_SELECTOR: &str = "table.schedule-table tbody tr";

pub fn schedule_row(number: &str, city: &str) -> Vec<String> {
    vec![
        "에어부산".to_string(),
        number.to_string(),
        city.to_string(),
        "07:35".to_string(),
        "10:05".to_string(),
        "월화수목금토일".to_string(),
    ]
}

pub fn schedule_rows(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| schedule_row(&format!("BX{}", 100 + i), "NRT"))
        .collect()
}

pub fn table_outcome(count: usize) -> Scripted {
    Scripted::Rows {
        selector: SCHEDULE_SELECTOR.to_string(),
        rows: schedule_rows(count),
    }
}

pub fn live_row(number: &str) -> Vec<String> {
    vec![
        "대한항공".to_string(),
        number.to_string(),
        "NRT".to_string(),
        "09:00".to_string(),
        "09:10".to_string(),
        "출발".to_string(),
    ]
}

/// Config tuned for tests: no pacing delays, minimum of one flight.
pub fn test_config(airports: &[(&str, &str)]) -> CrawlerConfig {
    let mut map = IndexMap::new();
    for (code, name) in airports {
        map.insert(code.to_string(), name.to_string());
    }
    CrawlerConfig {
        crawler: CrawlerSettings {
            min_flight_count: 1,
            schedule_delay_ms: 0,
            live_delay_ms: 0,
            settle_delay_ms: 0,
            ..CrawlerSettings::default()
        },
        airports: map,
    }
}

pub struct TestRig {
    // Keeps the cache directory alive for the life of the test.
    pub dir: TempDir,
    pub factory: Arc<FakeSessionFactory>,
    pub refresher: Arc<Refresher>,
}

/// Assembles a refresher over a temp cache and a scripted session factory.
pub fn rig(
    airports: &[(&str, &str)],
    scripts: HashMap<String, Scripted>,
    tune: impl FnOnce(&mut CrawlerConfig),
) -> TestRig {
    let dir = TempDir::new().expect("tempdir");
    let mut config = test_config(airports);
    config.crawler.output_dir = dir.path().to_path_buf();
    tune(&mut config);

    let store = FlightStore::new(dir.path()).expect("store");
    let factory = Arc::new(FakeSessionFactory::new(scripts));
    let sessions: Arc<dyn SessionFactory> = factory.clone();
    let refresher = Arc::new(Refresher::new(config, store, sessions));

    TestRig {
        dir,
        factory,
        refresher,
    }
}
