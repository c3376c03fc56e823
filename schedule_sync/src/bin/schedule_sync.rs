use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flight_data_ingestor::session::ChromeLauncher;
use schedule_sync::config;
use schedule_sync::refresh::{CycleKind, Refresher};
use schedule_sync::scheduler;
use schedule_sync::service::FlightDataService;
use schedule_sync::store::{CacheFormat, CacheKind, FlightStore};

#[derive(Parser)]
#[command(version, about = "Schedule Sync CLI")]
struct Cli {
    /// Path to the crawler config file (schedule_sync.toml)
    #[arg(short, long)]
    config: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run both refresh schedules until interrupted
    Serve,

    /// Run one cycle immediately and print its report
    Run {
        /// Which cycle to run
        #[arg(long, value_enum, default_value = "daily")]
        kind: CycleKind,
    },

    /// Print a cached latest payload
    Latest {
        /// 3-letter airport code
        #[arg(long)]
        airport: String,

        /// Which artifact family to read
        #[arg(long, value_enum, default_value = "schedule")]
        kind: CacheKind,

        /// Which serialization to read
        #[arg(long, value_enum, default_value = "json")]
        format: CacheFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // 1) Read + normalize TOML, then let the environment override the
    //    deployment-sensitive bits
    let mut cfg = config::load_config_path(&cli.config)?;
    cfg.crawler.apply_env_overrides();

    // 2) Open the cache and wire the real browser behind the refresher
    let store = FlightStore::new(&cfg.crawler.output_dir)?;
    let launcher = ChromeLauncher::new(cfg.crawler.session_options());
    let refresher = Arc::new(Refresher::new(cfg, store, Arc::new(launcher)));

    match cli.cmd {
        Cmd::Serve => {
            let mut sched = scheduler::start(Arc::clone(&refresher)).await?;
            tracing::info!("serving; press ctrl-c to stop");
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for the shutdown signal")?;
            sched
                .shutdown()
                .await
                .map_err(|e| anyhow::anyhow!("scheduler shutdown failed: {e}"))?;
        }
        Cmd::Run { kind } => {
            let report = refresher.run_cycle(kind).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cmd::Latest {
            airport,
            kind,
            format,
        } => {
            let service = FlightDataService::new(Arc::clone(&refresher));
            let payload = match kind {
                CacheKind::Schedule => service.get_latest_schedule(&airport, format),
                CacheKind::LiveStatus => service.get_latest_live_status(&airport, format),
            }?;
            std::io::stdout().write_all(&payload)?;
        }
    }

    Ok(())
}
