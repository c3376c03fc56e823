//! Timer wiring for the two refresh schedules.
//!
//! One cron job drives the daily schedule cycle and one repeated-interval
//! job drives the periodic live cycle. Both go through
//! [`Refresher::run_cycle`], so a firing that lands while the other cycle
//! holds the browser simply waits its turn at the gate.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::refresh::{CycleKind, Refresher};

/// Registers both refresh jobs and starts the scheduler. The returned
/// handle must stay alive for jobs to keep firing; shut it down on exit.
pub async fn start(refresher: Arc<Refresher>) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("failed to create job scheduler: {e}"))?;

    let cron = refresher.config().crawler.daily_cron.clone();
    let daily = Arc::clone(&refresher);
    let daily_job = Job::new_async(cron.as_str(), move |_id, _scheduler| {
        let refresher = Arc::clone(&daily);
        Box::pin(async move {
            refresher.run_cycle(CycleKind::Daily).await;
        })
    })
    .map_err(|e| anyhow::anyhow!("invalid daily cron expression {cron:?}: {e}"))?;
    scheduler
        .add(daily_job)
        .await
        .map_err(|e| anyhow::anyhow!("failed to register the daily job: {e}"))?;

    let every = Duration::from_secs(refresher.config().crawler.live_interval_minutes * 60);
    let live = Arc::clone(&refresher);
    let live_job = Job::new_repeated_async(every, move |_id, _scheduler| {
        let refresher = Arc::clone(&live);
        Box::pin(async move {
            refresher.run_cycle(CycleKind::Periodic).await;
        })
    })
    .map_err(|e| anyhow::anyhow!("failed to create the live-status job: {e}"))?;
    scheduler
        .add(live_job)
        .await
        .map_err(|e| anyhow::anyhow!("failed to register the live-status job: {e}"))?;

    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start the scheduler: {e}"))?;
    info!(daily_cron = %refresher.config().crawler.daily_cron,
          live_interval_minutes = refresher.config().crawler.live_interval_minutes,
          "scheduler started");
    Ok(scheduler)
}
