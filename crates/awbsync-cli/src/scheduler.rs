//! Cron-driven reconciliation.
//!
//! One job, one [`Driver`]. The driver sits behind a mutex so a tick that
//! fires while the previous run is still going is skipped instead of
//! overlapping it.

use std::sync::Arc;

use awbsync_reconcile::Driver;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler. The returned handle must be kept alive;
/// dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `cron` does not parse or the scheduler
/// fails to start.
pub async fn build_scheduler(
    driver: Arc<Mutex<Driver>>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_reconcile_job(&scheduler, driver, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_reconcile_job(
    scheduler: &JobScheduler,
    driver: Arc<Mutex<Driver>>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let driver = Arc::clone(&driver);

        Box::pin(async move {
            let Ok(driver) = driver.try_lock() else {
                tracing::warn!("scheduler: previous reconciliation still running; skipping tick");
                return;
            };
            tracing::info!("scheduler: starting reconciliation run");
            match driver.run().await {
                Ok(summary) => tracing::info!(%summary, "scheduler: reconciliation run complete"),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: reconciliation run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
