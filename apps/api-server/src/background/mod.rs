//! Background work: the push-delivery worker and cron schedules.

mod notifier;
mod scheduler;

pub use notifier::{Notifier, NotifierConfig, PushDelivery};
pub use scheduler::{Scheduler, SchedulerConfig};

use techlog_core::ports::{JobQueue, RateLimiter};

use crate::state::AppState;

/// Start the job queue worker and register the cron jobs.
///
/// Returns the running scheduler so `main` can shut it down on exit, or
/// `None` when scheduling is disabled or failed to come up.
pub async fn start_background(state: &AppState) -> Option<Scheduler> {
    let notifier = Notifier::new(state.clone(), NotifierConfig::from_env());
    notifier.init_watermark().await;

    let worker = notifier.clone();
    if let Err(e) = state
        .jobs
        .start_worker(move |job| {
            let worker = worker.clone();
            Box::pin(async move { worker.handle_job(job).await })
        })
        .await
    {
        tracing::error!(error = %e, "Failed to start job queue workers");
    }

    let config = SchedulerConfig::from_env();
    if !config.enabled {
        tracing::info!("Scheduler disabled; new-post notifications are off");
        return None;
    }

    let scheduler = match Scheduler::new(config).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "Scheduler init failed");
            return None;
        }
    };

    let schedule = notifier.schedule().to_owned();
    let scan = notifier.clone();
    if let Err(e) = scheduler
        .add_cron(&schedule, move || {
            let scan = scan.clone();
            async move { scan.scan_new_posts().await }
        })
        .await
    {
        tracing::error!(error = %e, "Failed to register the new-post scan");
    }

    let public = state.public_limiter.clone();
    let authed = state.authed_limiter.clone();
    if let Err(e) = scheduler
        .add_cron("0 * * * * *", move || {
            let public = public.clone();
            let authed = authed.clone();
            async move {
                public.sweep().await;
                authed.sweep().await;
            }
        })
        .await
    {
        tracing::error!(error = %e, "Failed to register the rate-limit sweep");
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!(error = %e, "Scheduler start failed");
        return None;
    }

    Some(scheduler)
}
