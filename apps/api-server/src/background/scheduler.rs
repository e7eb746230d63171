//! Cron scheduling for background maintenance, on tokio-cron-scheduler.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Disabling skips `start`; jobs can still be registered.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

/// Thin wrapper owning the cron runtime and the enabled flag.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Register a recurring job on a six-field cron expression.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add_cron("0 */5 * * * *", move || {
    ///     let notifier = notifier.clone();
    ///     async move { notifier.scan_new_posts().await }
    /// }).await?;
    /// ```
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Registered cron job");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled by config");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Cron scheduler running");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Cron scheduler stopped");
        Ok(())
    }
}
