//! In-memory job queue.
//!
//! Carries the push-delivery jobs produced by the new-post scan. Jobs
//! live in a bounded channel and are processed by local worker tasks;
//! anything still queued is lost on restart, which is acceptable for
//! notifications.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use techlog_core::ports::{Job, JobQueue, JobQueueError, JobResult, QueueStats};

/// In-memory job queue configuration.
#[derive(Debug, Clone)]
pub struct JobQueueConfig {
    /// Maximum queue size (0 = unlimited).
    pub max_size: usize,
    /// Number of worker tasks.
    pub workers: usize,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self {
            max_size: 10000,
            workers: 4,
        }
    }
}

impl JobQueueConfig {
    pub fn from_env() -> Self {
        Self {
            max_size: std::env::var("JOB_QUEUE_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10000),
            workers: std::env::var("JOB_QUEUE_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
        }
    }
}

struct Counters {
    pending: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

/// In-memory job queue backed by a bounded mpsc channel.
pub struct InMemoryJobQueue {
    counters: Arc<Counters>,
    config: JobQueueConfig,
    sender: mpsc::Sender<Job>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl InMemoryJobQueue {
    pub fn new(config: JobQueueConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.max_size.max(100));

        Self {
            counters: Arc::new(Counters {
                pending: AtomicUsize::new(0),
                processing: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
            }),
            config,
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    pub fn from_env() -> Self {
        Self::new(JobQueueConfig::from_env())
    }
}

fn retry_delay(attempts: u32) -> Duration {
    Duration::from_millis(100 * attempts as u64)
}

/// Hand a retryable job back to the queue after a short delay so a
/// flapping relay does not produce a tight loop.
fn schedule_retry(sender: mpsc::Sender<Job>, job: Job) {
    tokio::spawn(async move {
        tokio::time::sleep(retry_delay(job.attempts)).await;
        if let Err(e) = sender.send(job).await {
            tracing::error!(error = %e, "Failed to re-enqueue job for retry");
        }
    });
}

async fn run_worker<F>(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    sender: mpsc::Sender<Job>,
    counters: Arc<Counters>,
    handler: Arc<F>,
) where
    F: Fn(Job) -> Pin<Box<dyn Future<Output = JobResult> + Send>> + Send + Sync + 'static,
{
    tracing::info!(worker = worker_id, "Job worker started");

    loop {
        let job = {
            let mut rx = receiver.lock().await;
            rx.recv().await
        };

        let Some(mut job) = job else {
            tracing::info!(worker = worker_id, "Job worker shutting down");
            break;
        };

        counters.pending.fetch_sub(1, Ordering::Relaxed);
        counters.processing.fetch_add(1, Ordering::Relaxed);
        job.attempts += 1;

        tracing::debug!(
            worker = worker_id,
            job_id = %job.id,
            job_type = %job.job_type,
            attempt = job.attempts,
            "Processing job"
        );

        let result = handler(job.clone()).await;
        counters.processing.fetch_sub(1, Ordering::Relaxed);

        match result {
            JobResult::Success => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            }
            JobResult::Retry(reason) if job.attempts < job.max_attempts => {
                tracing::warn!(
                    job_id = %job.id,
                    attempt = job.attempts,
                    max_attempts = job.max_attempts,
                    reason = %reason,
                    "Job failed, will retry"
                );
                counters.pending.fetch_add(1, Ordering::Relaxed);
                schedule_retry(sender.clone(), job);
            }
            JobResult::Retry(reason) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(job_id = %job.id, reason = %reason, "Job failed after max retries");
            }
            JobResult::Failed(reason) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(job_id = %job.id, reason = %reason, "Job failed permanently");
            }
        }
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError> {
        if self.config.max_size > 0
            && self.counters.pending.load(Ordering::Relaxed) >= self.config.max_size
        {
            return Err(JobQueueError::QueueFull);
        }

        self.counters.pending.fetch_add(1, Ordering::Relaxed);

        self.sender
            .send(job)
            .await
            .map_err(|e| JobQueueError::EnqueueError(e.to_string()))?;

        Ok(())
    }

    async fn start_worker<F>(&self, handler: F) -> Result<(), JobQueueError>
    where
        F: Fn(Job) -> Pin<Box<dyn Future<Output = JobResult> + Send>> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);

        for worker_id in 0..self.config.workers {
            tokio::spawn(run_worker(
                worker_id,
                self.receiver.clone(),
                self.sender.clone(),
                self.counters.clone(),
                handler.clone(),
            ));
        }

        Ok(())
    }

    async fn stats(&self) -> Result<QueueStats, JobQueueError> {
        Ok(QueueStats {
            pending: self.counters.pending.load(Ordering::Relaxed),
            processing: self.counters.processing.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicU32;

    fn queue(workers: usize) -> InMemoryJobQueue {
        InMemoryJobQueue::new(JobQueueConfig {
            max_size: 100,
            workers,
        })
    }

    /// Poll the queue stats until `pred` holds or two seconds pass.
    async fn wait_until(
        queue: &InMemoryJobQueue,
        pred: impl Fn(&QueueStats) -> bool,
    ) -> QueueStats {
        for _ in 0..100 {
            let stats = queue.stats().await.unwrap();
            if pred(&stats) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        queue.stats().await.unwrap()
    }

    #[tokio::test]
    async fn processes_jobs_and_counts_completions() {
        let queue = queue(2);
        queue
            .start_worker(|_job| Box::pin(async { JobResult::Success }))
            .await
            .unwrap();

        for _ in 0..3 {
            queue
                .enqueue(Job::new("push.deliver", json!({"n": 1})))
                .await
                .unwrap();
        }

        let stats = wait_until(&queue, |s| s.completed == 3).await;
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let queue = queue(1);
        let calls = Arc::new(AtomicU32::new(0));
        let handler_calls = calls.clone();

        queue
            .start_worker(move |_job| {
                let calls = handler_calls.clone();
                Box::pin(async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        JobResult::Retry("relay timed out".to_string())
                    } else {
                        JobResult::Success
                    }
                })
            })
            .await
            .unwrap();

        queue
            .enqueue(Job::new("push.deliver", json!({})).with_max_attempts(3))
            .await
            .unwrap();

        let stats = wait_until(&queue, |s| s.completed == 1).await;
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let queue = queue(1);
        queue
            .start_worker(|_job| {
                Box::pin(async { JobResult::Retry("endpoint unreachable".to_string()) })
            })
            .await
            .unwrap();

        queue
            .enqueue(Job::new("push.deliver", json!({})).with_max_attempts(2))
            .await
            .unwrap();

        let stats = wait_until(&queue, |s| s.failed == 1).await;
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 0);
    }

    #[tokio::test]
    async fn rejects_when_full() {
        let queue = InMemoryJobQueue::new(JobQueueConfig {
            max_size: 1,
            workers: 0,
        });

        queue.enqueue(Job::new("push.deliver", json!({}))).await.unwrap();
        let result = queue.enqueue(Job::new("push.deliver", json!({}))).await;
        assert!(matches!(result, Err(JobQueueError::QueueFull)));
    }
}
