//! New-post notification fan-out.
//!
//! A cron tick scans for posts scraped since the last watermark and
//! enqueues one delivery job per (post, subscription) pair. The queue
//! worker posts each job to the Web Push relay; permanent endpoint
//! failures disable the subscription so it is not targeted again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use techlog_core::domain::{Post, PushSubscription};
use techlog_core::ports::{Cache, Job, JobQueue, JobResult, NotificationRepository, PostRepository};

use crate::state::AppState;

/// Cache key holding the `scraped_at` high-water mark.
const WATERMARK_KEY: &str = "notifier:last_scraped_at";
/// Job type for a single push delivery.
pub const PUSH_DELIVERY_JOB: &str = "push.deliver";
const DELIVERY_MAX_ATTEMPTS: u32 = 3;

/// Notifier configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Cron schedule for the new-post scan.
    pub schedule: String,
    /// Web Push relay endpoint. Deliveries are dropped when unset.
    pub relay_url: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            schedule: "0 */5 * * * *".to_string(),
            relay_url: None,
        }
    }
}

impl NotifierConfig {
    pub fn from_env() -> Self {
        Self {
            schedule: std::env::var("NOTIFIER_SCHEDULE")
                .unwrap_or_else(|_| "0 */5 * * * *".to_string()),
            relay_url: std::env::var("PUSH_RELAY_URL").ok(),
        }
    }
}

/// Payload handed to the push relay, one per (post, subscription) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushDelivery {
    pub subscription: SubscriptionInfo,
    pub notification: NotificationInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInfo {
    pub title: String,
    pub body: String,
    pub url: String,
    pub post_id: Uuid,
}

impl PushDelivery {
    pub fn for_post(post: &Post, subscription: &PushSubscription) -> Self {
        Self {
            subscription: SubscriptionInfo {
                endpoint: subscription.endpoint.clone(),
                keys: SubscriptionKeys {
                    p256dh: subscription.p256dh.clone(),
                    auth: subscription.auth.clone(),
                },
            },
            notification: NotificationInfo {
                title: "새로운 기술 블로그 글이 올라왔어요".to_string(),
                body: post.title.clone(),
                url: post.url.clone(),
                post_id: post.id,
            },
        }
    }
}

/// Scans for new posts and delivers push notifications through the queue.
#[derive(Clone)]
pub struct Notifier {
    state: AppState,
    config: NotifierConfig,
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(state: AppState, config: NotifierConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            state,
            config,
            http,
        }
    }

    pub fn schedule(&self) -> &str {
        &self.config.schedule
    }

    /// Seed the watermark on first startup so the initial scan does not
    /// fan out the entire backlog.
    pub async fn init_watermark(&self) {
        if self.state.cache.get(WATERMARK_KEY).await.is_none() {
            self.store_watermark(Utc::now()).await;
        }
    }

    async fn store_watermark(&self, at: DateTime<Utc>) {
        if let Err(e) = self
            .state
            .cache
            .set(WATERMARK_KEY, &at.to_rfc3339(), None)
            .await
        {
            tracing::warn!(error = %e, "Failed to store notifier watermark");
        }
    }

    /// One cron tick: enqueue a delivery job per (new post, target) pair.
    pub async fn scan_new_posts(&self) {
        let watermark = match self.state.cache.get(WATERMARK_KEY).await {
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(at) => at.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt notifier watermark; resetting");
                    self.store_watermark(Utc::now()).await;
                    return;
                }
            },
            None => {
                tracing::warn!("Notifier watermark missing; resetting");
                self.store_watermark(Utc::now()).await;
                return;
            }
        };

        let posts = match self.state.posts.find_scraped_after(watermark).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!(error = %e, "New-post scan failed");
                return;
            }
        };
        if posts.is_empty() {
            return;
        }

        let targets = match self.state.notifications.find_new_post_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(error = %e, "Loading push targets failed");
                return;
            }
        };

        let mut newest = watermark;
        let mut jobs = 0usize;

        for post in &posts {
            if post.scraped_at > newest {
                newest = post.scraped_at;
            }

            for target in &targets {
                let payload = match serde_json::to_value(PushDelivery::for_post(post, target)) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(error = %e, "Unserializable push payload");
                        continue;
                    }
                };

                let job = Job::new(PUSH_DELIVERY_JOB, payload)
                    .with_max_attempts(DELIVERY_MAX_ATTEMPTS);
                match self.state.jobs.enqueue(job).await {
                    Ok(()) => jobs += 1,
                    Err(e) => tracing::warn!(error = %e, "Failed to enqueue push delivery"),
                }
            }
        }

        self.store_watermark(newest).await;
        tracing::info!(
            posts = posts.len(),
            targets = targets.len(),
            jobs,
            "New-post notifications enqueued"
        );
    }

    /// Queue worker entry point.
    pub async fn handle_job(&self, job: Job) -> JobResult {
        if job.job_type != PUSH_DELIVERY_JOB {
            return JobResult::Failed(format!("unknown job type: {}", job.job_type));
        }

        let delivery: PushDelivery = match serde_json::from_value(job.payload) {
            Ok(delivery) => delivery,
            Err(e) => return JobResult::Failed(format!("bad payload: {e}")),
        };

        self.deliver(delivery).await
    }

    async fn deliver(&self, delivery: PushDelivery) -> JobResult {
        let Some(relay_url) = &self.config.relay_url else {
            tracing::debug!("Push relay not configured; dropping delivery");
            return JobResult::Success;
        };

        let response = match self.http.post(relay_url).json(&delivery).send().await {
            Ok(response) => response,
            Err(e) => return JobResult::Retry(format!("relay unreachable: {e}")),
        };

        let status = response.status();
        if status.is_success() {
            return JobResult::Success;
        }

        // 404/410 mean the browser revoked the endpoint.
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            if let Err(e) = self
                .state
                .notifications
                .disable_by_endpoint(&delivery.subscription.endpoint)
                .await
            {
                tracing::warn!(error = %e, "Failed to disable dead subscription");
            }
            return JobResult::Failed("push endpoint gone".to_string());
        }

        JobResult::Retry(format!("relay returned {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techlog_core::domain::DeviceOs;

    fn sample_post() -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "Rust로 결제 시스템 다시 쓰기".to_string(),
            url: "https://blog.example.com/rust-payments".to_string(),
            summary: None,
            author: None,
            tags: vec!["rust".to_string()],
            published_at: now,
            scraped_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn delivery_payload_uses_camel_case_keys() {
        let post = sample_post();
        let subscription = PushSubscription::new(
            Uuid::new_v4(),
            "https://push.example.com/endpoint".to_string(),
            "p256dh-key".to_string(),
            "auth-key".to_string(),
            DeviceOs::Macos,
        );

        let payload = serde_json::to_value(PushDelivery::for_post(&post, &subscription)).unwrap();

        assert_eq!(payload["notification"]["body"], post.title);
        assert_eq!(payload["notification"]["postId"], post.id.to_string());
        assert_eq!(
            payload["subscription"]["endpoint"],
            "https://push.example.com/endpoint"
        );
    }

    #[test]
    fn default_schedule_runs_every_five_minutes() {
        assert_eq!(NotifierConfig::default().schedule, "0 */5 * * * *");
    }
}
