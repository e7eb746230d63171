//! Fixed-window rate limiter.
//!
//! One counter per key; the counter resets when its window elapses. The
//! first request over the limit is rejected until the window turns over.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use techlog_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use super::RateLimitConfig;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Counter-based limiter. Limits are per-process, not distributed
/// across instances; stale windows are dropped by the periodic sweep.
pub struct FixedWindowRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.config.window {
            window.started_at = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);

        Ok(RateLimitResult {
            allowed: window.count <= self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(window.count),
            reset_after: self
                .config
                .window
                .saturating_sub(now.duration_since(window.started_at)),
        })
    }

    async fn sweep(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, window| now.duration_since(window.started_at) < self.config.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window: Duration) -> FixedWindowRateLimiter {
        FixedWindowRateLimiter::new(RateLimitConfig {
            max_requests,
            window,
        })
    }

    #[tokio::test]
    async fn allows_up_to_the_limit_then_rejects() {
        let limiter = limiter(3, Duration::from_secs(60));

        for expected_remaining in [2, 1, 0] {
            let result = limiter.check("1.2.3.4").await.unwrap();
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let result = limiter.check("1.2.3.4").await.unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.reset_after <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn counter_resets_after_the_window() {
        let limiter = limiter(1, Duration::from_millis(40));

        assert!(limiter.check("ip").await.unwrap().allowed);
        assert!(!limiter.check("ip").await.unwrap().allowed);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("ip").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn keys_are_counted_independently() {
        let limiter = limiter(1, Duration::from_secs(60));

        assert!(limiter.check("public:1.1.1.1").await.unwrap().allowed);
        assert!(limiter.check("public:2.2.2.2").await.unwrap().allowed);
        assert!(!limiter.check("public:1.1.1.1").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn sweep_drops_expired_windows() {
        let limiter = limiter(5, Duration::from_millis(20));

        limiter.check("a").await.unwrap();
        limiter.check("b").await.unwrap();
        assert_eq!(limiter.windows.lock().await.len(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        limiter.sweep().await;
        assert_eq!(limiter.windows.lock().await.len(), 0);
    }
}
