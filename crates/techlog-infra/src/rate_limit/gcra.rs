//! Keyed rate limiter using the governor crate's GCRA algorithm.
//!
//! Smoother than the fixed window: requests earn back capacity
//! continuously instead of all at once at the window edge.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use techlog_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use super::RateLimitConfig;

type KeyedLimiter = GovernorRateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// Per-key GCRA limiter. Like the fixed window variant, state is
/// per-process; `sweep` delegates to governor's `retain_recent`.
pub struct KeyedGcraRateLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    config: RateLimitConfig,
}

impl KeyedGcraRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = Quota::with_period(config.window / config.max_requests.max(1))
            .expect("Valid quota")
            .allow_burst(NonZeroU32::new(config.max_requests.max(1)).expect("Non-zero"));

        Self {
            limiter: GovernorRateLimiter::keyed(quota)
                .with_middleware::<StateInformationMiddleware>(),
            clock: DefaultClock::default(),
            config,
        }
    }
}

#[async_trait]
impl RateLimiter for KeyedGcraRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => Ok(RateLimitResult {
                allowed: true,
                remaining: snapshot.remaining_burst_capacity(),
                reset_after: self.config.window,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }

    async fn sweep(&self) {
        self.limiter.retain_recent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max_requests: u32) -> KeyedGcraRateLimiter {
        KeyedGcraRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn burst_up_to_the_limit_then_rejects() {
        let limiter = limiter(3);

        for _ in 0..3 {
            assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        }

        let result = limiter.check("1.2.3.4").await.unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn keys_do_not_share_capacity() {
        let limiter = limiter(1);

        assert!(limiter.check("authed:1.1.1.1").await.unwrap().allowed);
        assert!(limiter.check("authed:2.2.2.2").await.unwrap().allowed);
        assert!(!limiter.check("authed:1.1.1.1").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn sweep_retains_recent_keys() {
        let limiter = limiter(10);
        limiter.check("fresh").await.unwrap();

        limiter.sweep().await;
        assert_eq!(limiter.limiter.len(), 1);
    }
}
