//! Rate limiting implementations.
//!
//! Both limiters are keyed by the caller-supplied string (the middleware
//! uses `class:ip`) and keep their state in process memory. The fixed
//! window counter is the default; the GCRA variant is selected with
//! `RATE_LIMIT_STRATEGY=gcra`.

use std::time::Duration;

mod fixed_window;
mod gcra;

pub use fixed_window::FixedWindowRateLimiter;
pub use gcra::KeyedGcraRateLimiter;

/// Limits for one endpoint class.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Load `<prefix>_MAX_REQUESTS` and `<prefix>_WINDOW_SECS`.
    pub fn from_env(prefix: &str, default_max: u32, default_window_secs: u64) -> Self {
        Self {
            max_requests: std::env::var(format!("{prefix}_MAX_REQUESTS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default_max),
            window: Duration::from_secs(
                std::env::var(format!("{prefix}_WINDOW_SECS"))
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default_window_secs),
            ),
        }
    }
}
