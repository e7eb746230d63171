//! Rate limiting port.
//!
//! Limits are per client IP with one limiter per endpoint class (public
//! vs authenticated). State is process-local; counters reset on restart.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - abstraction over limiting strategies.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check whether the request identified by `key` is allowed, updating
    /// the counter for that key.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;

    /// Drop state for keys whose window has passed. Called periodically
    /// by the scheduler; implementations may also prune opportunistically.
    async fn sweep(&self);
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
