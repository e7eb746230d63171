//! # Techlog Infrastructure
//!
//! Concrete implementations of the ports defined in `techlog-core`:
//! PostgreSQL repositories (SeaORM), session JWTs and the OAuth client,
//! response caching, per-IP rate limiting, and the background job queue.
//!
//! ## Feature Flags
//!
//! - `redis` (default) - Redis-backed cache; without it the in-memory
//!   cache is the only backend.

pub mod auth;
pub mod cache;
pub mod database;
pub mod jobs;
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, connect};
pub use jobs::InMemoryJobQueue;

pub use auth::{HttpOAuthClient, JwtTokenService, OAuthConfig};
pub use rate_limit::{FixedWindowRateLimiter, KeyedGcraRateLimiter, RateLimitConfig};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
