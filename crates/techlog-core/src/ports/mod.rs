//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod job_queue;
mod rate_limit;
mod repository;

pub use auth::{AuthError, OAuthClient, OAuthProfile, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use job_queue::{Job, JobQueue, JobQueueError, JobResult, QueueStats};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    AnnouncementRepository, BookmarkRepository, CompanyRepository, NotificationRepository,
    PostRepository, RecentViewRepository, UserRepository,
};
