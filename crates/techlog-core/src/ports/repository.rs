//! Repository ports. One trait per aggregate; infrastructure implements
//! them against PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Announcement, Bookmark, Company, CompanyScope, NotificationPreference, Post, PostFilter,
    PushSubscription, RecentView, User,
};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Read access to aggregated posts. Writes belong to the scraper.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Posts matching `filter`, newest `published_at` first.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// Posts whose ids are in `ids`, in unspecified order. Used to expand
    /// bookmark and recent-view listings.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError>;

    /// Posts scraped strictly after `since`, oldest first. Drives the
    /// push-notification fan-out.
    async fn find_scraped_after(&self, since: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Companies in the given scope, ordered by English name.
    async fn list(&self, scope: CompanyScope) -> Result<Vec<Company>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Company>, RepoError>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// All announcements in display order: pinned first, then newest.
    async fn list(&self) -> Result<Vec<Announcement>, RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Insert the user, or refresh profile fields when
    /// `(provider, provider_subject)` already exists. Returns the stored
    /// row either way.
    async fn upsert_by_provider(&self, user: User) -> Result<User, RepoError>;
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// The user's bookmarks, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Bookmark>, RepoError>;

    /// Idempotent: returns `false` when the pair already existed.
    async fn add(&self, bookmark: Bookmark) -> Result<bool, RepoError>;

    /// `RepoError::NotFound` when the pair does not exist.
    async fn remove(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait RecentViewRepository: Send + Sync {
    /// The user's recent views, most recent first, capped at
    /// [`crate::domain::RECENT_VIEW_CAP`].
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RecentView>, RepoError>;

    /// Upsert a view (refreshing `viewed_at` for a repeat view) and evict
    /// rows beyond the cap.
    async fn record(&self, user_id: Uuid, view: RecentView) -> Result<(), RepoError>;

    /// Atomically replace the user's rows with `views` (already merged,
    /// deduped and capped by the caller).
    async fn replace_all(&self, user_id: Uuid, views: &[RecentView]) -> Result<(), RepoError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_preference(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NotificationPreference>, RepoError>;

    async fn upsert_preference(
        &self,
        preference: NotificationPreference,
    ) -> Result<NotificationPreference, RepoError>;

    /// Upsert keyed on the unique endpoint: re-registering refreshes
    /// keys, owner and OS, and re-enables the subscription.
    async fn upsert_subscription(
        &self,
        subscription: PushSubscription,
    ) -> Result<PushSubscription, RepoError>;

    async fn set_subscription_enabled(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        enabled: bool,
    ) -> Result<(), RepoError>;

    async fn delete_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<(), RepoError>;

    /// Enabled subscriptions whose owners have `new_posts` on (or no
    /// stored preference, since the default is on). Fan-out targets.
    async fn find_new_post_targets(&self) -> Result<Vec<PushSubscription>, RepoError>;

    /// Disable a subscription whose push endpoint reported itself gone.
    async fn disable_by_endpoint(&self, endpoint: &str) -> Result<(), RepoError>;
}
