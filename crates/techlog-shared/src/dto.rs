//! Data Transfer Objects - request/response types for the API.
//!
//! Requests use single-word query parameters (`page`, `limit`, `q`,
//! `tags`, `companies`) and camelCase JSON bodies; responses are
//! camelCase throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use techlog_core::domain::{
    Announcement, Company, DeviceOs, NotificationPreference, Post, PostFilter, PushSubscription,
    RecentView, User,
};
use techlog_core::pagination::{DEFAULT_PER_PAGE, Page, PageRequest};

/// Rejected query-string input, reported as a 400.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidQuery(pub String);

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Query string for `GET /api/posts`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Free-text search over title and summary.
    pub q: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    /// Comma-separated company UUIDs.
    pub companies: Option<String>,
}

impl PostListQuery {
    /// Split into the normalized domain filter and the page request.
    /// Malformed company ids are rejected rather than silently dropped.
    pub fn into_parts(self) -> Result<(PostFilter, PageRequest), InvalidQuery> {
        let tags = self.tags.as_deref().map(split_csv).unwrap_or_default();

        let mut company_ids = Vec::new();
        for raw in self.companies.as_deref().map(split_csv).unwrap_or_default() {
            let id = Uuid::parse_str(&raw)
                .map_err(|_| InvalidQuery(format!("invalid company id: {raw}")))?;
            company_ids.push(id);
        }

        let filter = PostFilter {
            search: self.q,
            tags,
            company_ids,
        }
        .normalize();

        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PER_PAGE),
        );

        Ok((filter, page))
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Company fields embedded in a post listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            logo_url: company.logo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    /// None only when the company row has vanished underneath the post.
    pub company: Option<CompanySummary>,
}

impl PostResponse {
    pub fn from_post(post: Post, company: Option<&Company>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            url: post.url,
            summary: post.summary,
            author: post.author,
            tags: post.tags,
            published_at: post.published_at,
            company: company.map(CompanySummary::from),
        }
    }
}

/// Body of `GET /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PostListResponse {
    pub fn from_page(page: Page<PostResponse>) -> Self {
        Self {
            posts: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Query string for `GET /api/companies`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompanyListQuery {
    pub featured: Option<bool>,
    pub all: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub name_en: String,
    pub logo_url: Option<String>,
    pub blog_url: String,
    pub rss_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            name_en: company.name_en,
            logo_url: company.logo_url,
            blog_url: company.blog_url,
            rss_url: company.rss_url,
            is_active: company.is_active,
            is_featured: company.is_featured,
        }
    }
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        Self {
            id: announcement.id,
            title: announcement.title,
            content: announcement.content,
            is_pinned: announcement.is_pinned,
            created_at: announcement.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkRequest {
    pub post_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub post: PostResponse,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Recent views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub post_id: Uuid,
}

/// One entry of the client-side `recent-posts` mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentViewEntry {
    pub post_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

impl From<RecentView> for RecentViewEntry {
    fn from(view: RecentView) -> Self {
        Self {
            post_id: view.post_id,
            viewed_at: view.viewed_at,
        }
    }
}

impl From<RecentViewEntry> for RecentView {
    fn from(entry: RecentViewEntry) -> Self {
        Self {
            post_id: entry.post_id,
            viewed_at: entry.viewed_at,
        }
    }
}

/// Body of `POST /api/recent-views/sync`.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRecentViewsRequest {
    pub entries: Vec<RecentViewEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecentViewsResponse {
    pub entries: Vec<RecentViewEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentViewResponse {
    pub post: PostResponse,
    pub viewed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub new_posts: bool,
    pub announcements: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub new_posts: bool,
    pub announcements: bool,
}

impl From<NotificationPreference> for PreferencesResponse {
    fn from(preference: NotificationPreference) -> Self {
        Self {
            new_posts: preference.new_posts,
            announcements: preference.announcements,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSubscriptionRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub device_os: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub endpoint: String,
    pub device_os: DeviceOs,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PushSubscription> for SubscriptionResponse {
    fn from(subscription: PushSubscription) -> Self {
        Self {
            id: subscription.id,
            endpoint: subscription.endpoint,
            device_os: subscription.device_os,
            enabled: subscription.enabled,
            created_at: subscription.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Query string of the OAuth redirect: `GET /auth/callback?code=...`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub provider: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            provider: user.provider,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_query_parses_csv_params() {
        let query = PostListQuery {
            page: Some(2),
            limit: Some(10),
            q: Some("kafka".into()),
            tags: Some("Rust, backend,,rust".into()),
            companies: None,
        };
        let (filter, page) = query.into_parts().unwrap();
        assert_eq!(filter.search.as_deref(), Some("kafka"));
        assert_eq!(filter.tags, vec!["backend", "rust"]);
        assert_eq!(page.page(), 2);
        assert_eq!(page.per_page(), 10);
    }

    #[test]
    fn post_query_rejects_malformed_company_id() {
        let query = PostListQuery {
            companies: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(query.into_parts().is_err());
    }

    #[test]
    fn post_query_defaults_pagination() {
        let (filter, page) = PostListQuery::default().into_parts().unwrap();
        assert!(filter.is_empty());
        assert_eq!(page.page(), 1);
        assert_eq!(page.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn list_response_uses_camel_case() {
        let page = Page::new(Vec::<PostResponse>::new(), 0, PageRequest::default());
        let json = serde_json::to_value(PostListResponse::from_page(page)).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("perPage").is_some());
        assert!(json.get("total_pages").is_none());
    }
}
