//! Application state shared across handlers and background jobs.

use std::sync::Arc;
use std::time::Duration;

use techlog_core::ports::{
    AnnouncementRepository, BookmarkRepository, Cache, CompanyRepository, NotificationRepository,
    OAuthClient, PostRepository, RateLimiter, RecentViewRepository, TokenService, UserRepository,
};
use techlog_infra::database::postgres::{
    PostgresAnnouncementRepository, PostgresBookmarkRepository, PostgresCompanyRepository,
    PostgresNotificationRepository, PostgresPostRepository, PostgresRecentViewRepository,
    PostgresUserRepository,
};
use techlog_infra::database::{DbErr, connect};
use techlog_infra::{
    FixedWindowRateLimiter, HttpOAuthClient, InMemoryCache, InMemoryJobQueue, JwtTokenService,
    KeyedGcraRateLimiter, OAuthConfig, RateLimitConfig, RedisCache, RedisConfig,
};

use crate::config::{AppConfig, RateLimitStrategy};

/// Runtime knobs handlers read per request.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub posts_cache_ttl: Duration,
    pub companies_cache_ttl: Duration,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub users: Arc<dyn UserRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub recent_views: Arc<dyn RecentViewRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub cache: Arc<dyn Cache>,
    pub tokens: Arc<dyn TokenService>,
    pub oauth: Arc<dyn OAuthClient>,
    /// Concrete type: starting workers is generic over the handler.
    pub jobs: Arc<InMemoryJobQueue>,
    pub public_limiter: Arc<dyn RateLimiter>,
    pub authed_limiter: Arc<dyn RateLimiter>,
    pub settings: RuntimeSettings,
}

impl AppState {
    /// Connect to the database and assemble every adapter.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DbErr> {
        let db = connect(&config.database).await?;

        let cache = build_cache().await;

        let oauth_config = OAuthConfig::from_env().unwrap_or_else(|| {
            tracing::warn!(
                "OAUTH_TOKEN_URL / OAUTH_USERINFO_URL not set; login stays broken until configured"
            );
            OAuthConfig::default()
        });

        Ok(Self {
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            companies: Arc::new(PostgresCompanyRepository::new(db.clone())),
            announcements: Arc::new(PostgresAnnouncementRepository::new(db.clone())),
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            bookmarks: Arc::new(PostgresBookmarkRepository::new(db.clone())),
            recent_views: Arc::new(PostgresRecentViewRepository::new(db.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(db)),
            cache,
            tokens: Arc::new(JwtTokenService::from_env()),
            oauth: Arc::new(HttpOAuthClient::new(oauth_config)),
            jobs: Arc::new(InMemoryJobQueue::from_env()),
            public_limiter: build_limiter(config.rate_limit_strategy, &config.public_rate_limit),
            authed_limiter: build_limiter(config.rate_limit_strategy, &config.authed_rate_limit),
            settings: RuntimeSettings {
                frontend_url: config.frontend_url.clone(),
                cookie_secure: config.cookie_secure,
                posts_cache_ttl: config.posts_cache_ttl,
                companies_cache_ttl: config.companies_cache_ttl,
            },
        })
    }
}

/// Redis when configured and reachable, in-memory otherwise.
async fn build_cache() -> Arc<dyn Cache> {
    if let Some(config) = RedisConfig::from_env() {
        match RedisCache::connect(config).await {
            Ok(cache) => {
                tracing::info!("Redis cache connected");
                return Arc::new(cache);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
            }
        }
    }

    Arc::new(InMemoryCache::new())
}

fn build_limiter(strategy: RateLimitStrategy, config: &RateLimitConfig) -> Arc<dyn RateLimiter> {
    match strategy {
        RateLimitStrategy::FixedWindow => Arc::new(FixedWindowRateLimiter::new(config.clone())),
        RateLimitStrategy::Gcra => Arc::new(KeyedGcraRateLimiter::new(config.clone())),
    }
}

#[cfg(test)]
impl AppState {
    /// State over a mock database: in-memory cache, default JWT config,
    /// permissive limiters.
    pub fn for_tests(db: techlog_infra::database::DbConn) -> Self {
        use techlog_infra::auth::JwtConfig;
        use techlog_infra::jobs::JobQueueConfig;

        fn permissive() -> Arc<dyn RateLimiter> {
            Arc::new(FixedWindowRateLimiter::new(RateLimitConfig {
                max_requests: 10_000,
                window: Duration::from_secs(60),
            }))
        }

        Self {
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            companies: Arc::new(PostgresCompanyRepository::new(db.clone())),
            announcements: Arc::new(PostgresAnnouncementRepository::new(db.clone())),
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            bookmarks: Arc::new(PostgresBookmarkRepository::new(db.clone())),
            recent_views: Arc::new(PostgresRecentViewRepository::new(db.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(db)),
            cache: Arc::new(InMemoryCache::new()),
            tokens: Arc::new(JwtTokenService::new(JwtConfig::default())),
            oauth: Arc::new(HttpOAuthClient::new(OAuthConfig::default())),
            jobs: Arc::new(InMemoryJobQueue::new(JobQueueConfig {
                max_size: 100,
                workers: 0,
            })),
            public_limiter: permissive(),
            authed_limiter: permissive(),
            settings: RuntimeSettings {
                frontend_url: "http://localhost:3000".to_string(),
                cookie_secure: false,
                posts_cache_ttl: Duration::from_secs(300),
                companies_cache_ttl: Duration::from_secs(600),
            },
        }
    }
}
