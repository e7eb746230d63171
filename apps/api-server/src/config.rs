//! Server configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use techlog_infra::{DatabaseConfig, RateLimitConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Which limiter implementation serves the two endpoint classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitStrategy {
    #[default]
    FixedWindow,
    Gcra,
}

impl RateLimitStrategy {
    fn from_env() -> Self {
        match env::var("RATE_LIMIT_STRATEGY")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Ok("gcra") => Self::Gcra,
            _ => Self::FixedWindow,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL the OAuth callback redirects back to.
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub database: DatabaseConfig,
    pub rate_limit_strategy: RateLimitStrategy,
    pub public_rate_limit: RateLimitConfig,
    pub authed_rate_limit: RateLimitConfig,
    pub posts_cache_ttl: Duration,
    pub companies_cache_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables. Only DATABASE_URL
    /// is required; everything else has a development-friendly default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_env().ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            database,
            rate_limit_strategy: RateLimitStrategy::from_env(),
            public_rate_limit: RateLimitConfig::from_env("RATE_LIMIT_PUBLIC", 60, 60),
            authed_rate_limit: RateLimitConfig::from_env("RATE_LIMIT_AUTHED", 120, 60),
            posts_cache_ttl: ttl_from_env("CACHE_POSTS_TTL_SECS", 300),
            companies_cache_ttl: ttl_from_env("CACHE_COMPANIES_TTL_SECS", 600),
        })
    }
}

fn ttl_from_env(var: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        env::var(var)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_secs),
    )
}
