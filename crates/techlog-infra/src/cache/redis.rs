//! Redis cache implementation for multi-instance deployments.
//!
//! Reads degrade to a miss on backend errors; the listing endpoints
//! treat the cache as best-effort either way.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use techlog_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl RedisConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `REDIS_URL` is unset, in which case the server
    /// runs on the in-memory cache.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;

        Some(Self {
            url,
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        })
    }
}

/// Redis-backed cache implementation.
///
/// Uses connection manager for automatic reconnection and pooling.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        // Bound the handshake so an unreachable Redis cannot stall startup
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis cache");

        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                conn.set_ex::<_, _, ()>(key, value, duration.as_secs())
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(key).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_cache() -> Option<RedisCache> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
        };

        RedisCache::connect(config).await.ok()
    }

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let cache = match test_cache().await {
            Some(c) => c,
            None => return, // Redis not available
        };

        cache.set("techlog_test_key", "value", None).await.unwrap();
        assert_eq!(
            cache.get("techlog_test_key").await,
            Some("value".to_string())
        );

        cache.delete("techlog_test_key").await.unwrap();
        assert_eq!(cache.get("techlog_test_key").await, None);
    }
}
