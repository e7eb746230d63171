//! In-memory cache implementation - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use techlog_core::ports::{Cache, CacheError};

/// Number of writes between opportunistic purges of expired entries.
const PURGE_EVERY: usize = 64;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory cache using a simple HashMap with async RwLock.
///
/// This is the fallback implementation when Redis is not available.
/// Expired entries are dropped on read and purged in bulk every
/// [`PURGE_EVERY`] writes, so per-filter listing keys cannot pile up
/// without bound. Note: data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    writes: AtomicUsize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Drop every expired entry.
    pub async fn purge_expired(&self) {
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired());
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired() {
            drop(store);
            // Clean up the expired entry with a write lock
            let mut store = self.store.write().await;
            store.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.writes.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            self.purge_expired().await;
        }

        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn overwrites_existing_value() {
        let cache = InMemoryCache::new();
        cache.set("key1", "old", None).await.unwrap();
        cache.set("key1", "new", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
        assert!(!cache.exists("key1").await);
    }

    #[tokio::test]
    async fn ttl_expires_entries() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "lived", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.exists("short").await);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("short").await, None);
    }

    #[tokio::test]
    async fn purge_keeps_live_entries() {
        let cache = InMemoryCache::new();
        cache
            .set("stale", "x", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("fresh", "y", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.purge_expired().await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("fresh").await, Some("y".to_string()));
    }
}
