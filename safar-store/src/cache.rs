use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use safar_core::{CoreError, CoreResult};

/// Read-side cache. Keys follow the query-key scheme in [`keys`]; every
/// mutation handler drops its domain's prefix. Callers treat every method as
/// best-effort and fail open.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CoreResult<()>;
    async fn del(&self, key: &str) -> CoreResult<()>;
    async fn del_prefix(&self, prefix: &str) -> CoreResult<()>;
    /// Fixed-window counter for rate limiting. The window starts when the
    /// first hit creates the key.
    async fn incr_with_ttl(&self, key: &str, window_seconds: i64) -> CoreResult<i64>;
}

/// Cache key builders. One namespace per business domain so that a mutation
/// can invalidate everything the domain ever cached with a single prefix.
pub mod keys {
    pub fn list(domain: &str, page: u32, limit: u32, fingerprint: &str) -> String {
        format!("{}:list:p{}:l{}:{}", domain, page, limit, fingerprint)
    }

    pub fn detail(domain: &str, id: &str) -> String {
        format!("{}:detail:{}", domain, id)
    }

    pub fn domain_prefix(domain: &str) -> String {
        format!("{}:", domain)
    }

    pub fn rate_limit(ip: &str) -> String {
        format!("ratelimit:{}", ip)
    }
}

fn cache_err(err: redis::RedisError) -> CoreError {
    CoreError::Internal(format!("redis: {}", err))
}

pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        conn.get(key).await.map_err(cache_err)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CoreResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(cache_err)
    }

    async fn del(&self, key: &str) -> CoreResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        conn.del::<_, ()>(key).await.map_err(cache_err)
    }

    async fn del_prefix(&self, prefix: &str) -> CoreResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        let pattern = format!("{}*", prefix);
        let keys: Vec<String> = conn.keys(&pattern).await.map_err(cache_err)?;
        if !keys.is_empty() {
            debug!("Invalidating {} cached entries under {}", keys.len(), prefix);
            conn.del::<_, ()>(keys).await.map_err(cache_err)?;
        }
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, window_seconds: i64) -> CoreResult<i64> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        let count: i64 = conn.incr(key, 1).await.map_err(cache_err)?;
        if count == 1 {
            conn.expire::<_, ()>(key, window_seconds)
                .await
                .map_err(cache_err)?;
        }
        Ok(count)
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(deadline) if Instant::now() >= deadline)
    }
}

/// Process-local driver for development and tests; same key scheme,
/// same TTL semantics, no external service.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn del_prefix(&self, prefix: &str) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, window_seconds: i64) -> CoreResult<i64> {
        let mut entries = self.entries.write().await;
        let count = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                entry.value.parse::<i64>().unwrap_or(0) + 1
            }
            _ => 1,
        };
        let expires_at = if count == 1 {
            Some(Instant::now() + Duration::from_secs(window_seconds.max(0) as u64))
        } else {
            entries.get(key).and_then(|e| e.expires_at)
        };
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cache_set_get_del() {
        let cache = MemoryCache::new();
        cache.set_ex("haji:detail:abc", "{\"id\":1}", 60).await.unwrap();
        assert_eq!(
            cache.get("haji:detail:abc").await.unwrap().as_deref(),
            Some("{\"id\":1}")
        );
        cache.del("haji:detail:abc").await.unwrap();
        assert_eq!(cache.get("haji:detail:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_cache_expires_entries() {
        let cache = MemoryCache::new();
        cache.set_ex("k", "v", 0).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn del_prefix_only_touches_the_domain() {
        let cache = MemoryCache::new();
        cache.set_ex("haji:list:p1:l20:-", "a", 60).await.unwrap();
        cache.set_ex("haji:detail:x", "b", 60).await.unwrap();
        cache.set_ex("cattle:detail:y", "c", 60).await.unwrap();

        cache.del_prefix(&keys::domain_prefix("haji")).await.unwrap();

        assert_eq!(cache.get("haji:list:p1:l20:-").await.unwrap(), None);
        assert_eq!(cache.get("haji:detail:x").await.unwrap(), None);
        assert_eq!(cache.get("cattle:detail:y").await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn incr_counts_within_window() {
        let cache = MemoryCache::new();
        assert_eq!(cache.incr_with_ttl("ratelimit:1.2.3.4", 60).await.unwrap(), 1);
        assert_eq!(cache.incr_with_ttl("ratelimit:1.2.3.4", 60).await.unwrap(), 2);
        assert_eq!(cache.incr_with_ttl("ratelimit:5.6.7.8", 60).await.unwrap(), 1);
    }

    #[test]
    fn key_builders() {
        assert_eq!(keys::list("haji", 2, 20, "REGISTERED"), "haji:list:p2:l20:REGISTERED");
        assert_eq!(keys::detail("milk", "abc"), "milk:detail:abc");
        assert_eq!(keys::domain_prefix("feeds"), "feeds:");
        assert_eq!(keys::rate_limit("10.0.0.1"), "ratelimit:10.0.0.1");
    }
}
