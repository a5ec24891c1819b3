use crate::models::{CacheEntry, InsightBundle};
use crate::ports::InsightCacheStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Concrete C12 (spec §4.12): thread-safe in-memory insight cache. Lock-free
/// reads/writes via `DashMap`; expired entries are removed lazily on lookup.
#[derive(Clone)]
pub struct DashMapInsightCache {
    storage: Arc<DashMap<String, CacheEntry>>,
}

impl DashMapInsightCache {
    pub fn new() -> Self {
        Self { storage: Arc::new(DashMap::new()) }
    }
}

impl Default for DashMapInsightCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InsightCacheStore for DashMapInsightCache {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<InsightBundle>> {
        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if !entry.is_live(now) {
            drop(entry);
            self.storage.remove(key);
            debug!(cache_key = key, "insight cache entry expired, evicted");
            return Ok(None);
        }

        Ok(Some(entry.bundle.clone()))
    }

    async fn put(&self, key: &str, bundle: InsightBundle, ttl_seconds: i64) -> Result<()> {
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl_seconds);
        self.storage.insert(
            key.to_string(),
            CacheEntry { cache_key: key.to_string(), bundle, expires_at },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsightBundle;

    fn bundle(key: &str) -> InsightBundle {
        InsightBundle { cache_key: key.to_string(), generated_at: Utc::now(), ..Default::default() }
    }

    #[tokio::test]
    async fn returns_live_entry() {
        let cache = DashMapInsightCache::new();
        cache.put("k1", bundle("k1"), 3600).await.unwrap();

        let found = cache.get("k1", Utc::now()).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn evicts_expired_entry() {
        let cache = DashMapInsightCache::new();
        cache.put("k1", bundle("k1"), 1).await.unwrap();

        let later = Utc::now() + chrono::Duration::seconds(10);
        let found = cache.get("k1", later).await.unwrap();
        assert!(found.is_none());
    }
}
