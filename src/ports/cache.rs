use crate::models::InsightBundle;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage primitive C12 (spec §4.12, §6): content-addressed lookup/store of
/// prior insight results with TTL. Assumed safe for concurrent callers
/// (spec §5) — implementations provide their own interior synchronization.
#[async_trait]
pub trait InsightCacheStore: Send + Sync {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<InsightBundle>>;
    async fn put(&self, key: &str, bundle: InsightBundle, ttl_seconds: i64) -> Result<()>;
}
