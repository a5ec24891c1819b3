use crate::errors::ApiError;
use crate::ports::QueryEmbedder;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Wraps a `QueryEmbedder` with an exact-match, in-process cache keyed by
/// query text. Grounded on the reference implementation's `EmbeddingService`
/// cache: repeated identical queries are common, and the query embedding has
/// no other natural per-request cache key (spec §2.2 supplement).
pub struct CachedQueryEmbedder<E: QueryEmbedder> {
    inner: E,
    cache: Arc<RwLock<HashMap<String, Vec<f32>>>>,
}

impl<E: QueryEmbedder> CachedQueryEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, cache: Arc::new(RwLock::new(HashMap::new())) }
    }
}

#[async_trait]
impl<E: QueryEmbedder> QueryEmbedder for CachedQueryEmbedder<E> {
    async fn embed(&self, query: &str) -> Result<Vec<f32>, ApiError> {
        {
            let cache = self.cache.read().await;
            if let Some(vec) = cache.get(query) {
                debug!(op = "embedding", "cache_hit");
                return Ok(vec.clone());
            }
        }

        let embedding = self.inner.embed(query).await?;

        let mut cache = self.cache.write().await;
        cache.insert(query.to_string(), embedding.clone());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder(AtomicUsize);

    #[async_trait]
    impl QueryEmbedder for CountingEmbedder {
        async fn embed(&self, _query: &str) -> Result<Vec<f32>, ApiError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.1, 0.2])
        }
    }

    #[tokio::test]
    async fn repeated_queries_hit_cache() {
        let cached = CachedQueryEmbedder::new(CountingEmbedder(AtomicUsize::new(0)));

        cached.embed("what is rag?").await.unwrap();
        cached.embed("what is rag?").await.unwrap();
        cached.embed("what is rag?").await.unwrap();

        assert_eq!(cached.inner.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_queries_each_call_through() {
        let cached = CachedQueryEmbedder::new(CountingEmbedder(AtomicUsize::new(0)));

        cached.embed("a").await.unwrap();
        cached.embed("b").await.unwrap();

        assert_eq!(cached.inner.0.load(Ordering::SeqCst), 2);
    }
}
