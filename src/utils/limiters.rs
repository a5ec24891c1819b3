use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Backpressure for the four concurrency-bound operations: embedding calls,
/// dense search, lexical search, LLM generation (spec §2.4, reference
/// implementation's `utils/limiters.rs`).
#[derive(Clone)]
pub struct Limiters {
    pub embedding: Arc<Semaphore>,
    pub dense_search: Arc<Semaphore>,
    pub lexical_search: Arc<Semaphore>,
    pub llm: Arc<Semaphore>,
    pub acquire_timeout: Duration,
}

impl Limiters {
    pub fn new(cfg: &crate::config::settings::LimitsConfig) -> Self {
        Self {
            embedding: Arc::new(Semaphore::new(cfg.embedding_concurrency.max(1))),
            dense_search: Arc::new(Semaphore::new(cfg.dense_search_concurrency.max(1))),
            lexical_search: Arc::new(Semaphore::new(cfg.lexical_search_concurrency.max(1))),
            llm: Arc::new(Semaphore::new(cfg.llm_concurrency.max(1))),
            acquire_timeout: Duration::from_millis(cfg.acquire_timeout_ms.max(1)),
        }
    }

    pub async fn acquire_timed(
        sem: Arc<Semaphore>,
        acquire_timeout: Duration,
        op: &'static str,
    ) -> Result<(OwnedSemaphorePermit, Duration)> {
        let start = Instant::now();

        let permit = tokio::time::timeout(acquire_timeout, sem.acquire_owned())
            .await
            .map_err(|_| anyhow::anyhow!("limiter acquire timeout for op={op}"))??;

        Ok((permit, start.elapsed()))
    }
}
