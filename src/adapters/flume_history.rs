use crate::adapters::pool::DbPool;
use crate::ports::HistorySink;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flume::{bounded, Receiver, Sender};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

struct HistoryRecord {
    caller_id: Option<String>,
    query: String,
    summary: String,
    created_at: DateTime<Utc>,
}

/// Concrete `history_append` (spec §6): queued, batched, best-effort writes.
/// Mirrors the reference activity logger's queue-and-batch-worker shape; a
/// full queue drops the newest record with a warning rather than blocking the
/// caller, since history is explicitly non-fatal (spec §7).
#[derive(Clone)]
pub struct FlumeHistorySink {
    sender: Sender<HistoryRecord>,
}

pub struct HistorySinkConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub batch_timeout_ms: u64,
    pub worker_count: usize,
}

impl Default for HistorySinkConfig {
    fn default() -> Self {
        Self { queue_capacity: 10_000, batch_size: 100, batch_timeout_ms: 1_000, worker_count: 2 }
    }
}

impl FlumeHistorySink {
    pub fn new(pool: DbPool, config: HistorySinkConfig) -> Self {
        let (sender, receiver) = bounded(config.queue_capacity);

        info!(
            queue_capacity = config.queue_capacity,
            batch_size = config.batch_size,
            workers = config.worker_count,
            "initializing history sink"
        );

        for worker_id in 0..config.worker_count {
            let pool = pool.clone();
            let receiver = receiver.clone();
            let batch_size = config.batch_size;
            let batch_timeout = Duration::from_millis(config.batch_timeout_ms);

            tokio::spawn(async move {
                Self::worker_loop(worker_id, pool, receiver, batch_size, batch_timeout).await;
            });
        }

        Self { sender }
    }

    async fn worker_loop(
        worker_id: usize,
        pool: DbPool,
        receiver: Receiver<HistoryRecord>,
        batch_size: usize,
        batch_timeout: Duration,
    ) {
        let mut batch: Vec<HistoryRecord> = Vec::with_capacity(batch_size);

        loop {
            let deadline = tokio::time::Instant::now() + batch_timeout;

            while batch.len() < batch_size {
                match tokio::time::timeout_at(deadline, receiver.recv_async()).await {
                    Ok(Ok(record)) => batch.push(record),
                    Ok(Err(_)) => {
                        if !batch.is_empty() {
                            Self::flush_batch(&pool, &batch, worker_id).await;
                        }
                        info!(worker_id, "history worker shutting down");
                        return;
                    }
                    Err(_) => break,
                }
            }

            if !batch.is_empty() {
                Self::flush_batch(&pool, &batch, worker_id).await;
                batch.clear();
            } else {
                sleep(Duration::from_millis(100)).await;
            }
        }
    }

    async fn flush_batch(pool: &DbPool, batch: &[HistoryRecord], worker_id: usize) {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO history_entries (caller_id, user_query, response_summary, created_at) ",
        );

        query_builder.push_values(batch, |mut b, record| {
            b.push_bind(record.caller_id.clone())
                .push_bind(&record.query)
                .push_bind(&record.summary)
                .push_bind(record.created_at);
        });

        match query_builder.build().execute(pool.get_pool()).await {
            Ok(result) => debug!(worker_id, inserted = result.rows_affected(), "history batch flushed"),
            Err(e) => error!(worker_id, error = %e, "failed to flush history batch"),
        }
    }
}

#[async_trait]
impl HistorySink for FlumeHistorySink {
    async fn append(&self, caller_id: Option<&str>, query: &str, summary: &str) -> Result<()> {
        let record = HistoryRecord {
            caller_id: caller_id.map(str::to_string),
            query: query.to_string(),
            summary: summary.to_string(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.sender.try_send(record) {
            warn!(error = %e, "history queue full, dropping record");
        }

        Ok(())
    }
}
