use anyhow::Result;
use async_trait::async_trait;

/// Storage primitive `history_append` (spec §6): best-effort persistence of a
/// query/response pair. Failures are logged but never surfaced to the caller
/// (spec §7); callers of this trait should treat every error as non-fatal.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn append(&self, caller_id: Option<&str>, query: &str, summary: &str) -> Result<()>;
}

/// A sink that drops everything; useful as a default when no history backend
/// is configured.
pub struct NullHistorySink;

#[async_trait]
impl HistorySink for NullHistorySink {
    async fn append(&self, _caller_id: Option<&str>, _query: &str, _summary: &str) -> Result<()> {
        Ok(())
    }
}
