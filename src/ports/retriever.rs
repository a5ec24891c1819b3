use crate::models::ChunkHit;
use anyhow::Result;
use async_trait::async_trait;

/// Storage primitive C2 (spec §4.2, §6): vector similarity search over the
/// chunk embedding index. Visibility (caller's private documents union public,
/// `status = "indexed"` only) is enforced by the implementation, not the core.
#[async_trait]
pub trait DenseRetriever: Send + Sync {
    async fn search_dense(
        &self,
        query_vec: &[f32],
        similarity_threshold: f32,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> Result<Vec<ChunkHit>>;
}

/// Storage primitive C3 (spec §4.3, §6): full-text lexical search, English
/// tokenization, rank-by-cover scoring. Same visibility rules as C2.
#[async_trait]
pub trait LexicalRetriever: Send + Sync {
    async fn search_lexical(
        &self,
        query_text: &str,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> Result<Vec<ChunkHit>>;
}
