use crate::errors::ApiError;
use async_trait::async_trait;

/// Query Embedder (C1, spec §4.1): turns a query string into a fixed-dimension,
/// mean-pooled, L2-normalized vector. Not a storage primitive, but modeled as a
/// port because it is backed by an external embedding model server.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed(&self, query: &str) -> Result<Vec<f32>, ApiError>;
}
