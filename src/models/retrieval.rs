use super::document::{FusedHit, SourceTag};
use crate::utils::query_hint::QueryComplexityHint;
use serde::{Deserialize, Serialize};

/// Caller-supplied post-filters applied over the fused hit list (spec §4.5).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    #[serde(default, rename = "document_id")]
    pub document_ids: Vec<String>,
    #[serde(default, rename = "document_type")]
    pub document_types: Vec<String>,
    #[serde(default, rename = "dateRange")]
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

/// Per-document grouping of fused hits (spec §3/§4.7).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    pub chunks: Vec<FusedHit>,
    pub best_rrf_score: f32,
    pub best_raw_similarity: f32,
    pub relevance_density: f32,
}

/// Per-stage timings plus the documented sum-of-components/wall-clock split
/// from spec §9's open question about `total_search_ms`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceMetrics {
    pub embedding_generation_ms: u64,
    pub semantic_search_ms: u64,
    pub keyword_search_ms: u64,
    pub parallel_retrieval_ms: u64,
    pub rrf_fusion_ms: u64,
    pub document_grouping_ms: u64,
    /// Sum of the components above, kept for backward compatibility with callers
    /// that expect a single number (spec §9).
    pub total_search_ms: u64,
    /// Actual wall-clock duration of the request, which is lower than
    /// `total_search_ms` whenever dense/lexical search overlapped.
    pub total_search_wall_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FallbackInfo {
    pub used: bool,
    pub precision_results: Option<usize>,
    pub fallback_results: Option<usize>,
    pub total_combined: Option<usize>,
    pub threshold: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveRequest {
    pub user_query: String,
    #[serde(default)]
    pub filters: Option<Filters>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    #[serde(default)]
    pub include_public_only: bool,
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
    #[serde(default = "default_true")]
    pub enable_density_calc: bool,
    #[serde(default)]
    pub debug: bool,
}

fn default_limit() -> usize {
    50
}
fn default_min_similarity() -> f32 {
    0.6
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrieveResponse {
    pub results: Vec<DocumentResultView>,
    pub total_documents: usize,
    pub total_chunks: usize,
    pub query: String,
    pub performance_metrics: PerformanceMetrics,
    pub fallback_info: FallbackInfo,
    /// Advisory only, attached when `debug=true` (spec §3 query-complexity
    /// hinting supplement). Never influences C1→C7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_complexity_hint: Option<QueryComplexityHint>,
}

/// Wire representation of a chunk, shared by the retrieve() response and the
/// insights() request — a client re-submits a `retrieve` response's
/// `DocumentResultView`s as the `documents` field of an `insights` call.
/// `rrf_score` always travels (it drives document/chunk ordering); the raw
/// per-source ranks and `source_tag` are attached only when `debug=true`
/// (spec §4.13).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmittedChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub chunk_text: String,
    pub order: i32,
    pub rrf_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<ChunkDebugInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDebugInfo {
    pub semantic_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
    pub raw_semantic_score: Option<f32>,
    pub source_tag: SourceTag,
}

impl EmittedChunk {
    fn from_fused(hit: &FusedHit, debug: bool) -> Self {
        Self {
            chunk_id: hit.chunk_id.clone(),
            document_id: hit.document_id.clone(),
            chunk_text: hit.chunk_text.clone(),
            order: hit.order,
            rrf_score: hit.rrf_score,
            debug: debug.then(|| ChunkDebugInfo {
                semantic_rank: hit.semantic_rank,
                lexical_rank: hit.lexical_rank,
                raw_semantic_score: hit.raw_semantic_score,
                source_tag: hit.source_tag,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResultView {
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    pub chunks: Vec<EmittedChunk>,
    pub best_rrf_score: f32,
    pub best_raw_similarity: f32,
    pub relevance_density: f32,
}

impl DocumentResultView {
    pub fn from_result(result: &DocumentResult, debug: bool) -> Self {
        Self {
            document_id: result.document_id.clone(),
            document_title: result.document_title.clone(),
            document_type: result.document_type.clone(),
            chunks: result.chunks.iter().map(|h| EmittedChunk::from_fused(h, debug)).collect(),
            best_rrf_score: result.best_rrf_score,
            best_raw_similarity: result.best_raw_similarity,
            relevance_density: result.relevance_density,
        }
    }
}
