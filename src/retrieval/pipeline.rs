use crate::config::settings::RetrievalConfig;
use crate::errors::ApiError;
use crate::models::{
    DocumentResultView, FallbackInfo, PerformanceMetrics, RetrieveRequest, RetrieveResponse,
};
use crate::ports::{DenseRetriever, LexicalRetriever, QueryEmbedder};
use crate::retrieval::{fallback, filter, fusion, grouping};
use crate::utils::{query_hint, Limiters};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Orchestrates C1 → C4 → C5 → (C6) → C7, the full retrieve() operation
/// (spec §4.13, state machine in the same section).
pub struct RetrievalPipeline {
    embedder: Arc<dyn QueryEmbedder>,
    dense: Arc<dyn DenseRetriever>,
    lexical: Arc<dyn LexicalRetriever>,
    limiters: Arc<Limiters>,
    config: RetrievalConfig,
    embedding_timeout: Duration,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn QueryEmbedder>,
        dense: Arc<dyn DenseRetriever>,
        lexical: Arc<dyn LexicalRetriever>,
        limiters: Arc<Limiters>,
        config: RetrievalConfig,
        embedding_timeout: Duration,
    ) -> Self {
        Self { embedder, dense, lexical, limiters, config, embedding_timeout }
    }

    pub async fn retrieve(
        &self,
        request: &RetrieveRequest,
        caller_id: Option<&str>,
    ) -> Result<RetrieveResponse, ApiError> {
        let query = request.user_query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidArgument("user_query is required".to_string()));
        }

        let wall_start = Instant::now();

        // EMBED
        let embed_start = Instant::now();
        let query_vec = self.embed(query).await?;
        let embedding_generation_ms = embed_start.elapsed().as_millis() as u64;

        // RETRIEVE_PARALLEL: C2 ‖ C3, measured independently, never serialized.
        let parallel_start = Instant::now();
        let max_results = self.config.max_chunks.max(request.limit);
        let similarity_threshold = request.min_similarity;
        let public_only = request.include_public_only;

        let dense_fut = self.search_dense(&query_vec, similarity_threshold, max_results, caller_id, public_only);
        let lexical_fut = self.search_lexical(query, max_results, caller_id, public_only);
        let (dense_result, lexical_result) = tokio::join!(dense_fut, lexical_fut);
        let parallel_retrieval_ms = parallel_start.elapsed().as_millis() as u64;

        let (dense_hits, semantic_search_ms, dense_failed) = match dense_result {
            Ok((hits, ms)) => (hits, ms, false),
            Err(e) => {
                warn!(error = %e, "dense retrieval failed, continuing with lexical only");
                (Vec::new(), 0, true)
            }
        };
        let (lexical_hits, keyword_search_ms, lexical_failed) = match lexical_result {
            Ok((hits, ms)) => (hits, ms, false),
            Err(e) => {
                warn!(error = %e, "lexical retrieval failed, continuing with dense only");
                (Vec::new(), 0, true)
            }
        };

        if dense_failed && lexical_failed {
            return Err(ApiError::RetrievalFailure(
                "both dense and lexical retrieval failed".to_string(),
            ));
        }

        // FUSE
        let fuse_start = Instant::now();
        let fused = fusion::fuse(dense_hits, lexical_hits, self.config.rrf_k);
        let rrf_fusion_ms = fuse_start.elapsed().as_millis() as u64;

        // FILTER
        let filtered = match &request.filters {
            Some(filters) => filter::apply(fused, filters),
            None => fused,
        };

        // FALLBACK
        let (broadened, fallback_info) = fallback::maybe_broaden(
            filtered,
            &query_vec,
            query,
            similarity_threshold,
            max_results,
            caller_id,
            public_only,
            self.config.rrf_k,
            self.config.min_results_threshold,
            request.enable_fallback,
            self.dense.as_ref(),
            self.lexical.as_ref(),
        )
        .await;

        // GROUP
        let group_start = Instant::now();
        let grouped = grouping::group(broadened, request.enable_density_calc);
        let document_grouping_ms = group_start.elapsed().as_millis() as u64;

        let total_chunks: usize = grouped.iter().map(|d| d.chunks.len()).sum();
        let total_documents = grouped.len();

        let total_search_ms = embedding_generation_ms
            + semantic_search_ms
            + keyword_search_ms
            + rrf_fusion_ms
            + document_grouping_ms;
        let total_search_wall_ms = wall_start.elapsed().as_millis() as u64;

        let results: Vec<DocumentResultView> =
            grouped.iter().map(|d| DocumentResultView::from_result(d, request.debug)).collect();

        let query_complexity_hint = request.debug.then(|| query_hint::classify(query));

        info!(
            total_documents,
            total_chunks,
            fallback_used = fallback_info.used,
            "retrieve completed"
        );

        Ok(RetrieveResponse {
            results,
            total_documents,
            total_chunks,
            query: query.to_string(),
            performance_metrics: PerformanceMetrics {
                embedding_generation_ms,
                semantic_search_ms,
                keyword_search_ms,
                parallel_retrieval_ms,
                rrf_fusion_ms,
                document_grouping_ms,
                total_search_ms,
                total_search_wall_ms,
            },
            fallback_info,
            query_complexity_hint,
        })
    }

    async fn embed(&self, query: &str) -> Result<Vec<f32>, ApiError> {
        let (_permit, _wait) = Limiters::acquire_timed(
            self.limiters.embedding.clone(),
            self.limiters.acquire_timeout,
            "embedding",
        )
        .await
        .map_err(|e| ApiError::EmbeddingFailure(e.to_string()))?;

        tokio::time::timeout(self.embedding_timeout, self.embedder.embed(query))
            .await
            .map_err(|_| ApiError::EmbeddingFailure("embedding request timed out".to_string()))?
    }

    async fn search_dense(
        &self,
        query_vec: &[f32],
        similarity_threshold: f32,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> anyhow::Result<(Vec<crate::models::ChunkHit>, u64)> {
        let (_permit, _wait) =
            Limiters::acquire_timed(self.limiters.dense_search.clone(), self.limiters.acquire_timeout, "dense_search")
                .await?;
        let start = Instant::now();
        let hits = self
            .dense
            .search_dense(query_vec, similarity_threshold, max_results, caller_id, public_only)
            .await?;
        Ok((hits, start.elapsed().as_millis() as u64))
    }

    async fn search_lexical(
        &self,
        query_text: &str,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> anyhow::Result<(Vec<crate::models::ChunkHit>, u64)> {
        let (_permit, _wait) = Limiters::acquire_timed(
            self.limiters.lexical_search.clone(),
            self.limiters.acquire_timeout,
            "lexical_search",
        )
        .await?;
        let start = Instant::now();
        let hits = self.lexical.search_lexical(query_text, max_results, caller_id, public_only).await?;
        Ok((hits, start.elapsed().as_millis() as u64))
    }
}
