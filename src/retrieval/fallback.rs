use crate::models::{FallbackInfo, FusedHit};
use crate::ports::{DenseRetriever, LexicalRetriever};
use crate::retrieval::fusion;
use std::collections::HashMap;
use tracing::warn;

/// Fallback Controller (C6, spec §4.6). Broadens the search when the
/// post-filter output is sparse; on any retriever error the primary result is
/// returned unchanged (logged, never fatal).
#[allow(clippy::too_many_arguments)]
pub async fn maybe_broaden(
    primary: Vec<FusedHit>,
    query_vec: &[f32],
    query_text: &str,
    similarity_threshold: f32,
    max_results: usize,
    caller_id: Option<&str>,
    public_only: bool,
    rrf_k: f32,
    min_results_threshold: usize,
    enable_fallback: bool,
    dense: &dyn DenseRetriever,
    lexical: &dyn LexicalRetriever,
) -> (Vec<FusedHit>, FallbackInfo) {
    if !enable_fallback || primary.len() >= min_results_threshold {
        return (primary, FallbackInfo::default());
    }

    let relaxed_threshold = (similarity_threshold - 0.2).max(0.3);
    let relaxed_max = max_results * 2;

    let dense_result = dense
        .search_dense(query_vec, relaxed_threshold, relaxed_max, caller_id, public_only)
        .await;
    let lexical_result = lexical.search_lexical(query_text, relaxed_max, caller_id, public_only).await;

    let (dense_hits, lexical_hits) = match (dense_result, lexical_result) {
        (Ok(d), Ok(l)) => (d, l),
        (dense_result, lexical_result) => {
            warn!("fallback retrieval failed, returning primary results only");
            let dense_hits = dense_result.unwrap_or_default();
            let lexical_hits = lexical_result.unwrap_or_default();
            (dense_hits, lexical_hits)
        }
    };

    if dense_hits.is_empty() && lexical_hits.is_empty() {
        return (
            primary.clone(),
            FallbackInfo {
                used: false,
                precision_results: Some(primary.len()),
                fallback_results: Some(0),
                total_combined: Some(primary.len()),
                threshold: Some(min_results_threshold),
            },
        );
    }

    let fallback_hits: Vec<FusedHit> = fusion::fuse(dense_hits, lexical_hits, rrf_k)
        .into_iter()
        .map(|mut hit| {
            hit.source_tag = hit.source_tag.as_fallback();
            hit
        })
        .collect();

    let precision_count = primary.len();
    let fallback_count = fallback_hits.len();

    let mut combined: HashMap<String, FusedHit> = HashMap::new();
    for hit in fallback_hits {
        combined.insert(hit.chunk_id.clone(), hit);
    }
    for hit in primary {
        combined.insert(hit.chunk_id.clone(), hit);
    }

    let mut merged: Vec<FusedHit> = combined.into_values().collect();
    merged.sort_by(|a, b| b.rrf_score.partial_cmp(&a.rrf_score).unwrap());

    let total_combined = merged.len();

    (
        merged,
        FallbackInfo {
            used: true,
            precision_results: Some(precision_count),
            fallback_results: Some(fallback_count),
            total_combined: Some(total_combined),
            threshold: Some(min_results_threshold),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkHit, SourceTag};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap as StdHashMap;

    struct StubDense(Vec<ChunkHit>);
    struct StubLexical(Vec<ChunkHit>);

    #[async_trait]
    impl DenseRetriever for StubDense {
        async fn search_dense(
            &self,
            _query_vec: &[f32],
            _similarity_threshold: f32,
            _max_results: usize,
            _caller_id: Option<&str>,
            _public_only: bool,
        ) -> Result<Vec<ChunkHit>> {
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl LexicalRetriever for StubLexical {
        async fn search_lexical(
            &self,
            _query_text: &str,
            _max_results: usize,
            _caller_id: Option<&str>,
            _public_only: bool,
        ) -> Result<Vec<ChunkHit>> {
            Ok(self.0.clone())
        }
    }

    fn chunk_hit(id: &str, doc: &str) -> ChunkHit {
        ChunkHit {
            chunk_id: id.to_string(),
            document_id: doc.to_string(),
            document_title: "t".to_string(),
            document_type: "article".to_string(),
            chunk_text: "text".to_string(),
            order: 0,
            metadata: StdHashMap::new(),
            score: 0.5,
            total_chunks_in_document: 10,
        }
    }

    #[tokio::test]
    async fn skips_broadening_when_results_are_sufficient() {
        let primary = vec![]; // irrelevant, threshold check uses primary.len()
        let dense = StubDense(vec![chunk_hit("a", "d1")]);
        let lexical = StubLexical(vec![]);

        let (_, info) = maybe_broaden(
            primary, &[0.1], "q", 0.6, 50, None, false, 10.0, 0, true, &dense, &lexical,
        )
        .await;

        assert!(!info.used);
    }

    #[tokio::test]
    async fn broadens_when_sparse() {
        let primary = vec![]; // 0 < threshold 3
        let dense = StubDense(vec![chunk_hit("fb1", "d2"), chunk_hit("fb2", "d3")]);
        let lexical = StubLexical(vec![]);

        let (results, info) = maybe_broaden(
            primary, &[0.1], "q", 0.6, 50, None, false, 10.0, 3, true, &dense, &lexical,
        )
        .await;

        assert!(info.used);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|h| h.source_tag == SourceTag::DenseFallback));
    }

    #[tokio::test]
    async fn primary_wins_on_conflict() {
        let mut primary_hit = chunk_hit("shared", "d1");
        primary_hit.score = 0.99;
        let primary_fused = fusion::fuse(vec![primary_hit], vec![], 10.0);

        let dense = StubDense(vec![chunk_hit("shared", "d1")]);
        let lexical = StubLexical(vec![]);

        let (results, _) = maybe_broaden(
            primary_fused.clone(),
            &[0.1],
            "q",
            0.6,
            50,
            None,
            false,
            10.0,
            3,
            true,
            &dense,
            &lexical,
        )
        .await;

        let shared = results.iter().find(|h| h.chunk_id == "shared").unwrap();
        assert_eq!(shared.source_tag, primary_fused[0].source_tag);
    }
}
