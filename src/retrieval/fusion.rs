use crate::models::{ChunkHit, FusedHit, SourceTag};
use std::collections::HashMap;
use tracing::debug;

/// Reciprocal Rank Fusion over a dense and a lexical hit list (C4, spec §4.4).
///
/// `rrf(hit) = 1 / (k + rank)` with `rank` 0-based; a chunk present in both
/// lists sums its two contributions. Empty inputs yield an empty result, not
/// an error.
pub fn fuse(dense: Vec<ChunkHit>, lexical: Vec<ChunkHit>, k: f32) -> Vec<FusedHit> {
    debug!(dense = dense.len(), lexical = lexical.len(), "fusing retrieval results");

    let mut merged: HashMap<String, FusedHit> = HashMap::new();

    for (rank, hit) in dense.into_iter().enumerate() {
        let rrf = 1.0 / (k + rank as f32);
        merged
            .entry(hit.chunk_id.clone())
            .and_modify(|existing| {
                existing.rrf_score += rrf;
                existing.semantic_rank = Some(rank);
                existing.raw_semantic_score = Some(hit.score);
                existing.source_tag = SourceTag::Hybrid;
            })
            .or_insert_with(|| FusedHit {
                chunk_id: hit.chunk_id.clone(),
                document_id: hit.document_id.clone(),
                document_title: hit.document_title.clone(),
                document_type: hit.document_type.clone(),
                chunk_text: hit.chunk_text.clone(),
                order: hit.order,
                metadata: hit.metadata.clone(),
                total_chunks_in_document: hit.total_chunks_in_document,
                rrf_score: rrf,
                semantic_rank: Some(rank),
                lexical_rank: None,
                raw_semantic_score: Some(hit.score),
                source_tag: SourceTag::Dense,
            });
    }

    for (rank, hit) in lexical.into_iter().enumerate() {
        let rrf = 1.0 / (k + rank as f32);
        merged
            .entry(hit.chunk_id.clone())
            .and_modify(|existing| {
                existing.rrf_score += rrf;
                existing.lexical_rank = Some(rank);
                existing.source_tag = SourceTag::Hybrid;
            })
            .or_insert_with(|| FusedHit {
                chunk_id: hit.chunk_id.clone(),
                document_id: hit.document_id.clone(),
                document_title: hit.document_title.clone(),
                document_type: hit.document_type.clone(),
                chunk_text: hit.chunk_text.clone(),
                order: hit.order,
                metadata: hit.metadata.clone(),
                total_chunks_in_document: hit.total_chunks_in_document,
                rrf_score: rrf,
                semantic_rank: None,
                lexical_rank: Some(rank),
                raw_semantic_score: None,
                source_tag: SourceTag::Lexical,
            });
    }

    let mut results: Vec<FusedHit> = merged.into_values().collect();
    results.sort_by(|a, b| b.rrf_score.partial_cmp(&a.rrf_score).unwrap());

    debug!(produced = results.len(), "fusion complete");
    results
}
