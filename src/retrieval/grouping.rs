use crate::models::{DocumentResult, FusedHit};
use std::collections::HashMap;

/// Document Grouper (C7, spec §4.7). Collapses chunks into per-document
/// entries and computes the relevance-density quality metric.
pub fn group(hits: Vec<FusedHit>, enable_density_calc: bool) -> Vec<DocumentResult> {
    let mut groups: HashMap<String, DocumentResult> = HashMap::new();

    for hit in hits {
        let entry = groups.entry(hit.document_id.clone()).or_insert_with(|| DocumentResult {
            document_id: hit.document_id.clone(),
            document_title: hit.document_title.clone(),
            document_type: hit.document_type.clone(),
            chunks: Vec::new(),
            best_rrf_score: 0.0,
            best_raw_similarity: 0.0,
            relevance_density: 0.0,
        });

        entry.best_rrf_score = entry.best_rrf_score.max(hit.rrf_score);
        if let Some(raw) = hit.raw_semantic_score {
            entry.best_raw_similarity = entry.best_raw_similarity.max(raw);
        }
        entry.chunks.push(hit);
    }

    let mut results: Vec<DocumentResult> = groups
        .into_values()
        .map(|mut doc| {
            doc.chunks.sort_by(|a, b| {
                b.rrf_score
                    .partial_cmp(&a.rrf_score)
                    .unwrap()
                    .then_with(|| a.order.cmp(&b.order))
            });

            let total = doc.chunks.first().map(|c| c.total_chunks_in_document).unwrap_or(0);
            doc.relevance_density = if enable_density_calc && total > 0 {
                (doc.chunks.len() as f32 / total as f32).clamp(0.0, 1.0)
            } else {
                0.0
            };

            doc
        })
        .collect();

    results.sort_by(|a, b| {
        b.best_rrf_score
            .partial_cmp(&a.best_rrf_score)
            .unwrap()
            .then_with(|| b.best_raw_similarity.partial_cmp(&a.best_raw_similarity).unwrap())
            .then_with(|| a.document_id.cmp(&b.document_id))
    });

    results
}
