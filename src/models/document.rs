use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document in the corpus. The core never mutates these; they are owned and
/// lifecycle-managed by the ingestion system (spec §1, out of scope here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub is_public: bool,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Only `status = "indexed"` documents are visible to retrieval (spec §3).
    pub fn is_indexed(&self) -> bool {
        self.status == "indexed"
    }
}

/// A pre-embedded, pre-indexed text fragment from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub order: i32,
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub total_chunks_in_document: i32,
}

/// Which retriever produced a hit, and how it survived fusion/fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Dense,
    Lexical,
    Hybrid,
    DenseFallback,
    LexicalFallback,
    HybridFallback,
}

impl SourceTag {
    /// Tag a source as belonging to the fallback pass, preserving dense/lexical/hybrid.
    pub fn as_fallback(self) -> Self {
        match self {
            SourceTag::Dense | SourceTag::DenseFallback => SourceTag::DenseFallback,
            SourceTag::Lexical | SourceTag::LexicalFallback => SourceTag::LexicalFallback,
            SourceTag::Hybrid | SourceTag::HybridFallback => SourceTag::HybridFallback,
        }
    }
}

/// Raw output of a single retriever (C2 dense or C3 lexical), before fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHit {
    pub chunk_id: String,
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    pub chunk_text: String,
    pub order: i32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Cosine similarity in [0,1] for dense hits, lexical relevance (>= 0) for lexical hits.
    pub score: f32,
    pub total_chunks_in_document: i32,
}

/// A chunk after Reciprocal Rank Fusion (spec §3/§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedHit {
    pub chunk_id: String,
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    pub chunk_text: String,
    pub order: i32,
    pub metadata: HashMap<String, serde_json::Value>,
    pub total_chunks_in_document: i32,
    pub rrf_score: f32,
    pub semantic_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
    pub raw_semantic_score: Option<f32>,
    pub source_tag: SourceTag,
}
