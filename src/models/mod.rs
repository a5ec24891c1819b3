pub mod document;
pub mod identity;
pub mod insight;
pub mod retrieval;

pub use document::{Chunk, ChunkHit, Document, FusedHit, SourceTag};
pub use identity::CallerIdentity;
pub use insight::{
    CacheEntry, DirectAnswer, DocumentSummary, InsightBundle, InsightPerformanceMetrics,
    InsightRequest, InsightResponse, InsightType, QuestionCategory, RelatedQuestion,
};
pub use retrieval::{
    ChunkDebugInfo, DateRange, DocumentResult, DocumentResultView, EmittedChunk, FallbackInfo,
    Filters, PerformanceMetrics, RetrieveRequest, RetrieveResponse,
};
