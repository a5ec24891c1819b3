pub mod cache;
pub mod embedder;
pub mod history;
pub mod identity;
pub mod llm;
pub mod retriever;

pub use cache::InsightCacheStore;
pub use embedder::QueryEmbedder;
pub use history::HistorySink;
pub use identity::IdentityVerifier;
pub use llm::LlmClient;
pub use retriever::{DenseRetriever, LexicalRetriever};
