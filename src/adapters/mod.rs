pub mod cached_embedder;
pub mod dashmap_cache;
pub mod flume_history;
pub mod http_embedder;
pub mod http_llm;
pub mod jwt_identity;
pub mod pool;
pub mod postgres_dense;
pub mod postgres_lexical;

pub use cached_embedder::CachedQueryEmbedder;
pub use dashmap_cache::DashMapInsightCache;
pub use flume_history::FlumeHistorySink;
pub use http_embedder::HttpQueryEmbedder;
pub use http_llm::HttpLlmClient;
pub use jwt_identity::JwtIdentityVerifier;
pub use pool::DbPool;
pub use postgres_dense::PostgresDenseRetriever;
pub use postgres_lexical::PostgresLexicalRetriever;
