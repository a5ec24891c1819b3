use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
    pub limits: LimitsConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    #[serde(default)]
    pub custom_headers: Option<CustomHeadersConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CustomHeadersConfig {
    pub app_id: String,
    pub api_key: String,
    pub signature_secret: String,
    pub timestamp_tolerance_seconds: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    pub model: String,
    pub base_url: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_tokens: usize,
    /// Temperature for document_summaries prompts (spec §4.10 default 0.2).
    pub summary_temperature: f32,
    /// Temperature for direct_answer / related_questions prompts (default 0.3).
    pub generation_temperature: f32,
}

/// The recognized retrieval options from spec §9, with their documented
/// defaults.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "RetrievalConfig::default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "RetrievalConfig::default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "RetrievalConfig::default_rrf_k")]
    pub rrf_k: f32,
    #[serde(default = "RetrievalConfig::default_min_results_threshold")]
    pub min_results_threshold: usize,
    #[serde(default = "RetrievalConfig::default_fallback_floor")]
    pub fallback_similarity_floor: f32,
}

impl RetrievalConfig {
    fn default_similarity_threshold() -> f32 {
        0.6
    }
    fn default_max_chunks() -> usize {
        50
    }
    fn default_rrf_k() -> f32 {
        10.0
    }
    fn default_min_results_threshold() -> usize {
        3
    }
    fn default_fallback_floor() -> f32 {
        0.3
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: Self::default_similarity_threshold(),
            max_chunks: Self::default_max_chunks(),
            rrf_k: Self::default_rrf_k(),
            min_results_threshold: Self::default_min_results_threshold(),
            fallback_similarity_floor: Self::default_fallback_floor(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_ttl")]
    pub ttl_seconds: i64,
}

impl CacheConfig {
    fn default_ttl() -> i64 {
        86_400
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: Self::default_ttl() }
    }
}

/// Per-operation concurrency semaphores (reference implementation's
/// `utils/limiters.rs`), applied so the core degrades gracefully under load.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "LimitsConfig::default_concurrency")]
    pub embedding_concurrency: usize,
    #[serde(default = "LimitsConfig::default_concurrency")]
    pub dense_search_concurrency: usize,
    #[serde(default = "LimitsConfig::default_concurrency")]
    pub lexical_search_concurrency: usize,
    #[serde(default = "LimitsConfig::default_llm_concurrency")]
    pub llm_concurrency: usize,
    #[serde(default = "LimitsConfig::default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl LimitsConfig {
    fn default_concurrency() -> usize {
        16
    }
    fn default_llm_concurrency() -> usize {
        8
    }
    fn default_acquire_timeout_ms() -> u64 {
        5_000
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            embedding_concurrency: Self::default_concurrency(),
            dense_search_concurrency: Self::default_concurrency(),
            lexical_search_concurrency: Self::default_concurrency(),
            llm_concurrency: Self::default_llm_concurrency(),
            acquire_timeout_ms: Self::default_acquire_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IdentityConfig {
    /// Shared secret for the reference JWT identity hook. A real deployment
    /// swaps this hook for whatever the external auth provider requires.
    pub jwt_secret: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    pub fn config_path(&self) -> PathBuf {
        PathBuf::from("config/settings.toml")
    }
}
