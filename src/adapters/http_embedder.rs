use crate::config::settings::EmbeddingConfig;
use crate::errors::ApiError;
use crate::ports::QueryEmbedder;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Concrete C1 (spec §4.1): calls an OpenAI-compatible `/v1/embeddings`
/// endpoint for the query embedding used by dense search.
pub struct HttpQueryEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl HttpQueryEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url,
            model: config.model,
            dimension: config.dimension,
        }
    }
}

#[async_trait]
impl QueryEmbedder for HttpQueryEmbedder {
    async fn embed(&self, query: &str) -> Result<Vec<f32>, ApiError> {
        let request = EmbeddingRequest { input: query.to_string(), model: self.model.clone() };
        let url = format!("{}/v1/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::EmbeddingFailure(format!("failed to reach embedding server: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::EmbeddingFailure(format!("embedding API error ({status}): {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ApiError::EmbeddingFailure(format!("failed to parse embedding response: {e}")))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ApiError::EmbeddingFailure("empty data array from embedding server".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(ApiError::EmbeddingFailure(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        debug!(dimension = embedding.len(), "query embedding generated");
        Ok(embedding)
    }
}
