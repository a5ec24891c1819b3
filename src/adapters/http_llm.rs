use crate::config::settings::LlmConfig;
use crate::ports::llm::{ChatJsonRequest, LlmCallError, LlmClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    messages: Vec<crate::ports::llm::ChatMessage>,
    model: String,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Concrete C10 (spec §4.10): non-streaming JSON-mode chat completion.
/// Owns the per-request deadline itself (the orchestrator only supplies the
/// `Duration`); a timed-out request surfaces as `LlmCallError::Timeout`.
pub struct HttpLlmClient {
    client: Client,
    base_url: String,
    max_tokens: usize,
}

impl HttpLlmClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat_json(&self, request: ChatJsonRequest) -> Result<String, LlmCallError> {
        let body = ChatCompletionRequest {
            messages: request.messages,
            model: request.model,
            max_tokens: self.max_tokens,
            temperature: request.temperature,
            stream: false,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&body);
        if request.priority {
            builder = builder.header("X-Priority", "high");
        }

        let call = async {
            let response = builder
                .send()
                .await
                .map_err(|e| LlmCallError::Failed { status: 0, body: e.to_string() })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(LlmCallError::Failed { status, body });
            }

            let parsed: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| LlmCallError::Failed { status: 0, body: format!("malformed response: {e}") })?;

            parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| LlmCallError::Failed { status: 0, body: "no choices in response".to_string() })
        };

        let timeout = request.timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => {
                debug!("llm chat_json completed");
                result
            }
            Err(_) => Err(LlmCallError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm::ChatMessage;

    struct StaticLlmClient {
        response: String,
    }

    #[async_trait]
    impl LlmClient for StaticLlmClient {
        async fn chat_json(&self, _request: ChatJsonRequest) -> Result<String, LlmCallError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn static_client_returns_configured_response() {
        let client = StaticLlmClient { response: r#"{"ok":true}"#.to_string() };
        let request = ChatJsonRequest {
            messages: vec![ChatMessage::user("hi")],
            model: "test-model".to_string(),
            temperature: 0.2,
            priority: false,
            timeout: Duration::from_secs(1),
        };

        let result = client.chat_json(request).await.unwrap();
        assert_eq!(result, r#"{"ok":true}"#);
    }
}
