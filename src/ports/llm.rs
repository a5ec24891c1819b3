use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Storage/compute primitive C10 (spec §4.10): a chat-completion call that
/// requests JSON-mode output and honors a caller-supplied deadline.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_json(&self, request: ChatJsonRequest) -> Result<String, LlmCallError>;
}

#[derive(Debug, Clone)]
pub struct ChatJsonRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub priority: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmCallError {
    #[error("llm call timed out after {0:?}")]
    Timeout(Duration),
    #[error("llm call failed ({status}): {body}")]
    Failed { status: u16, body: String },
}
