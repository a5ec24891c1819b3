use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

/// Error kinds surfaced across the retrieval and insight pipelines (spec §7).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailure(String),

    #[error("retrieval failed: {0}")]
    RetrievalFailure(String),

    #[error("malformed filters: {0}")]
    FilterError(String),

    #[error("llm call timed out after {0}ms")]
    LlmTimeout(u64),

    #[error("llm error ({status}): {body}")]
    LlmError { status: u16, body: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// `FilterError` is documented as a specialization of `InvalidArgument` (spec §7).
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::FilterError(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            ApiError::InvalidArgument(msg) => {
                tracing::warn!(error = %msg, kind = "InvalidArgument", "invalid_argument");
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            ApiError::FilterError(msg) => {
                tracing::warn!(error = %msg, kind = "InvalidArgument", "filter_error");
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!(error = %msg, kind = "Unauthorized", "unauthorized");
                (StatusCode::UNAUTHORIZED, msg.clone(), None)
            }
            ApiError::EmbeddingFailure(msg) => {
                tracing::error!(error = %msg, kind = "EmbeddingFailure", "embedding_failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
            ApiError::RetrievalFailure(msg) => {
                tracing::error!(error = %msg, kind = "RetrievalFailure", "retrieval_failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
            ApiError::LlmTimeout(ms) => {
                tracing::error!(timeout_ms = ms, kind = "LLMError", "llm_timeout");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("llm call timed out after {ms}ms"), None)
            }
            ApiError::LlmError { status, body } => {
                tracing::error!(upstream_status = status, kind = "LLMError", "llm_error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "llm request failed".to_string(),
                    Some(format!("upstream status {status}: {body}")),
                )
            }
            ApiError::CacheError(msg) => {
                tracing::warn!(error = %msg, kind = "InternalError", "cache_error_non_fatal");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, kind = "InternalError", "internal_error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
        };

        let body = Json(ErrorBody { error: message, details });
        (status, body).into_response()
    }
}
