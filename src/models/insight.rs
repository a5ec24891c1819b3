use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    DocumentSummaries,
    DirectAnswer,
    RelatedQuestions,
    All,
}

impl InsightType {
    pub fn wants_document_summaries(self) -> bool {
        matches!(self, InsightType::DocumentSummaries | InsightType::All)
    }
    pub fn wants_direct_answer(self) -> bool {
        matches!(self, InsightType::DirectAnswer | InsightType::All)
    }
    pub fn wants_related_questions(self) -> bool {
        matches!(self, InsightType::RelatedQuestions | InsightType::All)
    }

    /// The cache-key prefix for this kind (spec §4.12). `All` is cached as a
    /// single combined bundle under its own prefix.
    pub fn cache_prefix(self) -> &'static str {
        match self {
            InsightType::DocumentSummaries => "document_summaries",
            InsightType::DirectAnswer => "direct_answer",
            InsightType::RelatedQuestions => "related_questions",
            InsightType::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QuestionCategory {
    Strategic,
    Technical,
    Adoption,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    pub relevance_summary: String,
    pub confidence_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectAnswer {
    pub answer_markdown: String,
    pub confidence: f32,
    pub source_document_titles: Vec<String>,
    pub source_document_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedQuestion {
    pub question: String,
    pub relevance: f32,
    pub category: QuestionCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_summaries: Option<Vec<DocumentSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_answer: Option<DirectAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_questions: Option<Vec<RelatedQuestion>>,
    pub cache_key: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub bundle: InsightBundle,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Inbound `insights()` request shape (spec §6).
#[derive(Debug, Clone, Deserialize)]
pub struct InsightRequest {
    pub user_query: String,
    pub documents: Vec<super::retrieval::DocumentResultView>,
    pub insight_type: InsightType,
    #[serde(default)]
    pub cache_key: Option<String>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub search_time_ms: Option<u64>,
}

/// Outbound `insights()` response: the bundle plus per-kind timing and a
/// cache-hit flag (spec §6).
#[derive(Debug, Clone, Serialize)]
pub struct InsightResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_summaries: Option<Vec<DocumentSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_answer: Option<DirectAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_questions: Option<Vec<RelatedQuestion>>,
    pub cache_key: String,
    pub generated_at: DateTime<Utc>,
    pub cached: bool,
    pub performance_metrics: InsightPerformanceMetrics,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightPerformanceMetrics {
    pub breakdown_ms: std::collections::HashMap<String, u64>,
    pub total_ms: u64,
}
