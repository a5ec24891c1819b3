use crate::config::settings::LlmConfig;
use crate::insight::json_extract::extract_first_json_object;
use crate::insight::prompts::PromptAssembler;
use crate::models::{DirectAnswer, DocumentResultView, DocumentSummary, InsightType, QuestionCategory, RelatedQuestion};
use crate::ports::llm::{ChatJsonRequest, LlmCallError, LlmClient};
use crate::utils::Limiters;
use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Insight Orchestrator (C8, spec §4.8): fans out the selected insight kinds
/// concurrently, each independently timed out. A failed or timed-out task
/// degrades to its documented fallback value and never cancels its siblings.
pub struct InsightOrchestrator {
    llm: Arc<dyn LlmClient>,
    limiters: Arc<Limiters>,
    config: LlmConfig,
}

#[derive(Debug, Default)]
pub struct GeneratedInsights {
    pub document_summaries: Option<Vec<DocumentSummary>>,
    pub direct_answer: Option<DirectAnswer>,
    pub related_questions: Option<Vec<RelatedQuestion>>,
    pub breakdown_ms: HashMap<String, u64>,
}

impl InsightOrchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, limiters: Arc<Limiters>, config: LlmConfig) -> Self {
        Self { llm, limiters, config }
    }

    pub async fn generate(
        &self,
        query: &str,
        documents: &[DocumentResultView],
        insight_type: InsightType,
        priority: bool,
    ) -> GeneratedInsights {
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let (summaries, direct_answer, related_questions) = tokio::join!(
            self.maybe_run(
                insight_type.wants_document_summaries(),
                self.document_summaries(query, documents, priority, timeout)
            ),
            self.maybe_run(
                insight_type.wants_direct_answer(),
                self.direct_answer(query, documents, priority, timeout)
            ),
            self.maybe_run(
                insight_type.wants_related_questions(),
                self.related_questions(query, documents, priority, timeout)
            ),
        );

        let mut breakdown_ms = HashMap::new();
        let mut out = GeneratedInsights::default();

        if let Some((value, ms)) = summaries {
            breakdown_ms.insert("document_summaries".to_string(), ms);
            out.document_summaries = value;
        }
        if let Some((value, ms)) = direct_answer {
            breakdown_ms.insert("direct_answer".to_string(), ms);
            out.direct_answer = value;
        }
        if let Some((value, ms)) = related_questions {
            breakdown_ms.insert("related_questions".to_string(), ms);
            out.related_questions = value;
        }

        out.breakdown_ms = breakdown_ms;
        out
    }

    /// Times and conditionally runs a task; `None` means the caller never
    /// requested this kind, so it is excluded from the breakdown entirely.
    async fn maybe_run<T>(&self, wanted: bool, fut: impl std::future::Future<Output = T>) -> Option<(T, u64)> {
        if !wanted {
            return None;
        }
        let start = Instant::now();
        let value = fut.await;
        Some((value, start.elapsed().as_millis() as u64))
    }

    async fn document_summaries(
        &self,
        query: &str,
        documents: &[DocumentResultView],
        priority: bool,
        timeout: Duration,
    ) -> Option<Vec<DocumentSummary>> {
        let calls = documents.iter().map(|doc| async move {
            let messages = PromptAssembler::document_summary_prompt(query, doc);
            let result = self
                .call_llm(messages, self.config.summary_temperature, priority, timeout)
                .await;

            match result.and_then(|raw| parse_summary(&raw)) {
                Ok(parsed) => DocumentSummary {
                    document_id: doc.document_id.clone(),
                    document_title: doc.document_title.clone(),
                    document_type: doc.document_type.clone(),
                    relevance_summary: parsed.relevance_summary,
                    confidence_score: parsed.confidence_score.clamp(0.0, 1.0),
                },
                Err(e) => {
                    warn!(document_id = %doc.document_id, error = %e, "document summary degraded to fallback");
                    DocumentSummary {
                        document_id: doc.document_id.clone(),
                        document_title: doc.document_title.clone(),
                        document_type: doc.document_type.clone(),
                        relevance_summary: "Summary unavailable.".to_string(),
                        confidence_score: 0.0,
                    }
                }
            }
        });

        Some(join_all(calls).await)
    }

    async fn direct_answer(
        &self,
        query: &str,
        documents: &[DocumentResultView],
        priority: bool,
        timeout: Duration,
    ) -> Option<DirectAnswer> {
        let messages = PromptAssembler::direct_answer_prompt(query, documents);
        let result = self
            .call_llm(messages, self.config.generation_temperature, priority, timeout)
            .await
            .and_then(|raw| parse_direct_answer(&raw));

        match result {
            Ok(parsed) => Some(DirectAnswer {
                answer_markdown: parsed.answer_markdown,
                confidence: parsed.confidence.clamp(0.0, 1.0),
                source_document_titles: parsed.source_document_titles,
                source_document_ids: Vec::new(), // resolved by the citation resolver downstream
            }),
            Err(e) => {
                warn!(error = %e, "direct answer degraded to fallback");
                Some(DirectAnswer {
                    answer_markdown: "An answer could not be generated for this query.".to_string(),
                    confidence: 0.0,
                    source_document_titles: Vec::new(),
                    source_document_ids: Vec::new(),
                })
            }
        }
    }

    async fn related_questions(
        &self,
        query: &str,
        documents: &[DocumentResultView],
        priority: bool,
        timeout: Duration,
    ) -> Option<Vec<RelatedQuestion>> {
        let messages = PromptAssembler::related_questions_prompt(query, documents);
        let result = self
            .call_llm(messages, self.config.generation_temperature, priority, timeout)
            .await
            .and_then(|raw| parse_related_questions(&raw));

        match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "related questions degraded to empty list");
                Some(Vec::new())
            }
        }
    }

    async fn call_llm(
        &self,
        messages: Vec<crate::ports::llm::ChatMessage>,
        temperature: f32,
        priority: bool,
        timeout: Duration,
    ) -> Result<String, String> {
        let (_permit, _wait) = Limiters::acquire_timed(self.limiters.llm.clone(), self.limiters.acquire_timeout, "llm")
            .await
            .map_err(|e| e.to_string())?;

        let request = ChatJsonRequest {
            messages,
            model: self.config.model.clone(),
            temperature,
            priority,
            timeout,
        };

        self.llm.chat_json(request).await.map_err(|e| match e {
            LlmCallError::Timeout(d) => format!("llm call timed out after {d:?}"),
            LlmCallError::Failed { status, body } => format!("llm call failed ({status}): {body}"),
        })
    }
}

#[derive(Deserialize)]
struct SummaryPayload {
    relevance_summary: String,
    confidence_score: f32,
}

fn parse_summary(raw: &str) -> Result<SummaryPayload, String> {
    let json = extract_first_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

#[derive(Deserialize)]
struct DirectAnswerPayload {
    answer_markdown: String,
    confidence: f32,
    source_document_titles: Vec<String>,
}

fn parse_direct_answer(raw: &str) -> Result<DirectAnswerPayload, String> {
    let json = extract_first_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

#[derive(Deserialize)]
struct RelatedQuestionsPayload {
    questions: Vec<RelatedQuestionPayload>,
}

#[derive(Deserialize)]
struct RelatedQuestionPayload {
    question: String,
    relevance: f32,
    category: QuestionCategory,
}

fn parse_related_questions(raw: &str) -> Result<Vec<RelatedQuestion>, String> {
    let json = extract_first_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    let payload: RelatedQuestionsPayload = serde_json::from_str(json).map_err(|e| e.to_string())?;

    Ok(payload
        .questions
        .into_iter()
        .map(|q| RelatedQuestion {
            question: q.question,
            relevance: q.relevance.clamp(0.5, 0.95),
            category: q.category,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LimitsConfig;
    use crate::models::EmittedChunk;
    use crate::ports::llm::ChatMessage;

    struct StubLlmClient {
        responses: HashMap<String, String>,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubLlmClient {
        async fn chat_json(&self, request: ChatJsonRequest) -> Result<String, LlmCallError> {
            let first_user = request
                .messages
                .iter()
                .find(|m| m.role == "user")
                .map(|m| m.content.clone())
                .unwrap_or_default();

            for (needle, response) in &self.responses {
                if first_user.contains(needle) {
                    return Ok(response.clone());
                }
            }
            Ok("{}".to_string())
        }
    }

    fn doc(id: &str, title: &str, text: &str) -> DocumentResultView {
        DocumentResultView {
            document_id: id.to_string(),
            document_title: title.to_string(),
            document_type: "article".to_string(),
            chunks: vec![EmittedChunk {
                chunk_id: format!("{id}-c1"),
                document_id: id.to_string(),
                chunk_text: text.to_string(),
                order: 0,
                rrf_score: 0.5,
                debug: None,
            }],
            best_rrf_score: 0.5,
            best_raw_similarity: 0.8,
            relevance_density: 1.0,
        }
    }

    fn llm_config() -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost".to_string(),
            model: "test-model".to_string(),
            timeout_ms: 5_000,
            max_tokens: 512,
            summary_temperature: 0.2,
            generation_temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn generates_all_three_kinds_concurrently() {
        let mut responses = HashMap::new();
        responses.insert(
            "Intro to ML".to_string(),
            r#"{"relevance_summary": "Covers the basics.", "confidence_score": 0.9}"#.to_string(),
        );
        responses.insert(
            "User query: what is ML?".to_string(),
            r#"{"answer_markdown": "ML is [Source: Intro to ML].", "confidence": 0.8, "source_document_titles": ["Intro to ML"]}"#
                .to_string(),
        );

        let llm = Arc::new(StubLlmClient { responses });
        let limiters = Arc::new(Limiters::new(&LimitsConfig::default()));
        let orchestrator = InsightOrchestrator::new(llm, limiters, llm_config());

        let documents = vec![doc("doc-1", "Intro to ML", "Machine learning is a field of AI.")];
        let result = orchestrator.generate("what is ML?", &documents, InsightType::DocumentSummaries, false).await;

        assert!(result.document_summaries.is_some());
        assert!(result.direct_answer.is_none());
        assert!(result.related_questions.is_none());
        assert_eq!(result.breakdown_ms.len(), 1);

        let summaries = result.document_summaries.unwrap();
        assert_eq!(summaries[0].relevance_summary, "Covers the basics.");
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_fallback() {
        let llm = Arc::new(StubLlmClient { responses: HashMap::new() });
        let limiters = Arc::new(Limiters::new(&LimitsConfig::default()));
        let orchestrator = InsightOrchestrator::new(llm, limiters, llm_config());

        let documents = vec![doc("doc-1", "Intro to ML", "text")];
        let result = orchestrator.generate("q", &documents, InsightType::DirectAnswer, false).await;

        let answer = result.direct_answer.unwrap();
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.answer_markdown, "An answer could not be generated for this query.");
    }
}
