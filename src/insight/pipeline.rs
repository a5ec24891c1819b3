use crate::config::settings::CacheConfig;
use crate::errors::ApiError;
use crate::insight::cache_key;
use crate::insight::citations;
use crate::insight::orchestrator::InsightOrchestrator;
use crate::models::{InsightBundle, InsightPerformanceMetrics, InsightRequest, InsightResponse};
use crate::ports::{HistorySink, InsightCacheStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Ties together C12 (cache), C8 (orchestrator), and C11 (citations) into the
/// insights() operation (spec §4.13).
pub struct InsightPipeline {
    orchestrator: InsightOrchestrator,
    cache: Arc<dyn InsightCacheStore>,
    history: Arc<dyn HistorySink>,
    cache_config: CacheConfig,
}

impl InsightPipeline {
    pub fn new(
        orchestrator: InsightOrchestrator,
        cache: Arc<dyn InsightCacheStore>,
        history: Arc<dyn HistorySink>,
        cache_config: CacheConfig,
    ) -> Self {
        Self { orchestrator, cache, history, cache_config }
    }

    pub async fn insights(
        &self,
        request: &InsightRequest,
        caller_id: Option<&str>,
    ) -> Result<InsightResponse, ApiError> {
        if request.documents.is_empty() {
            return Err(ApiError::InvalidArgument("documents must be non-empty".to_string()));
        }

        let document_ids: Vec<String> = request.documents.iter().map(|d| d.document_id.clone()).collect();
        let key = request.cache_key.clone().unwrap_or_else(|| {
            cache_key::derive(request.insight_type.cache_prefix(), &request.user_query, &document_ids)
        });

        let now = Utc::now();
        match self.cache.get(&key, now).await {
            Ok(Some(bundle)) => {
                return Ok(InsightResponse {
                    document_summaries: bundle.document_summaries,
                    direct_answer: bundle.direct_answer,
                    related_questions: bundle.related_questions,
                    cache_key: bundle.cache_key,
                    generated_at: bundle.generated_at,
                    cached: true,
                    performance_metrics: InsightPerformanceMetrics::default(),
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache lookup failed, proceeding as a miss"),
        }

        let total_start = Instant::now();
        let generated = self
            .orchestrator
            .generate(&request.user_query, &request.documents, request.insight_type, request.priority)
            .await;

        let direct_answer = generated.direct_answer.map(|mut answer| {
            answer.source_document_ids = citations::resolve(&answer.answer_markdown, &request.documents);
            answer
        });

        let bundle = InsightBundle {
            document_summaries: generated.document_summaries,
            direct_answer,
            related_questions: generated.related_questions,
            cache_key: key.clone(),
            generated_at: now,
        };

        if let Err(e) = self.cache.put(&key, bundle.clone(), self.cache_config.ttl_seconds).await {
            warn!(error = %e, "failed to store insight bundle in cache");
        }

        if let Some(summary) = bundle
            .direct_answer
            .as_ref()
            .map(|a| a.answer_markdown.clone())
            .or_else(|| bundle.document_summaries.as_ref().and_then(|s| s.first()).map(|s| s.relevance_summary.clone()))
        {
            if let Err(e) = self.history.append(caller_id, &request.user_query, &summary).await {
                warn!(error = %e, "best-effort history append failed");
            }
        }

        let total_ms = total_start.elapsed().as_millis() as u64;

        Ok(InsightResponse {
            document_summaries: bundle.document_summaries,
            direct_answer: bundle.direct_answer,
            related_questions: bundle.related_questions,
            cache_key: bundle.cache_key,
            generated_at: bundle.generated_at,
            cached: false,
            performance_metrics: InsightPerformanceMetrics { breakdown_ms: generated.breakdown_ms, total_ms },
        })
    }
}
