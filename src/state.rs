use crate::config::Settings;
use crate::insight::InsightPipeline;
use crate::ports::IdentityVerifier;
use crate::retrieval::RetrievalPipeline;
use std::sync::Arc;

/// Application state shared across handlers, generalized from the reference
/// implementation's `state.rs` into the two boundary operations of spec §4.13.
#[derive(Clone)]
pub struct AppState {
    pub retrieval_pipeline: Arc<RetrievalPipeline>,
    pub insight_pipeline: Arc<InsightPipeline>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub settings: Settings,
}
