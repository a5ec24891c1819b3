use crate::auth::AuthenticatedCaller;
use crate::errors::ApiError;
use crate::models::{InsightRequest, InsightResponse};
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use tracing::info;

/// `insights()` — spec §4.13, §6. C12(lookup) → (C8 → C9/C10 ×3) → C11 → C12(store).
pub async fn insights_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedCaller(identity)): Extension<AuthenticatedCaller>,
    Json(request): Json<InsightRequest>,
) -> Result<Json<InsightResponse>, ApiError> {
    info!(query = %request.user_query, insight_type = ?request.insight_type, "insights request received");

    let response = state.insight_pipeline.insights(&request, identity.caller_id()).await?;

    Ok(Json(response))
}
