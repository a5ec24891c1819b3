use crate::auth::AuthenticatedCaller;
use crate::errors::ApiError;
use crate::models::{RetrieveRequest, RetrieveResponse};
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use tracing::info;

/// `retrieve()` — spec §4.13, §6. C1 → C4 → C5 → (C6) → C7.
pub async fn retrieve_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedCaller(identity)): Extension<AuthenticatedCaller>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    info!(query = %request.user_query, "retrieve request received");

    let response = state.retrieval_pipeline.retrieve(&request, identity.caller_id()).await?;

    Ok(Json(response))
}
