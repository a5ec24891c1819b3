use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse { status: "healthy".to_string(), version: env!("CARGO_PKG_VERSION").to_string() }),
    )
}

/// Readiness is intentionally shallow: the core has no database of its own
/// (spec §1 — storage is an external collaborator), so there is nothing
/// further to probe here beyond process liveness.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
