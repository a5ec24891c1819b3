use crate::errors::ApiError;
use crate::models::CallerIdentity;
use crate::ports::IdentityVerifier;
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Resolved identity for the current request, generalized from the reference
/// implementation's `JwtManager`/`AuthState` into the abstract identity hook
/// of spec §6: `verify(bearer) -> caller_id | null | internal`.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub CallerIdentity);

/// Extracts the bearer token (if any) and resolves it through the configured
/// `IdentityVerifier`. A request with no `Authorization` header is treated as
/// an internal/service caller (spec §6: "Internal callers ... bypass
/// caller-id binding and operate with caller_id = null"). A header that fails
/// verification is rejected outright rather than silently downgraded.
pub async fn identity_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let verifier = request
        .extensions()
        .get::<Arc<dyn IdentityVerifier>>()
        .ok_or_else(|| ApiError::InternalError("identity verifier not configured".to_string()))?
        .clone();

    let bearer = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let identity = match bearer {
        None => CallerIdentity::Internal,
        Some(token) => match verifier.verify(token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => return Err(ApiError::Unauthorized("bearer token failed verification".to_string())),
            Err(e) => return Err(ApiError::Unauthorized(format!("identity verification error: {e}"))),
        },
    };

    debug!(?identity, "resolved caller identity");
    request.extensions_mut().insert(AuthenticatedCaller(identity));

    Ok(next.run(request).await)
}
