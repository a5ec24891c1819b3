use crate::errors::ApiError;
use crate::security::{CustomHeaderValidator, IpWhitelist};
use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Runs ahead of every protected route: IP allowlist, then custom header
/// validation. Bearer/identity verification happens separately in the
/// handler layer (spec §6) since it needs caller-scoped state.
pub async fn security_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = addr.ip();

    let ip_whitelist = request
        .extensions()
        .get::<Arc<IpWhitelist>>()
        .ok_or_else(|| ApiError::InternalError("IP allowlist not configured".to_string()))?
        .clone();

    let header_validator = request
        .extensions()
        .get::<Arc<CustomHeaderValidator>>()
        .ok_or_else(|| ApiError::InternalError("header validator not configured".to_string()))?
        .clone();

    if !ip_whitelist.is_allowed(ip).await {
        return Err(ApiError::Unauthorized(format!("access denied from IP {ip}")));
    }

    let validated = header_validator.validate(request.headers())?;
    debug!(app_id = %validated.app_id, "request passed security middleware");

    Ok(next.run(request).await)
}
