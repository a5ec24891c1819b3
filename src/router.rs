use crate::auth::identity_middleware;
use crate::handlers;
use crate::ports::IdentityVerifier;
use crate::security::{self, CustomHeaderValidator, IpWhitelist};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Builds the full HTTP surface (spec §2.4): public health routes plus the
/// two protected boundary operations (spec §4.13), security middleware
/// stacked ahead of identity resolution.
pub fn build_router(
    state: AppState,
    identity_verifier: Arc<dyn IdentityVerifier>,
    ip_whitelist: Arc<IpWhitelist>,
    header_validator: Arc<CustomHeaderValidator>,
) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let protected_routes = Router::new()
        .route("/v1/retrieve", post(handlers::retrieve::retrieve_handler))
        .route("/v1/insights", post(handlers::insights::insights_handler))
        .layer(middleware::from_fn(identity_middleware))
        .layer(middleware::from_fn(security::middleware::security_middleware))
        .layer(Extension(header_validator))
        .layer(Extension(ip_whitelist))
        .layer(Extension(identity_verifier))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
