use anyhow::Result;
use insight_engine::adapters::flume_history::HistorySinkConfig;
use insight_engine::adapters::pool::DbPool;
use insight_engine::adapters::{
    CachedQueryEmbedder, DashMapInsightCache, FlumeHistorySink, HttpLlmClient, HttpQueryEmbedder,
    JwtIdentityVerifier, PostgresDenseRetriever, PostgresLexicalRetriever,
};
use insight_engine::config::Settings;
use insight_engine::insight::{InsightOrchestrator, InsightPipeline};
use insight_engine::logging;
use insight_engine::ports::IdentityVerifier;
use insight_engine::retrieval::RetrievalPipeline;
use insight_engine::router::build_router;
use insight_engine::security::{CustomHeaderValidator, IpWhitelist};
use insight_engine::state::AppState;
use insight_engine::utils::Limiters;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logger()?;
    info!("starting insight engine");

    let settings = Settings::load()?;
    info!("configuration loaded");

    let db_pool = DbPool::new(&settings.database).await?;
    info!("database connection established");

    let limiters = Arc::new(Limiters::new(&settings.limits));

    let embedder = Arc::new(CachedQueryEmbedder::new(HttpQueryEmbedder::new(settings.embedding.clone())));
    let dense = Arc::new(PostgresDenseRetriever::new(db_pool.clone()));
    let lexical = Arc::new(PostgresLexicalRetriever::new(db_pool.clone()));

    let retrieval_pipeline = Arc::new(RetrievalPipeline::new(
        embedder,
        dense,
        lexical,
        limiters.clone(),
        settings.retrieval.clone(),
        Duration::from_secs(settings.embedding.timeout_seconds),
    ));

    let llm = Arc::new(HttpLlmClient::new(&settings.llm));
    let orchestrator = InsightOrchestrator::new(llm, limiters.clone(), settings.llm.clone());
    let cache = Arc::new(DashMapInsightCache::new());
    let history = Arc::new(FlumeHistorySink::new(db_pool.clone(), HistorySinkConfig::default()));
    let insight_pipeline = Arc::new(InsightPipeline::new(orchestrator, cache, history, settings.cache.clone()));

    let identity_verifier: Arc<dyn IdentityVerifier> =
        Arc::new(JwtIdentityVerifier::new(&settings.identity.jwt_secret));

    let ip_whitelist = Arc::new(IpWhitelist::new(settings.security.allowed_ips.clone())?);

    let header_validator = {
        let cfg = settings
            .security
            .custom_headers
            .clone()
            .expect("security.custom_headers must be configured");
        let signature_secret = if cfg.signature_secret.is_empty() { None } else { Some(cfg.signature_secret) };
        Arc::new(CustomHeaderValidator::new(cfg.app_id, cfg.api_key, signature_secret, cfg.timestamp_tolerance_seconds))
    };

    let app_state = AppState {
        retrieval_pipeline,
        insight_pipeline,
        identity_verifier: identity_verifier.clone(),
        settings: settings.clone(),
    };

    let app = build_router(app_state, identity_verifier, ip_whitelist, header_validator);

    let addr = SocketAddr::from((settings.server.host.parse::<std::net::IpAddr>()?, settings.server.port));
    info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
