mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod projects;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{InferenceProvider, LlmClient};
use crate::matching::assessment::Assessor;
use crate::matching::insights::InsightGenerator;
use crate::matching::ranking::{MatchingService, ScoringLimits};
use crate::matching::scorer::LlmCompatibilityScorer;
use crate::matching::store::PgMarketplaceStore;
use crate::projects::service::ProjectService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nexus API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgMarketplaceStore::new(db));

    // Initialize LLM client
    let llm: Arc<dyn InferenceProvider> = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let matching = MatchingService::new(
        store.clone(),
        Arc::new(LlmCompatibilityScorer::new(llm.clone())),
        ScoringLimits {
            per_request: config.match_max_in_flight,
            total: config.match_max_total_in_flight,
        },
        Duration::from_secs(config.match_timeout_secs),
    );
    info!(
        "Matching: max {} scoring calls in flight per request, {} overall, {}s deadline",
        config.match_max_in_flight, config.match_max_total_in_flight, config.match_timeout_secs
    );

    let projects = ProjectService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(InsightGenerator::new(llm.clone())),
    );

    // Build app state
    let state = AppState {
        matching: Arc::new(matching),
        projects: Arc::new(projects),
        assessor: Arc::new(Assessor::new(llm)),
        candidates: store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
