mod config;
mod db;
mod errors;
mod export;
mod extract;
mod llm_client;
mod models;
mod optimize;
mod persistence;
mod resilience;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, ModelInvoker};
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

    info!("Starting Resume Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url)?;

    // Initialize model client and invoker
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; optimization requests will fail as misconfigured");
    }
    let provider = GeminiClient::new(config.gemini_api_base.clone(), config.gemini_api_key.clone())?;
    let invoker = ModelInvoker::new(Arc::new(provider), config.gemini_models.clone());
    info!("Model invoker initialized (candidates: {})", invoker.models().join(", "));

    // Build app state
    let state = AppState {
        db,
        invoker: Arc::new(invoker),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web client's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
