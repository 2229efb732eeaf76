mod analysis;
mod config;
mod enhancement;
mod errors;
mod ingest;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::OpenRouterClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values, not on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Scratch space for uploads; each file is removed when its request ends
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;
    info!("Upload dir: {}", config.upload_dir.display());

    // Initialize model gateway
    let gateway = OpenRouterClient::new(&config)?;
    if gateway.has_api_key() {
        info!("OpenRouter API key configured");
    } else {
        warn!("OPENROUTER_API_KEY is not set; model-backed routes will fail until it is");
    }
    info!(
        "Model gateway initialized (base url: {}, timeout: {}s)",
        config.openrouter_base_url, config.request_timeout_secs
    );

    let cors_origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("invalid CORS_ORIGIN {:?}", config.cors_origin))?;

    // Build app state
    let state = AppState {
        gateway: Arc::new(gateway),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(cors_origin)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
