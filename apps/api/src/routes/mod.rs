pub mod health;
pub mod provider;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::enhancement::handlers as enhancement;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Upload + analysis
        .route("/api/upload", post(analysis::handle_upload))
        // Enhancement
        .route(
            "/api/resume-enhancement/enhance",
            post(enhancement::handle_enhance),
        )
        .route(
            "/api/resume-enhancement/generate-section",
            post(enhancement::handle_generate_section),
        )
        // Provider pass-through
        .route("/api/openrouter/models", get(provider::handle_list_models))
        .route("/api/openrouter/status", get(provider::handle_key_status))
        .layer(body_limit)
        .with_state(state)
}
