use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Model gateway. Default: `OpenRouterClient`; tests swap in a stub.
    pub gateway: Arc<dyn ModelGateway>,
    pub config: Config,
}
