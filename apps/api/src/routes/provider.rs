//! Pass-through views of the model provider: model listing and key status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::errors::{AppError, RouteError};
use crate::llm_client::catalog::is_listed;
use crate::llm_client::ProviderModel;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Vec<ProviderModel>,
    pub message: &'static str,
}

/// GET /api/openrouter/models
///
/// Free-tier models plus anything either catalog names. Upstream failures are
/// reported as a 500, like every other route.
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelsResponse>, RouteError> {
    let models = state
        .gateway
        .list_models()
        .await
        .map_err(|e| AppError::from(e).during("Failed to fetch models"))?;

    let total = models.len();
    let models: Vec<ProviderModel> = models.into_iter().filter(|m| is_listed(&m.id)).collect();
    info!("Listing {} of {} provider models", models.len(), total);

    Ok(Json(ModelsResponse {
        success: true,
        models,
        message: "Available free models retrieved successfully",
    }))
}

/// GET /api/openrouter/status
///
/// Always 200; the body says whether the provider accepted the key.
pub async fn handle_key_status(State(state): State<AppState>) -> Json<Value> {
    match state.gateway.key_status().await {
        Ok(data) => Json(json!({ "success": true, "data": data })),
        Err(e) => {
            error!("API key status check failed: {e}");
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}
