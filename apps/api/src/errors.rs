use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::ingest::extract::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Malformed JSON bodies, wrong field types and a missing JSON content type
/// are all client errors with the usual JSON body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(format!("Invalid upload: {}", rejection.body_text()))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Coarse, client-facing description used when the route gives none.
    fn summary(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::Extraction(_) => "Failed to read the uploaded file",
            AppError::Llm(LlmError::MissingApiKey) => "The AI provider is not configured",
            AppError::Llm(_) => "An AI processing error occurred",
            AppError::Internal(_) => "An internal server error occurred",
        }
    }

    /// Client-visible error detail. Internal errors stay opaque.
    fn detail(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Llm(LlmError::Http(e)) if e.is_timeout() => {
                "The AI provider did not respond in time".to_string()
            }
            AppError::Llm(LlmError::Http(e)) if e.is_decode() => {
                "The AI provider returned an unreadable response".to_string()
            }
            AppError::Llm(LlmError::Http(_)) => "Could not reach the AI provider".to_string(),
            other => other.to_string(),
        }
    }

    /// Attaches the route's own failure message (e.g. "Failed to enhance resume").
    pub fn during(self, message: &'static str) -> RouteError {
        RouteError {
            error: self,
            message: Some(message),
            model: None,
        }
    }
}

/// An `AppError` plus the route-specific context that goes into the JSON body.
#[derive(Debug)]
pub struct RouteError {
    pub error: AppError,
    message: Option<&'static str>,
    model: Option<String>,
}

impl RouteError {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl From<AppError> for RouteError {
    fn from(error: AppError) -> Self {
        RouteError {
            error,
            message: None,
            model: None,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));

        match &self.error {
            // 400s carry only the message, which names the missing field
            AppError::Validation(msg) => {
                body.insert("message".into(), json!(msg));
            }
            other => {
                match other {
                    AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
                    AppError::Llm(LlmError::MalformedResponse { fragment }) => {
                        tracing::error!("Malformed model response: {fragment}")
                    }
                    e => tracing::error!("{}: {e}", self.message.unwrap_or(e.summary())),
                }
                body.insert(
                    "message".into(),
                    json!(self.message.unwrap_or(other.summary())),
                );
                body.insert("error".into(), json!(other.detail()));
            }
        }

        if let Some(model) = self.model {
            body.insert("model".into(), json!(model));
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        RouteError::from(self).into_response()
    }
}
