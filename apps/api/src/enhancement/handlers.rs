//! Axum route handlers for the resume-enhancement API.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enhancement::enhancer::{enhance_resume, generate_section, ResumeEnhancement};
use crate::enhancement::prompts::SectionType;
use crate::errors::{AppError, RouteError};
use crate::llm_client::catalog::UseCase;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields are optional so that a missing one is a 400, not a rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub success: bool,
    pub message: &'static str,
    pub enhancement: ResumeEnhancement,
    pub model: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSectionRequest {
    pub section_type: Option<String>,
    pub job_description: Option<String>,
    pub user_info: Option<Value>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSectionResponse {
    pub success: bool,
    pub message: &'static str,
    pub section_type: SectionType,
    pub content: String,
    pub model: String,
    pub timestamp: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resume-enhancement/enhance
pub async fn handle_enhance(
    State(state): State<AppState>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Json<EnhanceResponse>, RouteError> {
    let Json(request) = payload.map_err(AppError::from)?;
    let (Some(resume_text), Some(job_description)) = (
        non_blank(request.resume_text),
        non_blank(request.job_description),
    ) else {
        return Err(AppError::Validation(
            "Resume text and job description are required".to_string(),
        )
        .into());
    };

    let model = UseCase::Enhancement.requested_key(request.model.as_deref());

    let enhancement = enhance_resume(
        state.gateway.as_ref(),
        &resume_text,
        &job_description,
        &model,
    )
    .await
    .map_err(|e| e.during("Failed to enhance resume"))?;

    Ok(Json(EnhanceResponse {
        success: true,
        message: "Resume enhanced successfully",
        enhancement,
        model,
        timestamp: now(),
    }))
}

/// POST /api/resume-enhancement/generate-section
pub async fn handle_generate_section(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSectionRequest>, JsonRejection>,
) -> Result<Json<GenerateSectionResponse>, RouteError> {
    let Json(request) = payload.map_err(AppError::from)?;
    let (Some(section_type), Some(job_description)) = (
        non_blank(request.section_type),
        non_blank(request.job_description),
    ) else {
        return Err(AppError::Validation(
            "Section type and job description are required".to_string(),
        )
        .into());
    };

    let section = SectionType::parse(&section_type).ok_or_else(|| {
        AppError::Validation(
            "Invalid section type. Must be: summary, experience, skills, or education".to_string(),
        )
    })?;

    let model = UseCase::Enhancement.requested_key(request.model.as_deref());

    let content = generate_section(
        state.gateway.as_ref(),
        section,
        &job_description,
        request.user_info.as_ref(),
        &model,
    )
    .await
    .map_err(|e| e.during("Failed to generate resume section"))?;

    Ok(Json(GenerateSectionResponse {
        success: true,
        message: "Resume section generated successfully",
        section_type: section,
        content,
        model,
        timestamp: now(),
    }))
}
