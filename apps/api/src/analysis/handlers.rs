//! Axum route handler for the upload-and-analyze endpoint.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::analyzer::{analyze_resume, AnalysisRequest, AnalysisResult};
use crate::errors::{AppError, RouteError};
use crate::ingest::extract::ExtractError;
use crate::ingest::upload::UploadedDocument;
use crate::llm_client::catalog::UseCase;
use crate::state::AppState;

const FAILURE_MESSAGE: &str = "Failed to analyze resume";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub analysis: AnalysisResult,
    pub parsed_text: String,
    pub model: String,
    pub timestamp: String,
}

struct ResumeFile {
    name: String,
    mime_type: String,
    bytes: bytes::Bytes,
}

#[derive(Default)]
struct UploadForm {
    resume: Option<ResumeFile>,
    job_description: Option<String>,
    model: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    let file_name = field.file_name().unwrap_or("resume").to_string();
                    let mime_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read uploaded file: {e}"))
                    })?;
                    form.resume = Some(ResumeFile {
                        name: file_name,
                        mime_type,
                        bytes,
                    });
                }
                "jobDescription" | "model" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Invalid form field {name}: {e}"))
                    })?;
                    if name == "model" {
                        form.model = Some(value);
                    } else {
                        form.job_description = Some(value);
                    }
                }
                _ => {} // unknown fields are ignored
            }
        }

        Ok(form)
    }
}

/// POST /api/upload
///
/// Multipart form: `resume` (file), `jobDescription`, optional `model`.
/// The uploaded file lives only for the duration of this request.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, RouteError> {
    let form = UploadForm::read(multipart.map_err(AppError::from)?).await?;
    let model_key = UseCase::Analysis.requested_key(form.model.as_deref());

    let Some(resume) = form.resume else {
        return Err(AppError::Validation("No file uploaded".to_string()).into());
    };
    let job_description = form
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No job description provided".to_string()))?;

    let document = UploadedDocument::spool(
        &state.config.upload_dir,
        resume.name,
        resume.mime_type,
        resume.bytes,
    )
    .await
    .map_err(|e| AppError::Internal(e).during(FAILURE_MESSAGE).with_model(&model_key))?;

    info!(
        "File received: upload={} name={} mimetype={} size={}",
        document.id, document.original_name, document.mime_type, document.size
    );

    let fail = |e: AppError| e.during(FAILURE_MESSAGE).with_model(&model_key);

    let text = document
        .extract_text()
        .await
        .map_err(|e| fail(e.into()))?;
    if text.trim().is_empty() {
        return Err(fail(ExtractError::NoText.into()));
    }

    let analysis = analyze_resume(
        state.gateway.as_ref(),
        AnalysisRequest {
            resume_text: &text,
            job_description: &job_description,
            model_key: &model_key,
        },
    )
    .await
    .map_err(fail)?;

    Ok(Json(UploadResponse {
        message: "Resume analyzed successfully",
        analysis,
        parsed_text: text,
        model: model_key,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
