//! Résumé enhancement: full rewrite against a job description, and
//! single-section generation.
//!
//! The rewrite reply is read leniently. Missing or `null` fields take their
//! defaults, scalars in text fields are kept as text, and `changes` entries
//! that are not objects are dropped.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::enhancement::prompts::{build_enhancement_prompt, build_section_prompt, SectionType};
use crate::errors::AppError;
use crate::llm_client::catalog::UseCase;
use crate::llm_client::json::{extract_json, score_value, text_or_empty};
use crate::llm_client::{CompletionProfile, CompletionRequest, LlmError, ModelGateway};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub section: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub original: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub improved: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeEnhancement {
    pub original_text: String,
    pub enhanced_text: String,
    pub changes: Vec<Change>,
    pub summary: String,
    /// Requested as a 0–100 number; passed through unchanged, 0 when missing.
    pub ats_score: Value,
}

/// Shape of the model's JSON. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhancementReply {
    #[serde(default, deserialize_with = "text_or_empty")]
    enhanced_text: String,
    #[serde(default, deserialize_with = "lenient_changes")]
    changes: Vec<Change>,
    #[serde(default, deserialize_with = "text_or_empty")]
    summary: String,
    #[serde(default)]
    ats_score: Option<Value>,
}

fn lenient_changes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Change>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!("Ignoring non-list changes from model: {other}");
            Vec::new()
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(change) => Some(change),
            Err(e) => {
                warn!("Dropping unreadable change entry: {e}");
                None
            }
        })
        .collect())
}

pub async fn enhance_resume(
    gateway: &dyn ModelGateway,
    resume_text: &str,
    job_description: &str,
    model_key: &str,
) -> Result<ResumeEnhancement, AppError> {
    if resume_text.trim().is_empty() || job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text and job description are required".to_string(),
        ));
    }

    let model = UseCase::Enhancement.resolve(model_key);
    info!("Making resume enhancement request with model {model}");

    let prompt = build_enhancement_prompt(resume_text, job_description);
    let completion = gateway
        .complete(CompletionRequest {
            prompt: &prompt,
            model: model.provider_id,
            profile: CompletionProfile::ENHANCEMENT,
        })
        .await?;

    let value = extract_json(&completion.text)?;
    let reply: EnhancementReply = serde_json::from_value(value.clone()).map_err(|e| {
        warn!("Model JSON does not fit the enhancement schema: {e}");
        LlmError::MalformedResponse {
            fragment: value.to_string(),
        }
    })?;

    let ats_score = reply.ats_score.unwrap_or_else(|| json!(0));
    match score_value(&ats_score) {
        Some(score) if !(0.0..=100.0).contains(&score) => {
            warn!("Model {} returned out-of-range atsScore {}", model.key, score);
        }
        None => warn!("Model {} returned non-numeric atsScore {}", model.key, ats_score),
        _ => {}
    }

    Ok(ResumeEnhancement {
        original_text: resume_text.to_string(),
        enhanced_text: reply.enhanced_text,
        changes: reply.changes,
        summary: reply.summary,
        ats_score,
    })
}

/// Generates one résumé section. The completion text is returned as-is,
/// without JSON parsing.
pub async fn generate_section(
    gateway: &dyn ModelGateway,
    section: SectionType,
    job_description: &str,
    user_info: Option<&Value>,
    model_key: &str,
) -> Result<String, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Section type and job description are required".to_string(),
        ));
    }

    let model = UseCase::Enhancement.resolve(model_key);
    info!("Generating {} section with model {model}", section.as_str());

    let prompt = build_section_prompt(section, job_description, user_info);
    let completion = gateway
        .complete(CompletionRequest {
            prompt: &prompt,
            model: model.provider_id,
            profile: CompletionProfile::SECTION,
        })
        .await?;

    Ok(completion.text)
}
