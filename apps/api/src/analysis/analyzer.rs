//! Résumé analysis: scores a résumé against a job description via the model.
//!
//! Flow: validate → build prompt → resolve model → complete → extract JSON →
//! assemble [`AnalysisResult`]. The model's JSON is not trusted to match the
//! requested schema: missing or `null` list fields become empty, and every
//! value the model returned is otherwise passed through as-is, whatever its
//! type. Only a reply that is not a JSON object is malformed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::analysis::prompts::build_analysis_prompt;
use crate::errors::AppError;
use crate::llm_client::catalog::UseCase;
use crate::llm_client::json::{empty_list, extract_json, list_or_empty, score_value};
use crate::llm_client::{CompletionProfile, CompletionRequest, LlmError, ModelGateway, Usage};

/// The model's verdict as it appears in the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Requested as a 0–100 number; passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<Value>,
    /// The list fields are requested as string arrays.
    #[serde(default = "empty_list", deserialize_with = "list_or_empty")]
    pub missing_keywords: Value,
    #[serde(default = "empty_list", deserialize_with = "list_or_empty")]
    pub suggestions: Value,
    #[serde(default = "empty_list", deserialize_with = "list_or_empty")]
    pub strengths: Value,
    #[serde(default = "empty_list", deserialize_with = "list_or_empty")]
    pub weaknesses: Value,
    /// Anything else the model returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub report: AnalysisReport,
    /// The catalog key the caller asked for.
    pub model: String,
    pub usage: Option<Usage>,
}

pub struct AnalysisRequest<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub model_key: &'a str,
}

pub async fn analyze_resume(
    gateway: &dyn ModelGateway,
    request: AnalysisRequest<'_>,
) -> Result<AnalysisResult, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("Resume text is required".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation("Job description is required".to_string()));
    }

    let prompt = build_analysis_prompt(request.resume_text, request.job_description);
    let model = UseCase::Analysis.resolve(request.model_key);
    info!("Analyzing resume with model {model}");

    let completion = gateway
        .complete(CompletionRequest {
            prompt: &prompt,
            model: model.provider_id,
            profile: CompletionProfile::ANALYSIS,
        })
        .await?;

    let mut report = parse_report(&completion.text)?;
    // our own fields win over anything the model echoed back
    report.extra.remove("model");
    report.extra.remove("usage");

    match report.match_score.as_ref().map(|score| (score, score_value(score))) {
        Some((_, Some(score))) if !(0.0..=100.0).contains(&score) => {
            warn!("Model {} returned out-of-range matchScore {}", model.key, score);
        }
        Some((raw, None)) => warn!("Model {} returned non-numeric matchScore {}", model.key, raw),
        _ => {}
    }

    Ok(AnalysisResult {
        report,
        model: model.key,
        usage: completion.usage,
    })
}

fn parse_report(raw: &str) -> Result<AnalysisReport, LlmError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value.clone()).map_err(|e| {
        warn!("Model JSON is not an analysis object: {e}");
        LlmError::MalformedResponse {
            fragment: value.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubGateway;
    use serde_json::json;

    const STUB_ANALYSIS: &str = r#"{"matchScore":72,"missingKeywords":["SQL"],"suggestions":["Add SQL experience"],"strengths":["engineer"],"weaknesses":[]}"#;

    fn request<'a>(resume: &'a str, jd: &'a str, model: &'a str) -> AnalysisRequest<'a> {
        AnalysisRequest {
            resume_text: resume,
            job_description: jd,
            model_key: model,
        }
    }

    #[tokio::test]
    async fn test_stub_response_round_trips_into_result() {
        let gateway = StubGateway::replying(STUB_ANALYSIS);
        let result = analyze_resume(
            &gateway,
            request("Experienced engineer", "Need Python and SQL", "llama-3.1-8b"),
        )
        .await
        .unwrap();

        let mut expected: Value = serde_json::from_str(STUB_ANALYSIS).unwrap();
        let body = serde_json::to_value(&result).unwrap();
        expected["model"] = json!("llama-3.1-8b");
        expected["usage"] =
            json!({"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150});
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_uses_analysis_profile_and_resolved_model() {
        let gateway = StubGateway::replying(STUB_ANALYSIS);
        analyze_resume(&gateway, request("resume", "jd", "mistral-7b"))
            .await
            .unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "mistralai/mistral-7b-instruct:free");
        assert_eq!(calls[0].profile, CompletionProfile::ANALYSIS);
        assert!(calls[0].prompt.contains("resume"));
    }

    #[tokio::test]
    async fn test_unknown_model_falls_back_but_echoes_key() {
        let gateway = StubGateway::replying(STUB_ANALYSIS);
        let result = analyze_resume(&gateway, request("resume", "jd", "not-a-model"))
            .await
            .unwrap();
        assert_eq!(result.model, "not-a-model");
        assert_eq!(
            gateway.calls()[0].model,
            "meta-llama/llama-3.1-8b-instruct:free"
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_fail_without_calling_model() {
        let gateway = StubGateway::replying(STUB_ANALYSIS);
        let err = analyze_resume(&gateway, request("", "jd", "llama-3.1-8b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = analyze_resume(&gateway, request("resume", "  ", "llama-3.1-8b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prose_wrapped_json_is_accepted() {
        let reply = format!("Sure! Here is the analysis:\n{STUB_ANALYSIS}\nGood luck.");
        let gateway = StubGateway::replying(reply);
        let result = analyze_resume(&gateway, request("resume", "jd", "llama-3.1-8b"))
            .await
            .unwrap();
        assert_eq!(result.report.match_score, Some(json!(72)));
    }

    #[tokio::test]
    async fn test_non_json_reply_is_malformed() {
        let gateway = StubGateway::replying("I cannot help with that.");
        let err = analyze_resume(&gateway, request("resume", "jd", "llama-3.1-8b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_partial_report_defaults_and_keeps_extras() {
        let gateway = StubGateway::replying(r#"{"matchScore": 140, "verdict": "strong"}"#);
        let result = analyze_resume(&gateway, request("resume", "jd", "llama-3.1-8b"))
            .await
            .unwrap();
        // out-of-range scores pass through unchanged
        assert_eq!(result.report.match_score, Some(json!(140)));
        assert_eq!(result.report.missing_keywords, json!([]));
        assert_eq!(result.report.extra["verdict"], "strong");
    }

    #[tokio::test]
    async fn test_loosely_typed_fields_pass_through() {
        let gateway = StubGateway::replying(
            r#"{"matchScore": "85", "missingKeywords": null, "strengths": "lots", "weaknesses": [1, "gaps"]}"#,
        );
        let result = analyze_resume(&gateway, request("resume", "jd", "llama-3.1-8b"))
            .await
            .unwrap();

        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["matchScore"], "85");
        assert_eq!(body["missingKeywords"], json!([]));
        assert_eq!(body["suggestions"], json!([]));
        assert_eq!(body["strengths"], "lots");
        assert_eq!(body["weaknesses"], json!([1, "gaps"]));
    }

    #[tokio::test]
    async fn test_null_score_is_omitted() {
        let gateway = StubGateway::replying(r#"{"matchScore": null, "strengths": ["Go"]}"#);
        let result = analyze_resume(&gateway, request("resume", "jd", "llama-3.1-8b"))
            .await
            .unwrap();
        let body = serde_json::to_value(&result).unwrap();
        assert!(body.get("matchScore").is_none());
        assert_eq!(body["strengths"], json!(["Go"]));
    }
}
