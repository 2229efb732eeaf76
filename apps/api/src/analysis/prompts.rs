// Prompt for résumé/job-description match analysis.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Builds the analysis prompt. Both inputs are embedded verbatim: no escaping,
/// no truncation.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        r#"You are a resume analysis assistant. Given the following resume and job description, provide a detailed analysis in JSON format.

Resume:
{resume_text}

Job Description:
{job_description}

Please analyze and respond with a JSON object containing:
{{
  "matchScore": number (0-100),
  "missingKeywords": [string array of missing skills/keywords],
  "suggestions": [string array of improvement suggestions],
  "strengths": [string array of candidate's strengths],
  "weaknesses": [string array of areas for improvement]
}}

{JSON_ONLY_INSTRUCTION}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs_and_schema() {
        let prompt = build_analysis_prompt("Experienced engineer", "Need Python and SQL");
        assert!(prompt.contains("Resume:\nExperienced engineer"));
        assert!(prompt.contains("Job Description:\nNeed Python and SQL"));
        assert!(prompt.contains("\"matchScore\": number (0-100)"));
        assert!(prompt.contains("\"weaknesses\""));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_analysis_prompt("a", "b"),
            build_analysis_prompt("a", "b")
        );
    }

    #[test]
    fn test_inputs_are_not_escaped_or_truncated() {
        let resume = format!("{{job_description}} {}", "x".repeat(50_000));
        let prompt = build_analysis_prompt(&resume, "jd");
        assert!(prompt.contains(&resume));
    }
}
