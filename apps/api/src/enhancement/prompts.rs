// Prompts for full-résumé enhancement and single-section generation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Builds the full-enhancement prompt. Inputs are embedded verbatim.
pub fn build_enhancement_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        r#"You are an expert resume writer and ATS optimization specialist.

Given the following resume and job description, provide a comprehensive enhancement that includes:

1. **Enhanced Resume Text**: A complete, improved version of the resume
2. **Specific Changes**: Detailed list of what was changed and why
3. **ATS Optimization**: Make it more ATS-friendly
4. **Keyword Integration**: Add relevant keywords from the job description
5. **Action Verbs**: Improve action verbs and achievements
6. **Formatting**: Optimize structure and readability

**Original Resume:**
{resume_text}

**Job Description:**
{job_description}

Please respond with a JSON object containing:
{{
  "enhancedText": "Complete enhanced resume text",
  "changes": [
    {{
      "section": "section name (e.g., 'Experience', 'Skills', 'Summary')",
      "original": "original text",
      "improved": "improved text",
      "reason": "why this change was made"
    }}
  ],
  "summary": "Brief summary of key improvements made",
  "atsScore": number (0-100, estimated ATS compatibility score)
}}

{JSON_ONLY_INSTRUCTION}"#
    )
}

/// The four résumé sections that can be generated on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Summary,
    Experience,
    Skills,
    Education,
}

impl SectionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "summary" => Some(SectionType::Summary),
            "experience" => Some(SectionType::Experience),
            "skills" => Some(SectionType::Skills),
            "education" => Some(SectionType::Education),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Summary => "summary",
            SectionType::Experience => "experience",
            SectionType::Skills => "skills",
            SectionType::Education => "education",
        }
    }
}

/// Builds a section prompt. Free text is returned by the model, not JSON.
///
/// `user_info` is appended as candidate details when it carries anything.
pub fn build_section_prompt(
    section: SectionType,
    job_description: &str,
    user_info: Option<&Value>,
) -> String {
    let mut prompt = match section {
        SectionType::Summary => format!(
            "Write a compelling professional summary for a resume based on this job description: {job_description}.\n\
             Include relevant skills and experience that match the job requirements."
        ),
        SectionType::Experience => format!(
            "Write 2-3 bullet points for a work experience section based on this job description: {job_description}.\n\
             Use strong action verbs and quantify achievements where possible."
        ),
        SectionType::Skills => format!(
            "Based on this job description: {job_description}, list the most relevant technical and soft skills \
             that should be included in a resume skills section."
        ),
        SectionType::Education => format!(
            "Based on this job description: {job_description}, suggest appropriate education and certifications \
             that would be relevant for this position."
        ),
    };

    if let Some(info) = user_info.filter(|v| has_content(v)) {
        prompt.push_str("\n\nCandidate details:\n");
        prompt.push_str(&info.to_string());
    }

    prompt
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enhancement_prompt_embeds_inputs_and_schema() {
        let prompt = build_enhancement_prompt("Old resume", "Rust role");
        assert!(prompt.contains("**Original Resume:**\nOld resume"));
        assert!(prompt.contains("**Job Description:**\nRust role"));
        assert!(prompt.contains("\"atsScore\": number"));
        assert!(prompt.contains("\"enhancedText\""));
    }

    #[test]
    fn test_section_type_parse() {
        assert_eq!(SectionType::parse("skills"), Some(SectionType::Skills));
        assert_eq!(SectionType::parse("Skills"), None);
        assert_eq!(SectionType::parse("hobbies"), None);
        for section in [
            SectionType::Summary,
            SectionType::Experience,
            SectionType::Skills,
            SectionType::Education,
        ] {
            assert_eq!(SectionType::parse(section.as_str()), Some(section));
        }
    }

    #[test]
    fn test_each_section_prompt_mentions_job_description() {
        for section in [
            SectionType::Summary,
            SectionType::Experience,
            SectionType::Skills,
            SectionType::Education,
        ] {
            let prompt = build_section_prompt(section, "Backend engineer, Go", None);
            assert!(prompt.contains("Backend engineer, Go"), "{section:?}");
            assert!(!prompt.contains("Candidate details"));
        }
    }

    #[test]
    fn test_experience_prompt_asks_for_bullets() {
        let prompt = build_section_prompt(SectionType::Experience, "jd", None);
        assert!(prompt.starts_with("Write 2-3 bullet points"));
    }

    #[test]
    fn test_user_info_is_appended_only_when_present() {
        let empty = json!({});
        let prompt = build_section_prompt(SectionType::Summary, "jd", Some(&empty));
        assert!(!prompt.contains("Candidate details"));

        let info = json!({"name": "Jane", "years": 5});
        let prompt = build_section_prompt(SectionType::Summary, "jd", Some(&info));
        assert!(prompt.contains("Candidate details:\n{\"name\":\"Jane\",\"years\":5}"));
    }
}
