// Prompt text for résumé analysis.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for résumé analysis.
pub fn analysis_system() -> String {
    format!(
        "You are an expert in Applicant Tracking Systems and résumé review. {JSON_ONLY_SYSTEM}"
    )
}

/// Shape the model must answer with. Mirrors `analysis::feedback::Feedback`.
pub const FEEDBACK_FORMAT: &str = r#"{
  "overallScore": 0,
  "ATS": {
    "score": 0,
    "tips": [{ "type": "good", "tip": "short title" }]
  },
  "toneAndStyle": {
    "score": 0,
    "tips": [{ "type": "improve", "tip": "short title", "explanation": "detailed explanation" }]
  },
  "content": { "score": 0, "tips": [] },
  "structure": { "score": 0, "tips": [] },
  "skills": { "score": 0, "tips": [] }
}"#;

/// Builds the job-specific instruction payload sent with the stored résumé.
/// User text is substituted once, so placeholders inside it stay literal.
pub fn prepare_instructions(job_title: Option<&str>, job_description: Option<&str>) -> String {
    let job_title = job_title.unwrap_or("Not specified");
    let job_description = job_description.unwrap_or("Not specified");
    format!(
        r#"Analyze and rate the attached résumé and suggest how to improve it.
The rating can be low if the résumé is weak. Be thorough and detailed; do not hesitate to point out mistakes or areas for improvement.
If available, use the job description below to tailor the feedback to the role.

Job title: {job_title}
Job description: {job_description}

Rules:
- Every score is a whole number between 0 and 100.
- "type" is either "good" or "improve".
- Give 3-4 tips for ATS and for every other category.
- "content", "structure" and "skills" tips use the same shape as "toneAndStyle" tips.

Return the analysis as a JSON object with this EXACT schema (no extra fields):
{format}"#,
        format = FEEDBACK_FORMAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_carry_job_context() {
        let text = prepare_instructions(Some("Engineer"), Some("Build Rust services"));
        assert!(text.contains("Job title: Engineer"));
        assert!(text.contains("Job description: Build Rust services"));
        assert!(text.contains("\"overallScore\""));
        assert!(!text.contains("{format}"));
    }

    #[test]
    fn test_instructions_without_job_context() {
        let text = prepare_instructions(None, None);
        assert!(text.contains("Job title: Not specified"));
    }

    #[test]
    fn test_placeholders_in_user_text_stay_literal() {
        let text = prepare_instructions(Some("{job_description}"), Some("{format}"));
        assert!(text.contains("Job title: {job_description}\n"));
        assert!(text.contains("Job description: {format}\n"));
        assert_eq!(text.matches("\"overallScore\"").count(), 1);
    }

    #[test]
    fn test_feedback_format_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(FEEDBACK_FORMAT).unwrap();
        assert!(value.get("ATS").is_some());
    }
}
