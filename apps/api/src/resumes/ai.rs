//! Résumé AI: pluggable, trait-based structuring and job-fit analysis.
//!
//! `AppState` holds an `Arc<dyn ResumeAi>`; the default backend is
//! `LlmResumeAi`, which calls Claude through `llm_client`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM, LOCALE_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::resumes::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, NO_JOB_DESCRIPTION, STRUCTURE_PROMPT_TEMPLATE,
    STRUCTURE_SYSTEM,
};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Résumé content as structured by the AI. Every field defaults when the
/// model leaves it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredResume {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub summary: Option<String>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>, // None = current position
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub compatibility_score: f64, // 0 – 100
    pub optimized_resume: String,
    pub market_summary: String,
    #[serde(default)]
    pub action_plan: Vec<ActionPlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlanDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl ResumeAnalysis {
    /// Clamps the score into 0–100 and orders the plan by day.
    pub fn normalized(mut self) -> Self {
        self.compatibility_score = if self.compatibility_score.is_finite() {
            self.compatibility_score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.action_plan.sort_by_key(|d| d.day);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Carried in `AppState` as `Arc<dyn ResumeAi>`.
#[async_trait]
pub trait ResumeAi: Send + Sync {
    async fn structure(&self, resume_text: &str) -> Result<StructuredResume, AppError>;

    async fn analyze(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<ResumeAnalysis, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeAi: default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeAi {
    llm: LlmClient,
}

impl LlmResumeAi {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAi for LlmResumeAi {
    async fn structure(&self, resume_text: &str) -> Result<StructuredResume, AppError> {
        let system = system_prompt(STRUCTURE_SYSTEM);
        let prompt = STRUCTURE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);

        let structured: StructuredResume = self
            .llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Résumé structuring failed: {e}")))?;

        info!(
            "Structured résumé: {} experiences, {} education entries, {} skills",
            structured.experiences.len(),
            structured.education.len(),
            structured.skills.len()
        );
        Ok(structured)
    }

    async fn analyze(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<ResumeAnalysis, AppError> {
        let system = system_prompt(ANALYSIS_SYSTEM);
        let prompt = analysis_prompt(resume_text, job_description);

        let analysis: ResumeAnalysis = self
            .llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Résumé analysis failed: {e}")))?;

        Ok(analysis.normalized())
    }
}

fn system_prompt(role: &str) -> String {
    format!("{role} {FIDELITY_INSTRUCTION} {LOCALE_INSTRUCTION} {JSON_ONLY_SYSTEM}")
}

fn analysis_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let job_description = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .unwrap_or(NO_JOB_DESCRIPTION);
    // Job description first: résumé text may itself contain the placeholder.
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm_client::parse_json_reply;

    /// Canned AI backend for handler and router tests.
    pub(crate) struct FakeResumeAi;

    #[async_trait]
    impl ResumeAi for FakeResumeAi {
        async fn structure(&self, _resume_text: &str) -> Result<StructuredResume, AppError> {
            Ok(StructuredResume {
                full_name: Some("Maria Silva".into()),
                ..Default::default()
            })
        }

        async fn analyze(
            &self,
            _resume_text: &str,
            _job_description: Option<&str>,
        ) -> Result<ResumeAnalysis, AppError> {
            Ok(ResumeAnalysis {
                compatibility_score: 70.0,
                optimized_resume: "Maria Silva".into(),
                market_summary: "Mercado aquecido".into(),
                action_plan: vec![],
            })
        }
    }

    #[test]
    fn test_structured_resume_defaults_missing_fields() {
        let parsed: StructuredResume = parse_json_reply(
            r#"```json
            {"full_name": "Maria Silva", "skills": ["Rust"], "experiences": [{"company": "Empresa X"}]}
            ```"#,
        )
        .unwrap();

        assert_eq!(parsed.full_name.as_deref(), Some("Maria Silva"));
        assert_eq!(parsed.skills, vec!["Rust"]);
        assert_eq!(parsed.experiences[0].company, "Empresa X");
        assert_eq!(parsed.experiences[0].role, "");
        assert!(parsed.email.is_none());
        assert!(parsed.education.is_empty());
    }

    #[test]
    fn test_analysis_score_is_clamped() {
        let analysis: ResumeAnalysis = parse_json_reply(
            r#"{"compatibility_score": 140, "optimized_resume": "x", "market_summary": "y"}"#,
        )
        .unwrap();
        assert_eq!(analysis.normalized().compatibility_score, 100.0);

        let analysis = ResumeAnalysis {
            compatibility_score: -3.5,
            optimized_resume: String::new(),
            market_summary: String::new(),
            action_plan: vec![],
        };
        assert_eq!(analysis.normalized().compatibility_score, 0.0);
    }

    #[test]
    fn test_action_plan_sorted_by_day() {
        let analysis: ResumeAnalysis = parse_json_reply::<ResumeAnalysis>(
            r#"{
                "compatibility_score": 55.5,
                "optimized_resume": "x",
                "market_summary": "y",
                "action_plan": [
                    {"day": 2, "title": "Networking", "tasks": ["Contatar 3 recrutadores"]},
                    {"day": 1, "title": "Palavras-chave"}
                ]
            }"#,
        )
        .unwrap()
        .normalized();

        let days: Vec<u32> = analysis.action_plan.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![1, 2]);
        assert!(analysis.action_plan[0].tasks.is_empty());
    }

    #[test]
    fn test_analysis_prompt_falls_back_to_general_market() {
        let prompt = analysis_prompt("Maria Silva", Some("   "));
        assert!(prompt.contains(NO_JOB_DESCRIPTION));
        assert!(prompt.contains("Maria Silva"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_analysis_prompt_keeps_placeholder_text_in_resume() {
        let prompt = analysis_prompt("uses {job_description} literally", Some("Dev Rust"));
        assert!(prompt.contains("Dev Rust"));
        assert!(prompt.contains("uses {job_description} literally"));
    }
}
