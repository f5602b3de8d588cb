//! Application analysis and skills-gap assessment.
//!
//! Same all-or-nothing policy as project insights, except the failure is returned to
//! the caller: these are answered synchronously to a user who asked for them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{
    check_percentage, infer_structured, InferenceError, InferenceProvider, OutputSchema,
    StructuredOutput,
};
use crate::matching::prompts::{build_application_prompt, build_skills_prompt, ApplicationFacts};
use crate::models::project::ProjectSpec;
use crate::models::user::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationRecommendation {
    StronglyRecommend,
    Recommend,
    Consider,
    NotRecommended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationAnalysis {
    pub overall_score: f64,
    pub skill_match: f64,
    pub experience_relevance: f64,
    pub proposal_quality: f64,
    pub rate_competitiveness: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: ApplicationRecommendation,
    pub reasoning: String,
}

impl StructuredOutput for ApplicationAnalysis {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "application_analysis",
        shape: r#"{
  "overall_score": 74,
  "skill_match": 80,
  "experience_relevance": 70,
  "proposal_quality": 65,
  "rate_competitiveness": 85,
  "strengths": ["Has run similar onboarding programmes"],
  "weaknesses": ["Cover letter does not address the timeline"],
  "recommendation": "recommend",
  "reasoning": "Solid skill overlap at a competitive rate."
}"#,
    };

    fn validate(&self) -> Result<(), String> {
        check_percentage("overall_score", self.overall_score)?;
        check_percentage("skill_match", self.skill_match)?;
        check_percentage("experience_relevance", self.experience_relevance)?;
        check_percentage("proposal_quality", self.proposal_quality)?;
        check_percentage("rate_competitiveness", self.rate_competitiveness)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsAssessment {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// 100 means every requirement is covered.
    pub skill_gap_score: f64,
    pub recommendations: Vec<String>,
    pub learning_path: Vec<String>,
}

impl StructuredOutput for SkillsAssessment {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "skills_assessment",
        shape: r#"{
  "matching_skills": ["Coaching"],
  "missing_skills": ["Instructional Design"],
  "skill_gap_score": 60,
  "recommendations": ["Pair with an instructional designer for the first module"],
  "learning_path": ["ATD Instructional Design certificate"]
}"#,
    };

    fn validate(&self) -> Result<(), String> {
        check_percentage("skill_gap_score", self.skill_gap_score)
    }
}

pub struct Assessor {
    provider: Arc<dyn InferenceProvider>,
}

impl Assessor {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }

    pub async fn analyze_application(
        &self,
        candidate: &CandidateProfile,
        project: &ProjectSpec,
        application: &ApplicationFacts<'_>,
    ) -> Result<ApplicationAnalysis, InferenceError> {
        let prompt = build_application_prompt(candidate, project, application);

        let analysis = infer_structured::<ApplicationAnalysis>(
            self.provider.as_ref(),
            JSON_ONLY_SYSTEM,
            &prompt,
        )
        .await
        .map_err(|e| {
            warn!(
                candidate_id = %candidate.id,
                project_id = %project.id,
                error = %e,
                "Application analysis unavailable"
            );
            e
        })?;

        info!(
            candidate_id = %candidate.id,
            project_id = %project.id,
            overall_score = analysis.overall_score,
            "Analyzed application"
        );
        Ok(analysis)
    }

    pub async fn assess_skills(
        &self,
        skills: &[String],
        requirements: &[String],
    ) -> Result<SkillsAssessment, InferenceError> {
        let prompt = build_skills_prompt(skills, requirements);

        infer_structured::<SkillsAssessment>(self.provider.as_ref(), JSON_ONLY_SYSTEM, &prompt)
            .await
            .map_err(|e| {
                warn!(error = %e, "Skills assessment unavailable");
                e
            })
    }
}
