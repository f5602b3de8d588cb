//! Compatibility scoring: one inference call per (candidate, project) pair.
//!
//! Fail-soft policy: when inference is unavailable the outcome is tagged
//! `InferenceFailed` and reports a score of 0, so a ranking can carry on with the
//! candidate demoted instead of aborting.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{
    check_percentage, infer_structured, InferenceProvider, OutputSchema, StructuredOutput,
};
use crate::matching::prompts::build_match_prompt;
use crate::matching::tier::MatchTier;
use crate::models::project::ProjectSpec;
use crate::models::user::CandidateProfile;

/// Structured answer to a scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAssessment {
    pub match_score: f64,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl StructuredOutput for MatchAssessment {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "match_assessment",
        shape: r#"{
  "match_score": 78,
  "reasoning": "Strong facilitation background; budget is slightly below the professional's usual rate.",
  "strengths": ["Leadership programme design"],
  "concerns": ["No Spanish, which the project requires"]
}"#,
    };

    fn validate(&self) -> Result<(), String> {
        check_percentage("match_score", self.match_score)
    }
}

/// Result of scoring one candidate. Internally distinguishes a real score from a
/// degraded one; externally both are just a number and a tier.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(MatchAssessment),
    InferenceFailed { reason: String },
}

impl ScoreOutcome {
    pub fn score(&self) -> f64 {
        match self {
            ScoreOutcome::Scored(assessment) => assessment.match_score,
            ScoreOutcome::InferenceFailed { .. } => 0.0,
        }
    }

    pub fn tier(&self) -> MatchTier {
        MatchTier::from_score(self.score())
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScoreOutcome::InferenceFailed { .. })
    }
}

/// Pluggable scorer. `MatchingService` holds an `Arc<dyn CompatibilityScorer>`.
#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    async fn score(&self, candidate: &CandidateProfile, project: &ProjectSpec) -> ScoreOutcome;
}

/// Scores through the inference provider using the match prompt and schema.
pub struct LlmCompatibilityScorer {
    provider: Arc<dyn InferenceProvider>,
}

impl LlmCompatibilityScorer {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompatibilityScorer for LlmCompatibilityScorer {
    async fn score(&self, candidate: &CandidateProfile, project: &ProjectSpec) -> ScoreOutcome {
        let prompt = build_match_prompt(candidate, project);

        match infer_structured::<MatchAssessment>(self.provider.as_ref(), JSON_ONLY_SYSTEM, &prompt)
            .await
        {
            Ok(assessment) => ScoreOutcome::Scored(assessment),
            Err(e) => {
                warn!(
                    candidate_id = %candidate.id,
                    project_id = %project.id,
                    error = %e,
                    "Scoring inference unavailable; scoring candidate as 0"
                );
                ScoreOutcome::InferenceFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
