//! Insight generation: market/budget/timeline assessment for a single project.
//!
//! All-or-nothing: one inference call, and either a fully populated `ProjectInsight`
//! or `None`. No retries here and no placeholder values; the caller decides what an
//! absent insight means.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{
    check_percentage, infer_structured, InferenceProvider, OutputSchema, StructuredOutput,
};
use crate::matching::prompts::build_insight_prompt;
use crate::models::insight::ProjectInsight;
use crate::models::project::ProjectSpec;

/// Model-facing shape of an insight; the project id is added on our side.
#[derive(Debug, Deserialize)]
struct GeneratedInsight {
    market_competitiveness: String,
    skill_demand: String,
    budget_assessment: String,
    timeline_feasibility: String,
    recommendations: Vec<String>,
    risk_factors: Vec<String>,
    success_probability: f64,
}

impl StructuredOutput for GeneratedInsight {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "project_insight",
        shape: r#"{
  "market_competitiveness": "Leadership facilitators are in high demand; expect few applicants at this rate.",
  "skill_demand": "Facilitation is common, executive coaching is scarce.",
  "budget_assessment": "Budget is about 15% below market for a 3-month engagement.",
  "timeline_feasibility": "Feasible if content design starts within two weeks.",
  "recommendations": ["Raise the budget or narrow the scope"],
  "risk_factors": ["Single facilitator dependency"],
  "success_probability": 65
}"#,
    };

    fn validate(&self) -> Result<(), String> {
        for (field, text) in [
            ("market_competitiveness", &self.market_competitiveness),
            ("skill_demand", &self.skill_demand),
            ("budget_assessment", &self.budget_assessment),
            ("timeline_feasibility", &self.timeline_feasibility),
        ] {
            if text.trim().is_empty() {
                return Err(format!("{field} is empty"));
            }
        }
        check_percentage("success_probability", self.success_probability)
    }
}

pub struct InsightGenerator {
    provider: Arc<dyn InferenceProvider>,
}

impl InsightGenerator {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }

    /// Returns `None` when inference is unavailable or its answer is incomplete.
    pub async fn generate_insights(&self, project: &ProjectSpec) -> Option<ProjectInsight> {
        let prompt = build_insight_prompt(project);

        let generated = match infer_structured::<GeneratedInsight>(
            self.provider.as_ref(),
            JSON_ONLY_SYSTEM,
            &prompt,
        )
        .await
        {
            Ok(generated) => generated,
            Err(e) => {
                warn!(project_id = %project.id, error = %e, "Project insights unavailable");
                return None;
            }
        };

        info!(
            project_id = %project.id,
            success_probability = generated.success_probability,
            "Generated project insights"
        );

        Some(ProjectInsight {
            project_id: project.id,
            market_competitiveness: generated.market_competitiveness,
            skill_demand: generated.skill_demand,
            budget_assessment: generated.budget_assessment,
            timeline_feasibility: generated.timeline_feasibility,
            recommendations: generated.recommendations,
            risk_factors: generated.risk_factors,
            success_probability: generated.success_probability,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{insight_reply, FixedProvider};
    use super::*;
    use crate::matching::prompts::fixtures::project;
    use serde_json::json;

    #[tokio::test]
    async fn test_generates_complete_insight_with_project_id() {
        let provider = Arc::new(FixedProvider::answering(insight_reply()));
        let generator = InsightGenerator::new(provider.clone());
        let p = project(&["Facilitation"], 5000.0);

        let insight = generator.generate_insights(&p).await.unwrap();
        assert_eq!(insight.project_id, p.id);
        assert_eq!(insight.success_probability, 72.0);
        assert_eq!(insight.recommendations, vec!["Clarify deliverables"]);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_unavailable_and_not_retried() {
        let provider = Arc::new(FixedProvider::failing());
        let generator = InsightGenerator::new(provider.clone());

        assert!(generator
            .generate_insights(&project(&["Facilitation"], 5000.0))
            .await
            .is_none());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_is_unavailable_not_partial() {
        let mut reply = insight_reply();
        reply.as_object_mut().unwrap().remove("risk_factors");
        let generator = InsightGenerator::new(Arc::new(FixedProvider::answering(reply)));

        assert!(generator
            .generate_insights(&project(&["Facilitation"], 5000.0))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_blank_text_is_unavailable() {
        let mut reply = insight_reply();
        reply["budget_assessment"] = json!("   ");
        let generator = InsightGenerator::new(Arc::new(FixedProvider::answering(reply)));

        assert!(generator
            .generate_insights(&project(&["Facilitation"], 5000.0))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_probability_out_of_range_is_unavailable() {
        let mut reply = insight_reply();
        reply["success_probability"] = json!(101);
        let generator = InsightGenerator::new(Arc::new(FixedProvider::answering(reply)));

        assert!(generator
            .generate_insights(&project(&["Facilitation"], 5000.0))
            .await
            .is_none());
    }
}
