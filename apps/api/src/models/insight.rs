use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Market/budget/timeline assessment of a project.
///
/// Produced once when the project is created and stored alongside it. Every field is
/// populated: an insight either exists in full or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInsight {
    pub project_id: Uuid,
    pub market_competitiveness: String,
    pub skill_demand: String,
    pub budget_assessment: String,
    pub timeline_feasibility: String,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    /// In [0, 100].
    pub success_probability: f64,
}
