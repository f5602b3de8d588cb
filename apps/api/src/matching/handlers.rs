//! Axum route handlers for the Matching and AI assessment APIs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::assessment::{ApplicationAnalysis, SkillsAssessment};
use crate::matching::prompts::ApplicationFacts;
use crate::matching::ranking::{RankedMatches, DEFAULT_MATCH_LIMIT};
use crate::models::project::ProjectSpec;
use crate::models::user::{CandidateProfile, UserRole};
use crate::state::AppState;

pub const MAX_MATCH_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectMatchQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationAnalysisRequest {
    pub professional_id: Uuid,
    pub project_id: Uuid,
    pub cover_letter: String,
    pub proposed_rate: f64,
    pub estimated_duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SkillsAssessmentRequest {
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
}

/// Absent means the default; anything above the cap is clamped.
pub(crate) fn effective_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_MATCH_LIMIT).min(MAX_MATCH_LIMIT)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/matching/professionals/:project_id?limit=N
pub async fn handle_rank_professionals(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<RankedMatches<CandidateProfile>>, AppError> {
    let ranked = state
        .matching
        .rank_professionals_for_project(project_id, effective_limit(query.limit))
        .await?;
    Ok(Json(ranked))
}

/// GET /api/v1/matching/projects?user_id=…&limit=N
pub async fn handle_rank_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectMatchQuery>,
) -> Result<Json<RankedMatches<ProjectSpec>>, AppError> {
    let ranked = state
        .matching
        .rank_projects_for_professional(query.user_id, effective_limit(query.limit))
        .await?;
    Ok(Json(ranked))
}

/// POST /api/v1/ai/application-analysis
///
/// Loads both sides from storage so the model only ever sees stored attributes.
pub async fn handle_application_analysis(
    State(state): State<AppState>,
    Json(request): Json<ApplicationAnalysisRequest>,
) -> Result<Json<ApplicationAnalysis>, AppError> {
    if request.cover_letter.trim().is_empty() {
        return Err(AppError::Validation("cover_letter cannot be empty".to_string()));
    }
    if !request.proposed_rate.is_finite() || request.proposed_rate <= 0.0 {
        return Err(AppError::Validation(
            "proposed_rate must be positive".to_string(),
        ));
    }

    let user = state
        .candidates
        .get_candidate_profile(request.professional_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Professional {} not found", request.professional_id))
        })?;
    if user.role != UserRole::Professional {
        return Err(AppError::Forbidden(
            "Only professionals can submit applications".to_string(),
        ));
    }

    let project = state
        .candidates
        .get_project_spec(request.project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", request.project_id)))?;

    let facts = ApplicationFacts {
        cover_letter: &request.cover_letter,
        proposed_rate: request.proposed_rate,
        estimated_duration: request.estimated_duration.as_deref(),
    };

    let analysis = state
        .assessor
        .analyze_application(&user.profile, &project, &facts)
        .await?;
    Ok(Json(analysis))
}

/// POST /api/v1/ai/skills-assessment
pub async fn handle_skills_assessment(
    State(state): State<AppState>,
    Json(request): Json<SkillsAssessmentRequest>,
) -> Result<Json<SkillsAssessment>, AppError> {
    if request.requirements.iter().all(|r| r.trim().is_empty()) {
        return Err(AppError::Validation(
            "requirements must name at least one skill".to_string(),
        ));
    }

    let assessment = state
        .assessor
        .assess_skills(&request.skills, &request.requirements)
        .await?;
    Ok(Json(assessment))
}
