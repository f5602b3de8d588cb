//! Axum route handlers for the Projects API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::ranking::{RankedMatches, DEFAULT_MATCH_LIMIT};
use crate::models::project::{ProjectRecord, ProjectSpec};
use crate::projects::service::CreateProjectRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/projects
///
/// `ai_insights` is null in the response when insights could not be produced.
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRecord>), AppError> {
    let record = state.projects.create_project(&request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectRecord>, AppError> {
    Ok(Json(state.projects.get_project(id).await?))
}

/// DELETE /api/v1/projects/:id?user_id=…
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    state.projects.delete_project(id, query.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/recommended?user_id=…
///
/// Top open projects for a professional, always at the default limit.
pub async fn handle_recommended_projects(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RankedMatches<ProjectSpec>>, AppError> {
    let ranked = state
        .matching
        .rank_projects_for_professional(query.user_id, DEFAULT_MATCH_LIMIT)
        .await?;
    Ok(Json(ranked))
}
