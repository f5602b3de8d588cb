pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::projects::handlers as projects;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/matching/professionals/:project_id",
            get(matching::handle_rank_professionals),
        )
        .route(
            "/api/v1/matching/projects",
            get(matching::handle_rank_projects),
        )
        // Projects API
        .route("/api/v1/projects", post(projects::handle_create_project))
        .route(
            "/api/v1/projects/recommended",
            get(projects::handle_recommended_projects),
        )
        .route(
            "/api/v1/projects/:id",
            get(projects::handle_get_project).delete(projects::handle_delete_project),
        )
        // AI assessment API
        .route(
            "/api/v1/ai/application-analysis",
            post(matching::handle_application_analysis),
        )
        .route(
            "/api/v1/ai/skills-assessment",
            post(matching::handle_skills_assessment),
        )
        .with_state(state)
}
