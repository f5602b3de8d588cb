//! Project lifecycle: create (with one-shot insights), fetch, owner-only delete.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::insights::InsightGenerator;
use crate::matching::store::{CandidateStore, InsightStore};
use crate::models::project::{ProjectRecord, ProjectType};
use crate::models::user::UserRole;
use crate::projects::repository::{NewProject, ProjectRepository};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub budget: f64,
    pub duration: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
}

impl CreateProjectRequest {
    /// Trims text fields, drops blank list entries and checks the budget.
    pub fn validate(&self) -> Result<NewProject, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "description cannot be empty".to_string(),
            ));
        }
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(AppError::Validation(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }

        Ok(NewProject {
            title: title.to_string(),
            description: description.to_string(),
            project_type: self.project_type,
            required_skills: clean_list(&self.required_skills),
            budget: self.budget,
            duration: clean_text(self.duration.as_deref()),
            languages: clean_list(&self.languages),
            location: clean_text(self.location.as_deref()),
            is_remote: self.is_remote,
        })
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub struct ProjectService {
    users: Arc<dyn CandidateStore>,
    projects: Arc<dyn ProjectRepository>,
    insight_store: Arc<dyn InsightStore>,
    insights: Arc<InsightGenerator>,
}

impl ProjectService {
    pub fn new(
        users: Arc<dyn CandidateStore>,
        projects: Arc<dyn ProjectRepository>,
        insight_store: Arc<dyn InsightStore>,
        insights: Arc<InsightGenerator>,
    ) -> Self {
        Self {
            users,
            projects,
            insight_store,
            insights,
        }
    }

    /// Creates the project, then asks for insights exactly once.
    /// The project exists even when insights are unavailable or cannot be stored.
    pub async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectRecord, AppError> {
        let new_project = request.validate()?;

        let owner = self
            .users
            .get_candidate_profile(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;
        if owner.role != UserRole::Organization {
            return Err(AppError::Forbidden(
                "Only organizations can create projects".to_string(),
            ));
        }

        let mut record = self
            .projects
            .insert_project(request.user_id, &new_project)
            .await?;
        info!(project_id = %record.spec.id, organization_id = %request.user_id, "Created project");

        if let Some(insight) = self.insights.generate_insights(&record.spec).await {
            match self
                .insight_store
                .attach_project_insight(record.spec.id, &insight)
                .await
            {
                Ok(()) => record.ai_insights = Some(insight),
                Err(e) => {
                    warn!(project_id = %record.spec.id, error = %e, "Failed to store project insights");
                }
            }
        }

        Ok(record)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<ProjectRecord, AppError> {
        self.projects
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
    }

    /// Only the owning organization may delete; the stored insight goes with the row.
    pub async fn delete_project(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let record = self.get_project(id).await?;
        if record.spec.organization_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owning organization can delete this project".to_string(),
            ));
        }

        if !self.projects.delete_project(id).await? {
            return Err(AppError::NotFound(format!("Project {id} not found")));
        }
        info!(project_id = %id, "Deleted project");
        Ok(())
    }
}
