use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::store::{PgMarketplaceStore, PROJECT_COLUMNS};
use crate::models::project::{ProjectRecord, ProjectRow, ProjectStatus, ProjectType};

/// A project that passed request validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub required_skills: Vec<String>,
    pub budget: f64,
    pub duration: Option<String>,
    pub languages: Vec<String>,
    pub location: Option<String>,
    pub is_remote: bool,
}

/// Project CRUD. Insights are attached separately through `InsightStore`.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert_project(
        &self,
        organization_id: Uuid,
        project: &NewProject,
    ) -> Result<ProjectRecord, AppError>;

    async fn get_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, AppError>;

    /// Returns false when no row was deleted.
    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
impl ProjectRepository for PgMarketplaceStore {
    async fn insert_project(
        &self,
        organization_id: Uuid,
        project: &NewProject,
    ) -> Result<ProjectRecord, AppError> {
        let row: ProjectRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO projects
                (id, organization_id, title, description, project_type, status,
                 required_skills, budget, duration, languages, location, is_remote)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.project_type.as_str())
        .bind(ProjectStatus::Open.as_str())
        .bind(&project.required_skills)
        .bind(project.budget)
        .bind(&project.duration)
        .bind(&project.languages)
        .bind(&project.location)
        .bind(project.is_remote)
        .fetch_one(&self.pool)
        .await?;

        ProjectRecord::try_from(row).map_err(|e| AppError::Internal(e.into()))
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, AppError> {
        self.fetch_project_record(id).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
