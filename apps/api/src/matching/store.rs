//! Storage collaborators for the matching core.
//!
//! The core only reads through `CandidateStore` and hands insights back through
//! `InsightStore`; `PgMarketplaceStore` backs both (and the project repository) with Postgres.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::insight::ProjectInsight;
use crate::models::project::{ProjectRecord, ProjectRow, ProjectSpec};
use crate::models::user::{CandidateProfile, StoredUser, UserRow, UserRole};

/// Rows that converted cleanly, plus how many stored rows were rejected on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Listing<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, skipped: 0 }
    }
}

/// Read-only queries the ranking orchestrator needs.
/// List methods return rows in a stable enumeration order.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_candidate_profile(&self, id: Uuid) -> Result<Option<StoredUser>, AppError>;

    /// Professionals that are verified and active.
    async fn list_verified_professionals(&self) -> Result<Listing<CandidateProfile>, AppError>;

    async fn get_project_spec(&self, id: Uuid) -> Result<Option<ProjectSpec>, AppError>;

    async fn list_open_projects(&self) -> Result<Listing<ProjectSpec>, AppError>;
}

/// Attaches a computed insight to its stored project.
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn attach_project_insight(
        &self,
        project_id: Uuid,
        insight: &ProjectInsight,
    ) -> Result<(), AppError>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, role, skills, certifications, languages, \
     experience_years, hourly_rate, rating, completed_projects";

pub(crate) const PROJECT_COLUMNS: &str = "id, organization_id, title, description, project_type, \
     status, required_skills, budget, duration, languages, location, is_remote, ai_insights, \
     created_at";

#[derive(Clone)]
pub struct PgMarketplaceStore {
    pub(crate) pool: PgPool,
}

impl PgMarketplaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn fetch_project_record(
        &self,
        id: Uuid,
    ) -> Result<Option<ProjectRecord>, AppError> {
        let row: Option<ProjectRow> =
            sqlx::query_as(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ProjectRecord::try_from)
            .transpose()
            .map_err(|e| AppError::Internal(e.into()))
    }
}

#[async_trait]
impl CandidateStore for PgMarketplaceStore {
    async fn get_candidate_profile(&self, id: Uuid) -> Result<Option<StoredUser>, AppError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(StoredUser::try_from)
            .transpose()
            .map_err(|e| AppError::Internal(e.into()))
    }

    async fn list_verified_professionals(&self) -> Result<Listing<CandidateProfile>, AppError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE role = 'professional' AND verified AND status = 'active' \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut listing = Listing::complete(Vec::with_capacity(rows.len()));
        for row in rows {
            match StoredUser::try_from(row) {
                Ok(user) if user.role == UserRole::Professional => listing.items.push(user.profile),
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping professional: {e}");
                    listing.skipped += 1;
                }
            }
        }
        Ok(listing)
    }

    async fn get_project_spec(&self, id: Uuid) -> Result<Option<ProjectSpec>, AppError> {
        Ok(self.fetch_project_record(id).await?.map(|r| r.spec))
    }

    async fn list_open_projects(&self) -> Result<Listing<ProjectSpec>, AppError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE status = 'open' ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut listing = Listing::complete(Vec::with_capacity(rows.len()));
        for row in rows {
            match ProjectRecord::try_from(row) {
                Ok(record) => listing.items.push(record.spec),
                Err(e) => {
                    warn!("Skipping project: {e}");
                    listing.skipped += 1;
                }
            }
        }
        Ok(listing)
    }
}

#[async_trait]
impl InsightStore for PgMarketplaceStore {
    async fn attach_project_insight(
        &self,
        project_id: Uuid,
        insight: &ProjectInsight,
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(insight)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize insight: {e}")))?;

        let result = sqlx::query("UPDATE projects SET ai_insights = $1 WHERE id = $2")
            .bind(&value)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {project_id} not found")));
        }
        Ok(())
    }
}
