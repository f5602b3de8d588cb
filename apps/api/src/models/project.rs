use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::insight::ProjectInsight;
use super::InvalidRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    ShortTerm,
    LongTerm,
    ProjectBased,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::ShortTerm => "short_term",
            ProjectType::LongTerm => "long_term",
            ProjectType::ProjectBased => "project_based",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "short_term" => Some(ProjectType::ShortTerm),
            "long_term" => Some(ProjectType::LongTerm),
            "project_based" => Some(ProjectType::ProjectBased),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(ProjectStatus::Draft),
            "open" => Some(ProjectStatus::Open),
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub project_type: String,
    pub status: String,
    pub required_skills: Vec<String>,
    pub budget: f64,
    pub duration: Option<String>,
    pub languages: Vec<String>,
    pub location: Option<String>,
    pub is_remote: bool,
    pub ai_insights: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// A project as the matching core sees it. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    /// Always > 0.
    pub budget: f64,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub duration: Option<String>,
    pub languages: Vec<String>,
    pub location: Option<String>,
    pub is_remote: bool,
}

/// A stored project together with the insight attached at creation time, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    #[serde(flatten)]
    pub spec: ProjectSpec,
    pub ai_insights: Option<ProjectInsight>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = InvalidRecord;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| InvalidRecord::new("project", id, reason);

        let project_type = ProjectType::parse(&row.project_type)
            .ok_or_else(|| invalid(format!("unknown project type '{}'", row.project_type)))?;
        let status = ProjectStatus::parse(&row.status)
            .ok_or_else(|| invalid(format!("unknown status '{}'", row.status)))?;
        if !row.budget.is_finite() || row.budget <= 0.0 {
            return Err(invalid(format!("budget must be positive, got {}", row.budget)));
        }

        let ai_insights = match row.ai_insights {
            Some(value) => match serde_json::from_value::<ProjectInsight>(value) {
                Ok(insight) => Some(insight),
                Err(e) => {
                    tracing::warn!(project_id = %id, error = %e, "Stored insights are unreadable; ignoring");
                    None
                }
            },
            None => None,
        };

        Ok(ProjectRecord {
            spec: ProjectSpec {
                id,
                organization_id: row.organization_id,
                title: row.title,
                description: row.description,
                required_skills: row.required_skills,
                budget: row.budget,
                project_type,
                status,
                duration: row.duration,
                languages: row.languages,
                location: row.location,
                is_remote: row.is_remote,
            },
            ai_insights,
            created_at: row.created_at,
        })
    }
}
