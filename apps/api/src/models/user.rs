use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::InvalidRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Organization,
    Professional,
    Admin,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "organization" => Some(UserRole::Organization),
            "professional" => Some(UserRole::Professional),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Raw `users` row. Only the columns the matching core reads are selected.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub experience_years: i32,
    pub hourly_rate: f64,
    pub rating: f64,
    pub completed_projects: i32,
}

/// Capability attributes of a professional, as seen by the matching core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub hourly_rate: f64,
    /// Historical rating in [0, 5].
    pub rating: f64,
    pub completed_projects: u32,
}

/// A user looked up by id: role plus the profile built from the same row.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub role: UserRole,
    pub profile: CandidateProfile,
}

impl TryFrom<UserRow> for StoredUser {
    type Error = InvalidRecord;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| InvalidRecord::new("user", id, reason);

        let role = UserRole::parse(&row.role)
            .ok_or_else(|| invalid(format!("unknown role '{}'", row.role)))?;
        let experience_years = u32::try_from(row.experience_years)
            .map_err(|_| invalid(format!("negative experience {}", row.experience_years)))?;
        let completed_projects = u32::try_from(row.completed_projects).map_err(|_| {
            invalid(format!(
                "negative completed project count {}",
                row.completed_projects
            ))
        })?;
        if !row.hourly_rate.is_finite() || row.hourly_rate < 0.0 {
            return Err(invalid(format!("invalid hourly rate {}", row.hourly_rate)));
        }
        if !row.rating.is_finite() || !(0.0..=5.0).contains(&row.rating) {
            return Err(invalid(format!("rating {} outside [0, 5]", row.rating)));
        }

        Ok(StoredUser {
            role,
            profile: CandidateProfile {
                id: row.id,
                name: format!("{} {}", row.first_name, row.last_name)
                    .trim()
                    .to_string(),
                skills: row.skills,
                experience_years,
                certifications: row.certifications,
                languages: row.languages,
                hourly_rate: row.hourly_rate,
                rating: row.rating,
                completed_projects,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            first_name: "Amina".to_string(),
            last_name: "Okafor".to_string(),
            role: "professional".to_string(),
            skills: vec!["Leadership".to_string(), "Coaching".to_string()],
            certifications: vec!["ICF PCC".to_string()],
            languages: vec!["English".to_string()],
            experience_years: 5,
            hourly_rate: 95.0,
            rating: 4.2,
            completed_projects: 12,
        }
    }

    #[test]
    fn test_valid_row_converts() {
        let user = StoredUser::try_from(row()).unwrap();
        assert_eq!(user.role, UserRole::Professional);
        assert_eq!(user.profile.name, "Amina Okafor");
        assert_eq!(user.profile.experience_years, 5);
        assert_eq!(user.profile.skills, vec!["Leadership", "Coaching"]);
    }

    #[test]
    fn test_negative_experience_rejected() {
        let mut r = row();
        r.experience_years = -1;
        let err = StoredUser::try_from(r).unwrap_err();
        assert!(err.reason.contains("negative experience"));
    }

    #[test]
    fn test_rating_above_five_rejected() {
        let mut r = row();
        r.rating = 5.5;
        assert!(StoredUser::try_from(r).is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut r = row();
        r.role = "superuser".to_string();
        assert!(StoredUser::try_from(r).is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&UserRole::Professional).unwrap();
        assert_eq!(json, r#""professional""#);
    }
}
