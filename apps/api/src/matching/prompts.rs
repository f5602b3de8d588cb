// Prompt templates and builders for the matching core.
//
// Builders are pure: identical inputs give byte-identical prompts. Every attribute is
// rendered; absent or empty values become NONE_SPECIFIED instead of being dropped.

use crate::llm_client::prompts::NONE_SPECIFIED;
use crate::models::project::ProjectSpec;
use crate::models::user::CandidateProfile;

/// Professional ↔ project compatibility prompt.
pub const MATCH_PROMPT_TEMPLATE: &str = "Analyze the match between this Learning & Development professional and project.

PROFESSIONAL:
- Skills: {skills}
- Experience: {experience_years} years
- Certifications: {certifications}
- Languages: {languages}
- Hourly Rate: ${hourly_rate}
- Rating: {rating}/5
- Completed Projects: {completed_projects}

PROJECT:
- Required Skills: {required_skills}
- Budget: ${budget}
- Type: {project_type}
- Duration: {duration}
- Languages: {project_languages}
- Location: {location}
- Remote: {remote}

Calculate a match score from 0-100 based on:
1. Skill alignment (40%)
2. Experience relevance (25%)
3. Budget compatibility (20%)
4. Language match (10%)
5. Professional rating (5%)

List concrete strengths and concerns. Judge only from the attributes above.";

/// Project market assessment prompt.
pub const INSIGHT_PROMPT_TEMPLATE: &str = "Analyze this Learning & Development project and provide insights for the organization posting it.

PROJECT:
- Title: {title}
- Description: {description}
- Required Skills: {required_skills}
- Budget: ${budget}
- Type: {project_type}
- Duration: {duration}
- Languages: {project_languages}
- Location: {location}
- Remote: {remote}

Provide insights on:
1. Market competitiveness
2. Skill demand analysis
3. Budget assessment
4. Timeline feasibility
5. Recommendations for improvement
6. Risk factors
Estimate the probability (0-100) that this project is successfully staffed and delivered.";

/// Application quality prompt.
pub const APPLICATION_PROMPT_TEMPLATE: &str = "Analyze this application to a Learning & Development project.

PROFESSIONAL:
- Skills: {skills}
- Experience: {experience_years} years
- Rating: {rating}/5
- Completed Projects: {completed_projects}

APPLICATION:
- Cover Letter: {cover_letter}
- Proposed Rate: ${proposed_rate}
- Estimated Duration: {estimated_duration}

PROJECT REQUIREMENTS:
- Required Skills: {required_skills}
- Budget: ${budget}
- Duration: {duration}

Score application quality and fit. Recommendation must be one of: strongly_recommend, recommend, consider, not_recommended.";

/// Skills gap prompt.
pub const SKILLS_PROMPT_TEMPLATE: &str = "Compare these skills with the project requirements and produce a skills gap analysis.

User Skills: {skills}
Project Requirements: {required_skills}

The gap score is 0-100 where 100 means every requirement is covered. Suggest a learning path for the missing skills.";

/// Fields of an application that feed the application prompt.
pub struct ApplicationFacts<'a> {
    pub cover_letter: &'a str,
    pub proposed_rate: f64,
    pub estimated_duration: Option<&'a str>,
}

pub fn build_match_prompt(candidate: &CandidateProfile, project: &ProjectSpec) -> String {
    let experience = candidate.experience_years.to_string();
    let hourly_rate = candidate.hourly_rate.to_string();
    let rating = candidate.rating.to_string();
    let completed = candidate.completed_projects.to_string();
    let budget = project.budget.to_string();

    let skills = list_or_placeholder(&candidate.skills);
    let certifications = list_or_placeholder(&candidate.certifications);
    let languages = list_or_placeholder(&candidate.languages);
    let required_skills = list_or_placeholder(&project.required_skills);
    let project_languages = list_or_placeholder(&project.languages);

    render(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("skills", skills.as_str()),
            ("experience_years", experience.as_str()),
            ("certifications", certifications.as_str()),
            ("languages", languages.as_str()),
            ("hourly_rate", hourly_rate.as_str()),
            ("rating", rating.as_str()),
            ("completed_projects", completed.as_str()),
            ("required_skills", required_skills.as_str()),
            ("budget", budget.as_str()),
            ("project_type", project.project_type.as_str()),
            ("duration", text_or_placeholder(project.duration.as_deref())),
            ("project_languages", project_languages.as_str()),
            ("location", text_or_placeholder(project.location.as_deref())),
            ("remote", yes_no(project.is_remote)),
        ],
    )
}

pub fn build_insight_prompt(project: &ProjectSpec) -> String {
    let budget = project.budget.to_string();
    let required_skills = list_or_placeholder(&project.required_skills);
    let project_languages = list_or_placeholder(&project.languages);

    render(
        INSIGHT_PROMPT_TEMPLATE,
        &[
            ("title", text_or_placeholder(Some(project.title.as_str()))),
            ("description", text_or_placeholder(Some(project.description.as_str()))),
            ("required_skills", required_skills.as_str()),
            ("budget", budget.as_str()),
            ("project_type", project.project_type.as_str()),
            ("duration", text_or_placeholder(project.duration.as_deref())),
            ("project_languages", project_languages.as_str()),
            ("location", text_or_placeholder(project.location.as_deref())),
            ("remote", yes_no(project.is_remote)),
        ],
    )
}

pub fn build_application_prompt(
    candidate: &CandidateProfile,
    project: &ProjectSpec,
    application: &ApplicationFacts<'_>,
) -> String {
    let skills = list_or_placeholder(&candidate.skills);
    let experience = candidate.experience_years.to_string();
    let rating = candidate.rating.to_string();
    let completed = candidate.completed_projects.to_string();
    let proposed_rate = application.proposed_rate.to_string();
    let required_skills = list_or_placeholder(&project.required_skills);
    let budget = project.budget.to_string();

    render(
        APPLICATION_PROMPT_TEMPLATE,
        &[
            ("skills", skills.as_str()),
            ("experience_years", experience.as_str()),
            ("rating", rating.as_str()),
            ("completed_projects", completed.as_str()),
            ("cover_letter", text_or_placeholder(Some(application.cover_letter))),
            ("proposed_rate", proposed_rate.as_str()),
            (
                "estimated_duration",
                text_or_placeholder(application.estimated_duration),
            ),
            ("required_skills", required_skills.as_str()),
            ("budget", budget.as_str()),
            ("duration", text_or_placeholder(project.duration.as_deref())),
        ],
    )
}

pub fn build_skills_prompt(skills: &[String], requirements: &[String]) -> String {
    let skills = list_or_placeholder(skills);
    let required_skills = list_or_placeholder(requirements);
    render(
        SKILLS_PROMPT_TEMPLATE,
        &[("skills", skills.as_str()), ("required_skills", required_skills.as_str())],
    )
}

/// Single-pass `{key}` substitution. Substituted values are never re-scanned,
/// so user text containing braces cannot pull in other fields.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (close, *v))
        });
        match value {
            Some((close, v)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn list_or_placeholder(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        NONE_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

fn text_or_placeholder(text: Option<&str>) -> &str {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => NONE_SPECIFIED,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use uuid::Uuid;

    use crate::models::project::{ProjectSpec, ProjectStatus, ProjectType};
    use crate::models::user::CandidateProfile;

    pub fn candidate(skills: &[&str], experience_years: u32, rating: f64) -> CandidateProfile {
        CandidateProfile {
            id: Uuid::new_v4(),
            name: "Test Professional".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years,
            certifications: vec![],
            languages: vec!["English".to_string()],
            hourly_rate: 80.0,
            rating,
            completed_projects: 3,
        }
    }

    pub fn project(required_skills: &[&str], budget: f64) -> ProjectSpec {
        ProjectSpec {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            title: "Manager onboarding".to_string(),
            description: "Design a blended onboarding programme".to_string(),
            required_skills: required_skills.iter().map(|s| s.to_string()).collect(),
            budget,
            project_type: ProjectType::ProjectBased,
            status: ProjectStatus::Open,
            duration: None,
            languages: vec![],
            location: None,
            is_remote: true,
        }
    }
}
