//! Ranking orchestrator.
//!
//! Flow: load subject → load the full opposite-side candidate set → score every
//! candidate (bounded fan-out) → stable sort by score, descending → truncate.
//!
//! Nothing is cached: every request re-scores the whole population. Nothing is written.
//! A request either returns the complete ranked list or fails as a whole (not found,
//! storage error, deadline exceeded). Candidates whose inference failed stay in the
//! list with score 0 and are counted in `inference_failures`; stored rows that could
//! not be read are counted in `candidates_skipped`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::scorer::{CompatibilityScorer, ScoreOutcome};
use crate::matching::store::{CandidateStore, Listing};
use crate::matching::tier::MatchTier;
use crate::models::project::ProjectSpec;
use crate::models::user::{CandidateProfile, UserRole};

pub const DEFAULT_MATCH_LIMIT: usize = 10;

/// One entry of a ranking response.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate<C> {
    pub candidate: C,
    pub match_score: f64,
    pub match_level: MatchTier,
    #[serde(skip)]
    pub degraded: bool,
}

/// A complete ranking for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatches<C> {
    pub subject_id: Uuid,
    pub matches: Vec<RankedCandidate<C>>,
    /// Size of the candidate population that was scored.
    pub candidates_considered: usize,
    /// Stored candidates left out because their rows failed validation.
    pub candidates_skipped: usize,
    /// How many of those scored were given 0 because inference was unavailable.
    pub inference_failures: usize,
}

impl<C> RankedMatches<C> {
    fn empty(subject_id: Uuid) -> Self {
        Self {
            subject_id,
            matches: vec![],
            candidates_considered: 0,
            candidates_skipped: 0,
            inference_failures: 0,
        }
    }
}

/// Concurrency caps for scoring calls.
#[derive(Debug, Clone, Copy)]
pub struct ScoringLimits {
    /// Outstanding calls for a single ranking request.
    pub per_request: usize,
    /// Outstanding calls across every request served by one `MatchingService`.
    pub total: usize,
}

pub struct MatchingService {
    store: Arc<dyn CandidateStore>,
    scorer: Arc<dyn CompatibilityScorer>,
    max_in_flight: usize,
    vendor_permits: Semaphore,
    deadline: Duration,
}

impl MatchingService {
    pub fn new(
        store: Arc<dyn CandidateStore>,
        scorer: Arc<dyn CompatibilityScorer>,
        limits: ScoringLimits,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            scorer,
            max_in_flight: limits.per_request.max(1),
            vendor_permits: Semaphore::new(limits.total.max(1)),
            deadline,
        }
    }

    /// Ranks verified, active professionals for a project.
    pub async fn rank_professionals_for_project(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> Result<RankedMatches<CandidateProfile>, AppError> {
        self.with_deadline(self.professionals_for_project(project_id, limit))
            .await
    }

    /// Ranks open projects for a professional.
    /// A subject that exists but is not a professional gets an empty ranking.
    pub async fn rank_projects_for_professional(
        &self,
        professional_id: Uuid,
        limit: usize,
    ) -> Result<RankedMatches<ProjectSpec>, AppError> {
        self.with_deadline(self.projects_for_professional(professional_id, limit))
            .await
    }

    async fn professionals_for_project(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> Result<RankedMatches<CandidateProfile>, AppError> {
        let project = self
            .store
            .get_project_spec(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

        if limit == 0 {
            return Ok(RankedMatches::empty(project_id));
        }

        let professionals = self.store.list_verified_professionals().await?;
        let pending: Vec<_> = professionals
            .items
            .iter()
            .map(|professional| self.score_one(professional, &project))
            .collect();
        let outcomes = self.score_all(pending).await;

        let ranked = assemble(project_id, professionals, outcomes, limit);
        log_ranking("professionals", &ranked);
        Ok(ranked)
    }

    async fn projects_for_professional(
        &self,
        professional_id: Uuid,
        limit: usize,
    ) -> Result<RankedMatches<ProjectSpec>, AppError> {
        let user = self
            .store
            .get_candidate_profile(professional_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Professional {professional_id} not found")))?;

        if user.role != UserRole::Professional {
            info!(
                user_id = %professional_id,
                role = ?user.role,
                "Project ranking requested for a non-professional; returning no results"
            );
            return Ok(RankedMatches::empty(professional_id));
        }

        if limit == 0 {
            return Ok(RankedMatches::empty(professional_id));
        }

        let projects = self.store.list_open_projects().await?;
        let pending: Vec<_> = projects
            .items
            .iter()
            .map(|project| self.score_one(&user.profile, project))
            .collect();
        let outcomes = self.score_all(pending).await;

        let ranked = assemble(professional_id, projects, outcomes, limit);
        log_ranking("projects", &ranked);
        Ok(ranked)
    }

    /// One scoring call, held back until a service-wide permit is free.
    fn score_one<'a>(
        &'a self,
        candidate: &'a CandidateProfile,
        project: &'a ProjectSpec,
    ) -> BoxFuture<'a, ScoreOutcome> {
        Box::pin(async move {
            // The semaphore is never closed, so acquire only fails if that changes.
            let _permit = self.vendor_permits.acquire().await.ok();
            self.scorer.score(candidate, project).await
        })
    }

    /// Drives the pending calls with at most `max_in_flight` outstanding.
    /// Outcomes come back in candidate-enumeration order.
    async fn score_all(&self, pending: Vec<BoxFuture<'_, ScoreOutcome>>) -> Vec<ScoreOutcome> {
        stream::iter(pending)
            .buffered(self.max_in_flight)
            .collect()
            .await
    }

    async fn with_deadline<T>(
        &self,
        ranking: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.deadline, ranking)
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Ranking did not complete within {}s",
                    self.deadline.as_secs()
                ))
            })?
    }
}

/// Pairs candidates with their outcomes, sorts by score (stable, descending) and truncates.
fn assemble<C>(
    subject_id: Uuid,
    candidates: Listing<C>,
    outcomes: Vec<ScoreOutcome>,
    limit: usize,
) -> RankedMatches<C> {
    let candidates_considered = candidates.items.len();

    let mut matches: Vec<RankedCandidate<C>> = candidates
        .items
        .into_iter()
        .zip(outcomes)
        .map(|(candidate, outcome)| RankedCandidate {
            candidate,
            match_score: outcome.score(),
            match_level: outcome.tier(),
            degraded: outcome.is_degraded(),
        })
        .collect();
    let inference_failures = matches.iter().filter(|m| m.degraded).count();

    matches.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    matches.truncate(limit);

    RankedMatches {
        subject_id,
        matches,
        candidates_considered,
        candidates_skipped: candidates.skipped,
        inference_failures,
    }
}

fn log_ranking<C>(kind: &str, ranked: &RankedMatches<C>) {
    info!(
        subject_id = %ranked.subject_id,
        considered = ranked.candidates_considered,
        skipped = ranked.candidates_skipped,
        returned = ranked.matches.len(),
        inference_failures = ranked.inference_failures,
        "Ranked {kind}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::prompts::fixtures::{candidate, project};
    use crate::matching::scorer::MatchAssessment;
    use crate::models::user::StoredUser;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeStore {
        users: Vec<StoredUser>,
        professionals: Vec<CandidateProfile>,
        projects: Vec<ProjectSpec>,
        /// Rows each list call reports as unreadable.
        skipped: usize,
    }

    #[async_trait]
    impl CandidateStore for FakeStore {
        async fn get_candidate_profile(&self, id: Uuid) -> Result<Option<StoredUser>, AppError> {
            Ok(self.users.iter().find(|u| u.profile.id == id).cloned())
        }

        async fn list_verified_professionals(&self) -> Result<Listing<CandidateProfile>, AppError> {
            Ok(Listing {
                items: self.professionals.clone(),
                skipped: self.skipped,
            })
        }

        async fn get_project_spec(&self, id: Uuid) -> Result<Option<ProjectSpec>, AppError> {
            Ok(self.projects.iter().find(|p| p.id == id).cloned())
        }

        async fn list_open_projects(&self) -> Result<Listing<ProjectSpec>, AppError> {
            Ok(Listing {
                items: self.projects.clone(),
                skipped: self.skipped,
            })
        }
    }

    /// Scores by candidate/project id; ids not in the table fail inference.
    #[derive(Default)]
    struct TableScorer {
        scores: HashMap<Uuid, f64>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl CompatibilityScorer for TableScorer {
        async fn score(&self, c: &CandidateProfile, p: &ProjectSpec) -> ScoreOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let key = self.scores.get(&c.id).or_else(|| self.scores.get(&p.id));
            match key {
                Some(&score) => ScoreOutcome::Scored(MatchAssessment {
                    match_score: score,
                    reasoning: String::new(),
                    strengths: vec![],
                    concerns: vec![],
                }),
                None => ScoreOutcome::InferenceFailed {
                    reason: "provider unavailable".to_string(),
                },
            }
        }
    }

    struct StalledScorer;

    #[async_trait]
    impl CompatibilityScorer for StalledScorer {
        async fn score(&self, _: &CandidateProfile, _: &ProjectSpec) -> ScoreOutcome {
            std::future::pending().await
        }
    }

    fn limits(per_request: usize, total: usize) -> ScoringLimits {
        ScoringLimits { per_request, total }
    }

    fn service(store: FakeStore, scorer: Arc<dyn CompatibilityScorer>) -> MatchingService {
        MatchingService::new(Arc::new(store), scorer, limits(4, 16), Duration::from_secs(30))
    }

    fn professionals(n: usize) -> Vec<CandidateProfile> {
        (0..n).map(|_| candidate(&["Coaching"], 3, 4.0)).collect()
    }

    fn user_with_role(role: UserRole) -> StoredUser {
        StoredUser {
            role,
            profile: candidate(&["Facilitation"], 6, 4.5),
        }
    }

    #[tokio::test]
    async fn test_professionals_sorted_descending_and_truncated() {
        let p = project(&["Coaching"], 4000.0);
        let pros = professionals(5);
        let scores: HashMap<Uuid, f64> = pros
            .iter()
            .zip([55.0, 91.0, 70.0, 82.0, 64.0])
            .map(|(c, s)| (c.id, s))
            .collect();
        let expected_top = vec![pros[1].id, pros[3].id, pros[2].id];

        let svc = service(
            FakeStore {
                professionals: pros,
                projects: vec![p.clone()],
                ..Default::default()
            },
            Arc::new(TableScorer {
                scores,
                ..Default::default()
            }),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 3).await.unwrap();
        let ids: Vec<Uuid> = ranked.matches.iter().map(|m| m.candidate.id).collect();
        assert_eq!(ids, expected_top);
        assert_eq!(ranked.matches[0].match_level, MatchTier::Excellent);
        assert_eq!(ranked.matches[1].match_level, MatchTier::VeryGood);
        assert_eq!(ranked.matches[2].match_level, MatchTier::Good);
        assert_eq!(ranked.candidates_considered, 5);
        assert_eq!(ranked.inference_failures, 0);
    }

    #[tokio::test]
    async fn test_ties_keep_enumeration_order() {
        let p = project(&["Coaching"], 4000.0);
        let pros = professionals(4);
        let scores: HashMap<Uuid, f64> = pros.iter().map(|c| (c.id, 75.0)).collect();
        let expected: Vec<Uuid> = pros.iter().map(|c| c.id).collect();

        let svc = service(
            FakeStore {
                professionals: pros,
                projects: vec![p.clone()],
                ..Default::default()
            },
            Arc::new(TableScorer {
                scores,
                delay: Some(Duration::from_millis(1)),
                ..Default::default()
            }),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 10).await.unwrap();
        let ids: Vec<Uuid> = ranked.matches.iter().map(|m| m.candidate.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_all_inference_failures_still_return_full_list() {
        let p = project(&["Coaching"], 4000.0);
        let svc = service(
            FakeStore {
                professionals: professionals(6),
                projects: vec![p.clone()],
                ..Default::default()
            },
            Arc::new(TableScorer::default()),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 10).await.unwrap();
        assert_eq!(ranked.matches.len(), 6);
        assert_eq!(ranked.inference_failures, 6);
        assert!(ranked
            .matches
            .iter()
            .all(|m| m.match_score == 0.0 && m.match_level == MatchTier::Poor));
    }

    #[tokio::test]
    async fn test_partial_failure_demotes_only_failed_candidates() {
        let p = project(&["Coaching"], 4000.0);
        let pros = professionals(3);
        let scores: HashMap<Uuid, f64> = [(pros[0].id, 40.0), (pros[2].id, 88.0)].into();
        let failed = pros[1].id;

        let svc = service(
            FakeStore {
                professionals: pros,
                projects: vec![p.clone()],
                ..Default::default()
            },
            Arc::new(TableScorer {
                scores,
                ..Default::default()
            }),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 10).await.unwrap();
        assert_eq!(ranked.matches.len(), 3);
        assert_eq!(ranked.inference_failures, 1);
        let last = ranked.matches.last().unwrap();
        assert_eq!(last.candidate.id, failed);
        assert!(last.degraded);
    }

    #[tokio::test]
    async fn test_empty_candidate_set_returns_empty_list() {
        let p = project(&["Coaching"], 4000.0);
        let svc = service(
            FakeStore {
                projects: vec![p.clone()],
                ..Default::default()
            },
            Arc::new(TableScorer::default()),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 10).await.unwrap();
        assert!(ranked.matches.is_empty());
        assert_eq!(ranked.candidates_considered, 0);
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let svc = service(FakeStore::default(), Arc::new(TableScorer::default()));
        let err = svc
            .rank_professionals_for_project(Uuid::new_v4(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_limit_ten_with_three_open_projects_returns_three() {
        let user = user_with_role(UserRole::Professional);
        let projects: Vec<ProjectSpec> = (0..3).map(|_| project(&["Coaching"], 2500.0)).collect();
        let scores: HashMap<Uuid, f64> = projects
            .iter()
            .zip([61.0, 77.0, 93.0])
            .map(|(p, s)| (p.id, s))
            .collect();
        let user_id = user.profile.id;

        let svc = service(
            FakeStore {
                users: vec![user],
                projects,
                ..Default::default()
            },
            Arc::new(TableScorer {
                scores,
                ..Default::default()
            }),
        );

        let ranked = svc.rank_projects_for_professional(user_id, 10).await.unwrap();
        assert_eq!(ranked.matches.len(), 3);
        let scores: Vec<f64> = ranked.matches.iter().map(|m| m.match_score).collect();
        assert_eq!(scores, vec![93.0, 77.0, 61.0]);
    }

    #[tokio::test]
    async fn test_non_professional_gets_empty_ranking_without_scoring() {
        let org = user_with_role(UserRole::Organization);
        let org_id = org.profile.id;
        let scorer = Arc::new(TableScorer::default());

        let svc = service(
            FakeStore {
                users: vec![org],
                projects: vec![project(&["Coaching"], 2500.0)],
                ..Default::default()
            },
            scorer.clone(),
        );

        let ranked = svc.rank_projects_for_professional(org_id, 10).await.unwrap();
        assert!(ranked.matches.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_professional_is_not_found() {
        let svc = service(FakeStore::default(), Arc::new(TableScorer::default()));
        let err = svc
            .rank_projects_for_professional(Uuid::new_v4(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fan_out_is_bounded() {
        let p = project(&["Coaching"], 4000.0);
        let scorer = Arc::new(TableScorer {
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        });
        let svc = MatchingService::new(
            Arc::new(FakeStore {
                professionals: professionals(20),
                projects: vec![p.clone()],
                ..Default::default()
            }),
            scorer.clone(),
            limits(3, 16),
            Duration::from_secs(30),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 50).await.unwrap();
        assert_eq!(ranked.matches.len(), 20);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 20);
        let peak = scorer.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {peak}");
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_ranking_futures_are_send() {
        let svc = service(FakeStore::default(), Arc::new(TableScorer::default()));
        assert_send(&svc.rank_professionals_for_project(Uuid::nil(), 1));
        assert_send(&svc.rank_projects_for_professional(Uuid::nil(), 1));
    }

    #[tokio::test]
    async fn test_total_cap_holds_across_concurrent_rankings() {
        let p = project(&["Coaching"], 4000.0);
        let scorer = Arc::new(TableScorer {
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        });
        let svc = MatchingService::new(
            Arc::new(FakeStore {
                professionals: professionals(12),
                projects: vec![p.clone()],
                ..Default::default()
            }),
            scorer.clone(),
            limits(3, 4),
            Duration::from_secs(30),
        );

        let (a, b, c) = tokio::join!(
            svc.rank_professionals_for_project(p.id, 50),
            svc.rank_professionals_for_project(p.id, 50),
            svc.rank_professionals_for_project(p.id, 50),
        );
        for ranked in [a, b, c] {
            assert_eq!(ranked.unwrap().matches.len(), 12);
        }
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 36);
        let peak = scorer.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak in-flight across requests was {peak}");
    }

    #[tokio::test]
    async fn test_unreadable_rows_are_reported_as_skipped() {
        let user = user_with_role(UserRole::Professional);
        let user_id = user.profile.id;
        let svc = service(
            FakeStore {
                users: vec![user],
                projects: vec![project(&["Coaching"], 2500.0)],
                skipped: 2,
                ..Default::default()
            },
            Arc::new(TableScorer::default()),
        );

        let ranked = svc.rank_projects_for_professional(user_id, 10).await.unwrap();
        assert_eq!(ranked.candidates_considered, 1);
        assert_eq!(ranked.candidates_skipped, 2);
        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["candidates_skipped"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_explicit_timeout_not_partial_list() {
        let p = project(&["Coaching"], 4000.0);
        let svc = MatchingService::new(
            Arc::new(FakeStore {
                professionals: professionals(2),
                projects: vec![p.clone()],
                ..Default::default()
            }),
            Arc::new(StalledScorer),
            limits(4, 16),
            Duration::from_secs(5),
        );

        let err = svc
            .rank_professionals_for_project(p.id, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_zero_limit_returns_empty_without_scoring() {
        let p = project(&["Coaching"], 4000.0);
        let scorer = Arc::new(TableScorer::default());
        let svc = service(
            FakeStore {
                professionals: professionals(2),
                projects: vec![p.clone()],
                ..Default::default()
            },
            scorer.clone(),
        );

        let ranked = svc.rank_professionals_for_project(p.id, 0).await.unwrap();
        assert!(ranked.matches.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_assemble_output_length_is_min_of_k_and_limit() {
        for (k, limit) in [(0usize, 5usize), (3, 10), (10, 3), (7, 7)] {
            let candidates: Vec<usize> = (0..k).collect();
            let outcomes = (0..k)
                .map(|i| ScoreOutcome::Scored(MatchAssessment {
                    match_score: (i * 13 % 100) as f64,
                    reasoning: String::new(),
                    strengths: vec![],
                    concerns: vec![],
                }))
                .collect();
            let ranked = assemble(Uuid::nil(), Listing::complete(candidates), outcomes, limit);
            assert_eq!(ranked.matches.len(), k.min(limit));
            assert!(ranked
                .matches
                .windows(2)
                .all(|w| w[0].match_score >= w[1].match_score));
        }
    }

    #[test]
    fn test_degraded_flag_is_not_serialized() {
        let ranked = assemble(
            Uuid::nil(),
            Listing::complete(vec!["a"]),
            vec![ScoreOutcome::InferenceFailed {
                reason: "down".to_string(),
            }],
            10,
        );
        let value = serde_json::to_value(&ranked).unwrap();
        assert!(value["matches"][0].get("degraded").is_none());
        assert_eq!(value["matches"][0]["match_level"], "poor");
        assert_eq!(value["inference_failures"], 1);
    }
}
