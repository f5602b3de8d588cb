use std::sync::Arc;

use crate::matching::assessment::Assessor;
use crate::matching::ranking::MatchingService;
use crate::matching::store::CandidateStore;
use crate::projects::service::ProjectService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator sits behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub matching: Arc<MatchingService>,
    pub projects: Arc<ProjectService>,
    pub assessor: Arc<Assessor>,
    /// Read access for handlers that load both sides of an application.
    pub candidates: Arc<dyn CandidateStore>,
}
