pub mod insight;
pub mod project;
pub mod user;

use thiserror::Error;
use uuid::Uuid;

/// A stored row that cannot be turned into a domain value.
/// Raised at the storage boundary so nothing malformed reaches the matching core.
#[derive(Debug, Error)]
#[error("invalid {entity} record {id}: {reason}")]
pub struct InvalidRecord {
    pub entity: &'static str,
    pub id: Uuid,
    pub reason: String,
}

impl InvalidRecord {
    pub(crate) fn new(entity: &'static str, id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            entity,
            id,
            reason: reason.into(),
        }
    }
}
