use serde::{Deserialize, Serialize};

/// Discrete label derived from a 0–100 compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl MatchTier {
    /// Step function over the score; each band includes its lower bound.
    /// Anything below 60, including NaN, is `Poor`.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            MatchTier::Excellent
        } else if score >= 80.0 {
            MatchTier::VeryGood
        } else if score >= 70.0 {
            MatchTier::Good
        } else if score >= 60.0 {
            MatchTier::Fair
        } else {
            MatchTier::Poor
        }
    }
}
