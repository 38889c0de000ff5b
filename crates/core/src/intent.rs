//! The classified intent of a query.
//!
//! Derived by the classifier, never persisted. A missing intent is a
//! classification miss, not an error — callers fall back to a suggestion
//! response.

use serde::{Deserialize, Serialize};

/// The winning intent for a query, with its score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Intent name (e.g., "data_query", "chart_request")
    pub name: String,

    /// Raw score: 10 per keyword match + 20 per pattern match
    pub score: u32,

    /// score / 30 clamped to [0, 1]
    pub confidence: f32,

    /// The keywords and pattern sources that matched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,

    /// Engine this intent prefers to run on, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_engine: Option<String>,
}

impl Intent {
    /// Confidence derived from a raw score: `min(score / 30, 1)`.
    pub fn confidence_for(score: u32) -> f32 {
        (score as f32 / 30.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Intent::confidence_for(0), 0.0);
        assert!((Intent::confidence_for(15) - 0.5).abs() < f32::EPSILON);
        assert_eq!(Intent::confidence_for(30), 1.0);
        assert_eq!(Intent::confidence_for(90), 1.0);
    }
}
