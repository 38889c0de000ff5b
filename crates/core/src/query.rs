//! The Query value — a free-text question captured at the front door.
//!
//! Immutable once created. Normalization happens exactly once, in the
//! constructor, so every downstream component (extractor, classifier, rule
//! matching) sees the same text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-text query bound to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Unique id for this query
    pub id: String,

    /// The text exactly as the user typed it
    pub raw: String,

    /// Trimmed, lowercased (ASCII only — CJK text is case-free) text that
    /// all matching runs against
    pub normalized: String,

    /// The session this query belongs to
    pub session_id: String,

    /// When the query was received
    pub timestamp: DateTime<Utc>,
}

impl Query {
    /// Capture a query for a session, normalizing the text.
    pub fn new(raw: impl Into<String>, session_id: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self {
            id: Uuid::new_v4().to_string(),
            raw,
            normalized,
            session_id: session_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Trim and lowercase. Interior whitespace runs collapse to a single space
/// so trigger-word matching is stable against sloppy input.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_on_construction() {
        let q = Query::new("  Show   INVENTORY  ", "session-1");
        assert_eq!(q.normalized, "show inventory");
        assert_eq!(q.raw, "  Show   INVENTORY  ");
        assert_eq!(q.session_id, "session-1");
        assert!(!q.id.is_empty());
    }

    #[test]
    fn cjk_text_passes_through() {
        let q = Query::new("查询深圳工厂的库存", "s");
        assert_eq!(q.normalized, "查询深圳工厂的库存");
    }

    #[test]
    fn distinct_queries_get_distinct_ids() {
        let a = Query::new("one", "s");
        let b = Query::new("one", "s");
        assert_ne!(a.id, b.id);
    }
}
