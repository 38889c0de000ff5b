//! EngineExecutor trait — the abstraction over query backends.
//!
//! An executor knows how to run a resolved, parameter-bound query and
//! return raw rows. What sits behind it is opaque to the core: a relational
//! query runner, an HTTP service, a search index.
//!
//! Implementations: HTTP, SQLite, static rows (see the engines crate).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntitySet;
use crate::error::EngineError;
use crate::intent::Intent;

/// A raw result row. Column names map to JSON values so executors with
/// different storage technologies can share one shape.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Everything an executor needs to run one resolved query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    /// The parameter-bound query text (template with entities substituted)
    pub query: String,

    /// The classified intent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,

    /// Entities extracted from the original text
    #[serde(default)]
    pub entities: EntitySet,

    /// The session the query belongs to
    pub session_id: String,

    /// When the dispatch cycle started
    pub timestamp: DateTime<Utc>,
}

/// The core executor trait.
///
/// The dispatcher calls `execute()` without knowing which backend is in
/// play — pure polymorphism. Executors report failures as `EngineError`;
/// the dispatcher owns retry and fallback policy.
#[async_trait]
pub trait EngineExecutor: Send + Sync {
    /// A human-readable name for this executor (e.g., "primary_sql").
    fn name(&self) -> &str;

    /// Run the request and return raw rows.
    async fn execute(&self, request: EngineRequest) -> Result<Vec<Row>, EngineError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> Result<bool, EngineError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_without_intent() {
        let req = EngineRequest {
            query: "SELECT * FROM inventory".into(),
            intent: None,
            entities: EntitySet::new(),
            session_id: "s-1".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("SELECT"));
        assert!(!json.contains("\"intent\""));
    }
}
