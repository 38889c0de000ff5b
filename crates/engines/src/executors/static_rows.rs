//! Static executor — canned rows, useful for tests and demo wiring.

use async_trait::async_trait;
use inspectql_core::{EngineError, EngineExecutor, EngineRequest, Row};

/// Returns the same rows for every request.
pub struct StaticExecutor {
    name: String,
    rows: Vec<Row>,
}

impl StaticExecutor {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Build rows from `(column, value)` literals — test fixture helper.
    pub fn from_pairs(name: impl Into<String>, rows: &[&[(&str, serde_json::Value)]]) -> Self {
        let rows = rows
            .iter()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }
}

#[async_trait]
impl EngineExecutor for StaticExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _request: EngineRequest) -> Result<Vec<Row>, EngineError> {
        Ok(self.rows.clone())
    }
}
