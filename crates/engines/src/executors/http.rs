//! HTTP executor — POSTs the dispatch request to a query service.
//!
//! The service receives the full `EngineRequest` as JSON and answers with
//! `{"rows": [...]}`. Timeouts are owned by the dispatcher, not set on the
//! client, so one engine's budget never leaks into another's.

use async_trait::async_trait;
use inspectql_core::{EngineError, EngineExecutor, EngineRequest, Row};
use serde::Deserialize;

/// A query backend reachable over HTTP.
pub struct HttpExecutor {
    name: String,
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RowsEnvelope {
    #[serde(default)]
    rows: Vec<Row>,
}

impl HttpExecutor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EngineExecutor for HttpExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: EngineRequest) -> Result<Vec<Row>, EngineError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Response {
                status_code: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        let envelope: RowsEnvelope = response
            .json()
            .await
            .map_err(|e| EngineError::Response {
                status_code: status.as_u16(),
                message: format!("malformed rows payload: {e}"),
            })?;
        Ok(envelope.rows)
    }

    async fn health_check(&self) -> Result<bool, EngineError> {
        match self.client.get(&self.url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}
