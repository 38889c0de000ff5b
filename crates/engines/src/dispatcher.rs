//! The dispatch state machine — retry in place, then walk the fallback
//! chain in ascending priority order.
//!
//! Expressed as an explicit loop over an ordered engine list so the
//! retry/fallback behavior is inspectable and unit-testable without
//! mocking timers. Timeout is the only cancellation path: dropping the
//! timed-out future abandons the in-flight call.

use inspectql_core::{DispatchError, EngineError, EngineRequest, Row};
use tracing::{info, warn};

use crate::registry::{Engine, EngineRegistry};

/// Caller-supplied dispatch knobs.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Force a specific engine as the first candidate
    pub force_engine: Option<String>,

    /// Run every enabled engine concurrently instead of the fallback chain
    pub broadcast: bool,
}

/// A successful dispatch: rows plus provenance for response metadata.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub rows: Vec<Row>,

    /// Name of the engine that answered
    pub engine: String,

    /// True when the answering engine was not the first candidate
    pub is_fallback: bool,

    /// Total attempts across all engines, including the successful one
    pub attempts: u32,
}

/// One engine's result in broadcast mode.
#[derive(Debug)]
pub struct BroadcastOutcome {
    pub engine: String,
    pub result: Result<Vec<Row>, EngineError>,
}

/// Executes resolved queries against registry engines.
pub struct EngineDispatcher;

impl EngineDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Sequential fallback dispatch (the default mode).
    ///
    /// Candidate order: the forced engine if supplied, else the intent's
    /// preferred engine, else the registry default — followed by the
    /// remaining enabled engines in ascending priority. Disabled engines
    /// are skipped everywhere. Each candidate is retried in place up to
    /// its own budget before the chain advances.
    pub async fn dispatch(
        &self,
        registry: &EngineRegistry,
        request: EngineRequest,
        force_engine: Option<&str>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let candidates = candidate_chain(registry, &request, force_engine);
        if candidates.is_empty() {
            return Err(DispatchError::NoEngineAvailable(
                "no enabled engines registered".into(),
            ));
        }

        let mut total_attempts = 0u32;
        let mut last_error = EngineError::NotConfigured("no engine attempted".into());

        for (position, engine) in candidates.iter().enumerate() {
            info!(
                engine = %engine.name,
                position = position + 1,
                total = candidates.len(),
                "dispatch: trying engine"
            );

            match run_engine(engine, &request).await {
                Ok((rows, attempts)) => {
                    total_attempts += attempts;
                    let is_fallback = position > 0;
                    if is_fallback {
                        info!(engine = %engine.name, "dispatch: fallback engine answered");
                    }
                    return Ok(DispatchOutcome {
                        rows,
                        engine: engine.name.clone(),
                        is_fallback,
                        attempts: total_attempts,
                    });
                }
                Err((e, attempts)) => {
                    total_attempts += attempts;
                    warn!(
                        engine = %engine.name,
                        error = %e,
                        attempts,
                        "dispatch: engine exhausted, trying next"
                    );
                    last_error = e;
                }
            }
        }

        Err(DispatchError::AllEnginesFailed {
            tried: candidates.len(),
            last: last_error,
        })
    }

    /// Broadcast dispatch: the same request to every enabled engine
    /// concurrently. No ordering guarantee between completions; a failure
    /// in one engine does not cancel the others; all outcomes are
    /// collected (success or failure) before returning.
    pub async fn broadcast(
        &self,
        registry: &EngineRegistry,
        request: EngineRequest,
    ) -> Vec<BroadcastOutcome> {
        let engines = registry.enabled_by_priority();
        let request = &request;
        let futures: Vec<_> = engines
            .iter()
            .map(|&engine| async move {
                let result = run_engine(engine, request).await;
                BroadcastOutcome {
                    engine: engine.name.clone(),
                    result: result.map(|(rows, _)| rows).map_err(|(e, _)| e),
                }
            })
            .collect();
        futures::future::join_all(futures).await
    }
}

impl Default for EngineDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the ordered candidate list for one dispatch cycle.
fn candidate_chain<'a>(
    registry: &'a EngineRegistry,
    request: &EngineRequest,
    force_engine: Option<&str>,
) -> Vec<&'a Engine> {
    let preferred = request
        .intent
        .as_ref()
        .and_then(|i| i.preferred_engine.as_deref());

    // First enabled engine among forced → preferred → default.
    let initial = [force_engine, preferred, registry.default_engine()]
        .into_iter()
        .flatten()
        .find_map(|name| match registry.get(name) {
            Some(e) if e.enabled => Some(e),
            Some(_) => {
                warn!(engine = %name, "dispatch: candidate is disabled, skipping");
                None
            }
            None => {
                warn!(engine = %name, "dispatch: candidate is unknown, skipping");
                None
            }
        });

    let mut chain: Vec<&Engine> = Vec::new();
    if let Some(engine) = initial {
        chain.push(engine);
    }
    for engine in registry.enabled_by_priority() {
        if chain.iter().all(|c| c.name != engine.name) {
            chain.push(engine);
        }
    }
    chain
}

/// Run one engine to completion of its retry budget.
///
/// Returns the rows and attempt count on success, or the last error and
/// attempt count when the budget is exhausted.
async fn run_engine(
    engine: &Engine,
    request: &EngineRequest,
) -> Result<(Vec<Row>, u32), (EngineError, u32)> {
    let budget = engine.max_retries + 1;
    let mut last_error = EngineError::NotConfigured(engine.name.clone());

    for attempt in 1..=budget {
        match tokio::time::timeout(engine.timeout, engine.executor.execute(request.clone())).await
        {
            Ok(Ok(rows)) => return Ok((rows, attempt)),
            Ok(Err(e)) => {
                warn!(engine = %engine.name, attempt, budget, error = %e, "engine attempt failed");
                last_error = e;
            }
            Err(_) => {
                warn!(
                    engine = %engine.name,
                    attempt,
                    budget,
                    timeout_ms = engine.timeout.as_millis() as u64,
                    "engine attempt timed out"
                );
                last_error = EngineError::Timeout(format!(
                    "engine '{}' timed out after {}ms",
                    engine.name,
                    engine.timeout.as_millis()
                ));
            }
        }
    }

    Err((last_error, budget))
}
