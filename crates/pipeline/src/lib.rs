//! # inspectql Pipeline
//!
//! The primary entry point: free text in, structured response out.
//!
//! Control flow: text → entity extraction + intent classification → rule
//! resolution → engine dispatch (fallback chain or broadcast) → response
//! synthesis, with every result recorded in the context cache.
//!
//! `resolve_and_respond` never returns an error. Every internal failure is
//! converted into a structured response carrying `success: false` and a
//! human-readable message; only startup misconfiguration aborts
//! construction.

mod builder;

pub use builder::PipelineBuilder;
pub use inspectql_engines::DispatchOptions;

use inspectql_context::{CacheEntry, ContextCache};
use inspectql_core::{EngineRequest, Query, ResponseMetadata, StructuredResponse};
use inspectql_engines::{EngineDispatcher, EngineRegistry};
use inspectql_nlu::{EntityExtractor, IntentClassifier};
use inspectql_response::ResponseSynthesizer;
use inspectql_rules::RuleRepository;
use std::time::Instant;
use tracing::{info, warn};

/// The composed query-resolution pipeline.
///
/// Construct one per process (or per test) via [`PipelineBuilder`] or
/// [`Pipeline::from_config`]. All components are owned — no process-wide
/// globals, so test suites can build isolated instances freely.
pub struct Pipeline {
    pub(crate) extractor: EntityExtractor,
    pub(crate) classifier: IntentClassifier,
    pub(crate) rules: RuleRepository,
    pub(crate) registry: EngineRegistry,
    pub(crate) dispatcher: EngineDispatcher,
    pub(crate) cache: ContextCache,
    pub(crate) synthesizer: ResponseSynthesizer,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Build a pipeline from configuration. Rules come from the configured
    /// rule file, or the built-in set when none is given.
    pub async fn from_config(config: &inspectql_config::AppConfig) -> inspectql_core::Result<Self> {
        builder::from_config(config).await
    }

    /// Resolve a free-text query and synthesize a structured response.
    ///
    /// Never returns an error: classification misses, unmatched rules, and
    /// exhausted engine chains all come back as graceful responses with
    /// `success: false`.
    pub async fn resolve_and_respond(
        &self,
        text: &str,
        session_id: &str,
        options: DispatchOptions,
    ) -> StructuredResponse {
        let started = Instant::now();
        let query = Query::new(text, session_id);
        info!(session = %session_id, query = %query.normalized, "resolving query");

        let entities = self.extractor.extract(&query.normalized);
        let intent = self.classifier.classify(&query.normalized);

        let mut metadata = ResponseMetadata {
            intent: intent.as_ref().map(|i| i.name.clone()),
            confidence: intent.as_ref().map(|i| i.confidence).unwrap_or(0.0),
            ..Default::default()
        };

        // Classification miss: suggest what the classifier does understand.
        let Some(intent) = intent else {
            let response = ResponseSynthesizer::suggestion(&self.classifier.example_queries());
            return self.finish(&query, response, metadata, started).await;
        };

        // No matching rule and no default configured.
        let Some(rule) = self.rules.resolve(Some(&intent), &query.normalized) else {
            warn!(query = %query.normalized, "no rule matched and no default rule configured");
            let response = ResponseSynthesizer::not_understood();
            return self.finish(&query, response, metadata, started).await;
        };
        let rule = rule.clone();

        let request = EngineRequest {
            query: self.rules.bind_template(&rule, &entities),
            intent: Some(intent),
            entities,
            session_id: query.session_id.clone(),
            timestamp: query.timestamp,
        };

        let response = if options.broadcast {
            self.respond_broadcast(&rule, &query, request, &mut metadata)
                .await
        } else {
            self.respond_sequential(&rule, &query, request, options.force_engine.as_deref(), &mut metadata)
                .await
        };

        self.finish(&query, response, metadata, started).await
    }

    /// Default mode: walk the fallback chain.
    async fn respond_sequential(
        &self,
        rule: &inspectql_core::Rule,
        query: &Query,
        request: EngineRequest,
        force_engine: Option<&str>,
        metadata: &mut ResponseMetadata,
    ) -> StructuredResponse {
        match self.dispatcher.dispatch(&self.registry, request, force_engine).await {
            Ok(outcome) => {
                metadata.engine = Some(outcome.engine);
                metadata.is_fallback = outcome.is_fallback;
                self.synthesizer.synthesize(rule, &query.normalized, &outcome.rows)
            }
            Err(e) => {
                warn!(error = %e, "dispatch exhausted every engine");
                ResponseSynthesizer::apology(&e.to_string())
            }
        }
    }

    /// Broadcast mode: every enabled engine concurrently, rows from all
    /// successful engines merged for synthesis.
    async fn respond_broadcast(
        &self,
        rule: &inspectql_core::Rule,
        query: &Query,
        request: EngineRequest,
        metadata: &mut ResponseMetadata,
    ) -> StructuredResponse {
        let outcomes = self.dispatcher.broadcast(&self.registry, request).await;
        if outcomes.is_empty() {
            return ResponseSynthesizer::apology("no enabled engines");
        }

        let mut rows = Vec::new();
        let mut answered = Vec::new();
        let mut last_error = None;
        for outcome in outcomes {
            match outcome.result {
                Ok(engine_rows) => {
                    rows.extend(engine_rows);
                    answered.push(outcome.engine);
                }
                Err(e) => {
                    warn!(engine = %outcome.engine, error = %e, "broadcast engine failed");
                    last_error = Some(e);
                }
            }
        }

        if answered.is_empty() {
            let detail = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no engine answered".into());
            return ResponseSynthesizer::apology(&detail);
        }

        metadata.engine = Some(answered.join("+"));
        self.synthesizer.synthesize(rule, &query.normalized, &rows)
    }

    /// Stamp metadata, record the result in the context cache, and return.
    async fn finish(
        &self,
        query: &Query,
        mut response: StructuredResponse,
        mut metadata: ResponseMetadata,
        started: Instant,
    ) -> StructuredResponse {
        metadata.response_time_ms = started.elapsed().as_millis() as u64;
        response.metadata = metadata;
        self.cache
            .put(query.session_id.clone(), query.raw.clone(), response.clone())
            .await;
        response
    }

    /// Prior query/result pairs for a session, oldest first.
    pub async fn context(&self, session_id: &str) -> Vec<CacheEntry> {
        self.cache.get(session_id).await
    }

    /// Swap in a new rule set between dispatch cycles.
    pub fn reload_rules(
        &mut self,
        rules: Vec<inspectql_core::Rule>,
    ) -> Result<(), inspectql_core::RuleError> {
        self.rules.reload(rules)
    }

    /// The engine registry, for enable/disable toggles between cycles.
    pub fn registry_mut(&mut self) -> &mut EngineRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }
}
