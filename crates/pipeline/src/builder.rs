//! Pipeline construction — programmatic builder and config wiring.
//!
//! Construction is the one place errors are allowed to abort: invalid rule
//! templates, duplicate engine names, and bad settings all fail here so a
//! running pipeline can keep its never-errors contract.

use inspectql_config::{AppConfig, EngineKind};
use inspectql_context::ContextCache;
use inspectql_core::{Error, Result, Rule};
use inspectql_engines::{Engine, EngineRegistry, HttpExecutor, StaticExecutor};
use inspectql_nlu::{EntityExtractor, IntentClassifier};
use inspectql_response::ResponseSynthesizer;
use inspectql_rules::{standard_rules, RuleRepository, RuleSource, TomlRuleSource};
use std::sync::Arc;
use std::time::Duration;

use crate::Pipeline;

/// Builds a [`Pipeline`] piece by piece. Components not supplied fall back
/// to the standard ones.
pub struct PipelineBuilder {
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    rules: Option<Vec<Rule>>,
    registry: EngineRegistry,
    cache_capacity: usize,
    table_preview_rows: usize,
    volume_insight_threshold: usize,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::standard(),
            classifier: IntentClassifier::standard(),
            rules: None,
            registry: EngineRegistry::new(),
            cache_capacity: 50,
            table_preview_rows: 10,
            volume_insight_threshold: 100,
        }
    }

    pub fn extractor(mut self, extractor: EntityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Supply the rule set. Defaults to the built-in rules when omitted.
    pub fn rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.registry.register(engine);
        self
    }

    pub fn default_engine(mut self, name: impl Into<String>) -> Self {
        self.registry.set_default(name);
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn table_preview_rows(mut self, rows: usize) -> Self {
        self.table_preview_rows = rows;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        if self.cache_capacity == 0 {
            return Err(Error::Config {
                message: "cache capacity must be at least 1".into(),
            });
        }
        let rules = RuleRepository::new(self.rules.unwrap_or_else(standard_rules))?;
        Ok(Pipeline {
            extractor: self.extractor,
            classifier: self.classifier,
            rules,
            registry: self.registry,
            dispatcher: Default::default(),
            cache: ContextCache::new(self.cache_capacity),
            synthesizer: ResponseSynthesizer::new(
                self.table_preview_rows,
                self.volume_insight_threshold,
            ),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire a pipeline from loaded configuration.
pub(crate) async fn from_config(config: &AppConfig) -> Result<Pipeline> {
    config.validate().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;

    let mut builder = Pipeline::builder()
        .cache_capacity(config.cache_capacity)
        .table_preview_rows(config.table_preview_rows);
    builder.volume_insight_threshold = config.volume_insight_threshold;

    for settings in &config.engines {
        let executor: Arc<dyn inspectql_core::EngineExecutor> = match &settings.kind {
            EngineKind::Http { url } => Arc::new(HttpExecutor::new(&settings.name, url)),
            EngineKind::Static => Arc::new(StaticExecutor::empty(&settings.name)),
            EngineKind::Sqlite { database_url } => sqlite_executor(&settings.name, database_url)?,
        };
        let mut engine = Engine::new(
            &settings.name,
            settings.priority,
            Duration::from_millis(settings.timeout_ms),
            settings.max_retries,
            executor,
        );
        engine.enabled = settings.enabled;
        builder = builder.engine(engine);
    }
    if let Some(default) = &config.default_engine {
        builder = builder.default_engine(default);
    }

    if let Some(path) = &config.rules_file {
        let rules = TomlRuleSource::new(path).load_active_rules().await?;
        builder = builder.rules(rules);
    }

    builder.build()
}

#[cfg(feature = "sqlite")]
fn sqlite_executor(
    name: &str,
    database_url: &str,
) -> Result<Arc<dyn inspectql_core::EngineExecutor>> {
    Ok(Arc::new(inspectql_engines::SqliteExecutor::connect_lazy(
        name,
        database_url,
    )?))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_executor(
    name: &str,
    _database_url: &str,
) -> Result<Arc<dyn inspectql_core::EngineExecutor>> {
    Err(Error::Config {
        message: format!(
            "engine '{name}' needs the 'sqlite' feature, which is not enabled"
        ),
    })
}
