//! The engine registry — configured backends and their dispatch order.
//!
//! Engines are static per process lifetime except for the explicit
//! enable/disable toggle. The registry is read-mostly; callers synchronize
//! reloads externally (the pipeline never mutates it mid-cycle).

use inspectql_core::EngineExecutor;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A configured backend engine.
#[derive(Clone)]
pub struct Engine {
    /// Unique engine name (e.g., "primary_sql", "search_api")
    pub name: String,

    /// Lower value = earlier in the fallback chain
    pub priority: i32,

    /// Per-attempt timeout
    pub timeout: Duration,

    /// Retries on the same engine before moving down the chain
    pub max_retries: u32,

    /// Disabled engines are skipped everywhere
    pub enabled: bool,

    /// The backend behind this engine — opaque to the dispatcher
    pub executor: Arc<dyn EngineExecutor>,
}

impl Engine {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        timeout: Duration,
        max_retries: u32,
        executor: Arc<dyn EngineExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            timeout,
            max_retries,
            enabled: true,
            executor,
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Holds configured engines and the default choice.
pub struct EngineRegistry {
    engines: Vec<Engine>,
    default_engine: Option<String>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
            default_engine: None,
        }
    }

    /// Register an engine. The first registered engine becomes the default
    /// unless one is set explicitly.
    pub fn register(&mut self, engine: Engine) {
        if self.default_engine.is_none() {
            self.default_engine = Some(engine.name.clone());
        }
        info!(engine = %engine.name, priority = engine.priority, "engine registered");
        self.engines.push(engine);
    }

    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_engine = Some(name.into());
    }

    pub fn default_engine(&self) -> Option<&str> {
        self.default_engine.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Engine> {
        self.engines.iter().find(|e| e.name == name)
    }

    /// Toggle an engine. Returns false if the name is unknown.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.engines.iter_mut().find(|e| e.name == name) {
            Some(engine) => {
                engine.enabled = enabled;
                info!(engine = %name, enabled, "engine toggled");
                true
            }
            None => false,
        }
    }

    /// Enabled engines in ascending priority order — the fallback chain.
    /// A strict function of priority, independent of call history.
    pub fn enabled_by_priority(&self) -> Vec<&Engine> {
        let mut engines: Vec<&Engine> = self.engines.iter().filter(|e| e.enabled).collect();
        engines.sort_by_key(|e| e.priority);
        engines
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
