//! Configuration loading and validation for inspectql.
//!
//! Loads from a TOML file with `INSPECTQL_*` environment variable
//! overrides. All settings are validated at startup; a bad configuration
//! aborts initialization rather than mis-resolving at query time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {detail}")]
    Io { path: String, detail: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Engine tried first when neither the caller nor the intent picks one
    #[serde(default)]
    pub default_engine: Option<String>,

    /// Context cache bound (entries, process-wide)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Table preview cap in synthesized responses
    #[serde(default = "default_table_preview_rows")]
    pub table_preview_rows: usize,

    /// Row count above which the "narrow your filter" insight fires
    #[serde(default = "default_volume_insight_threshold")]
    pub volume_insight_threshold: usize,

    /// Rule definitions file (TOML). Optional: rules can also be supplied
    /// programmatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    /// Configured backend engines
    #[serde(default)]
    pub engines: Vec<EngineSettings>,
}

fn default_cache_capacity() -> usize {
    50
}
fn default_table_preview_rows() -> usize {
    10
}
fn default_volume_insight_threshold() -> usize {
    100
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_enabled() -> bool {
    true
}

/// One engine entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub name: String,

    /// Backend technology and its address
    #[serde(flatten)]
    pub kind: EngineKind,

    /// Lower value = earlier in the fallback chain
    #[serde(default)]
    pub priority: i32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Which executor backs an engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineKind {
    /// POST the dispatch request to a query service
    Http { url: String },

    /// Run the bound template against a SQLite database
    Sqlite { database_url: String },

    /// Canned rows (tests, demos)
    Static,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_engine: None,
            cache_capacity: default_cache_capacity(),
            table_preview_rows: default_table_preview_rows(),
            volume_insight_threshold: default_volume_insight_threshold(),
            rules_file: None,
            engines: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, then apply environment overrides and
    /// validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let mut config: AppConfig =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        info!(path = %path.display(), engines = config.engines.len(), "configuration loaded");
        Ok(config)
    }

    /// `INSPECTQL_DEFAULT_ENGINE` and `INSPECTQL_CACHE_CAPACITY` override
    /// the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(engine) = std::env::var("INSPECTQL_DEFAULT_ENGINE") {
            if !engine.is_empty() {
                self.default_engine = Some(engine);
            }
        }
        if let Ok(capacity) = std::env::var("INSPECTQL_CACHE_CAPACITY") {
            if let Ok(n) = capacity.parse::<usize>() {
                self.cache_capacity = n;
            }
        }
    }

    /// Startup checks. These are the only errors allowed to abort
    /// initialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be at least 1".into()));
        }
        if self.table_preview_rows == 0 {
            return Err(ConfigError::Invalid("table_preview_rows must be at least 1".into()));
        }
        for (i, engine) in self.engines.iter().enumerate() {
            if engine.name.is_empty() {
                return Err(ConfigError::Invalid(format!("engine #{i} has an empty name")));
            }
            if self.engines[..i].iter().any(|e| e.name == engine.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate engine name: {}",
                    engine.name
                )));
            }
        }
        if let Some(default) = &self.default_engine {
            if !self.engines.is_empty() && !self.engines.iter().any(|e| &e.name == default) {
                return Err(ConfigError::Invalid(format!(
                    "default_engine '{default}' is not a configured engine"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn engine(name: &str) -> EngineSettings {
        EngineSettings {
            name: name.into(),
            kind: EngineKind::Static,
            priority: 0,
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            enabled: true,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.table_preview_rows, 10);
    }

    #[test]
    fn loads_engine_table_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
default_engine = "primary_sql"
cache_capacity = 25

[[engines]]
name = "primary_sql"
kind = "sqlite"
database_url = "sqlite://inspection.db"
priority = 1
timeout_ms = 3000
max_retries = 1

[[engines]]
name = "search_api"
kind = "http"
url = "http://localhost:9200/query"
priority = 2
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.default_engine.as_deref(), Some("primary_sql"));
        assert_eq!(config.cache_capacity, 25);
        assert_eq!(config.engines.len(), 2);
        match &config.engines[0].kind {
            EngineKind::Sqlite { database_url } => {
                assert_eq!(database_url, "sqlite://inspection.db")
            }
            other => panic!("expected sqlite engine, got: {other:?}"),
        }
        assert_eq!(config.engines[1].timeout_ms, 5_000);
    }

    #[test]
    fn zero_cache_capacity_is_invalid() {
        let config = AppConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_engine_names_are_invalid() {
        let config = AppConfig {
            engines: vec![engine("a"), engine("a")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_default_engine_is_invalid() {
        let config = AppConfig {
            default_engine: Some("missing".into()),
            engines: vec![engine("a")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "engines = 7").unwrap();
        match AppConfig::load(file.path()) {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expected Parse error, got: {other:?}"),
        }
    }
}
