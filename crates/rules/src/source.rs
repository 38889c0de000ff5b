//! Rule sources — where rule definitions come from.
//!
//! The repository does not assume any storage technology; anything that can
//! produce an ordered `Vec<Rule>` is a valid source. The TOML file source
//! covers the common deployment; the static source covers tests and
//! embedded defaults.

use async_trait::async_trait;
use inspectql_core::{Rule, RuleError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the active rule set.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn load_active_rules(&self) -> Result<Vec<Rule>, RuleError>;
}

/// A fixed, in-memory rule set. Used in tests and as the embedded default.
pub struct StaticRuleSource {
    rules: Vec<Rule>,
}

impl StaticRuleSource {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl RuleSource for StaticRuleSource {
    async fn load_active_rules(&self) -> Result<Vec<Rule>, RuleError> {
        Ok(self.rules.clone())
    }
}

/// On-disk shape of a rule file: a `[[rules]]` array of tables.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Loads rules from a TOML file. Re-reading the file between dispatch
/// cycles is how hot reload works.
pub struct TomlRuleSource {
    path: PathBuf,
}

impl TomlRuleSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RuleSource for TomlRuleSource {
    async fn load_active_rules(&self) -> Result<Vec<Rule>, RuleError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RuleError::SourceUnavailable(format!("{}: {e}", self.path.display())))?;
        let file: RuleFile =
            toml::from_str(&raw).map_err(|e| RuleError::Parse(e.to_string()))?;
        info!(path = %self.path.display(), count = file.rules.len(), "rules loaded from file");
        Ok(file.rules)
    }
}

/// The built-in rule set for the inspection dashboard. Deployments replace
/// it with a rule file; tests and demos use it as-is.
pub fn standard_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "inventory_by_factory".into(),
            name: "库存查询".into(),
            trigger_words: vec!["库存".into(), "inventory".into()],
            priority: 10,
            category: "inventory".into(),
            query_template:
                "SELECT * FROM inventory WHERE factory = '{factory}' AND status = '{status}'"
                    .into(),
            example_query: "查询深圳工厂的库存".into(),
            is_default: false,
        },
        Rule {
            id: "production_tracking".into(),
            name: "生产追踪".into(),
            trigger_words: vec![
                "生产".into(),
                "批次".into(),
                "追踪".into(),
                "production".into(),
                "batch".into(),
            ],
            priority: 20,
            category: "production_tracking".into(),
            query_template:
                "SELECT * FROM production_orders WHERE factory = '{factory}' AND period = '{time_range}'"
                    .into(),
            example_query: "本月深圳工厂的生产批次".into(),
            is_default: false,
        },
        Rule {
            id: "test_records".into(),
            name: "检测记录".into(),
            trigger_words: vec![
                "检测".into(),
                "试验".into(),
                "合格".into(),
                "test".into(),
            ],
            priority: 30,
            category: "test".into(),
            query_template:
                "SELECT * FROM test_records WHERE material = '{material}' AND status = '{status}'"
                    .into(),
            example_query: "物料 M-1001 的检测记录".into(),
            is_default: false,
        },
        Rule {
            id: "general_overview".into(),
            name: "综合概览".into(),
            trigger_words: vec![],
            priority: 1_000,
            category: "general".into(),
            query_template: "SELECT * FROM inspection_summary".into(),
            example_query: "最近的质检情况".into(),
            is_default: true,
        },
    ]
}
