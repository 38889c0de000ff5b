//! Scenario tagging — which card generator a result set belongs to.
//!
//! A tagged variant per scenario, dispatched with an exhaustive match:
//! adding a scenario without wiring its cards is a compile error, not a
//! silent fallthrough to the general case.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Inventory,
    ProductionTracking,
    Test,
    General,
}

impl Scenario {
    /// Derive the scenario from the rule's category, falling back to the
    /// query text when the category is uninformative.
    pub fn detect(category: &str, normalized_text: &str) -> Self {
        Self::from_label(category)
            .or_else(|| Self::from_label(normalized_text))
            .unwrap_or(Scenario::General)
    }

    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("inventory") || label.contains("库存") {
            Some(Scenario::Inventory)
        } else if label.contains("production")
            || label.contains("tracking")
            || label.contains("生产")
            || label.contains("追踪")
        {
            Some(Scenario::ProductionTracking)
        } else if label.contains("test") || label.contains("检测") || label.contains("试验") {
            Some(Scenario::Test)
        } else {
            None
        }
    }

    /// The category tag carried on cards and in serialized responses.
    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::Inventory => "inventory",
            Scenario::ProductionTracking => "production_tracking",
            Scenario::Test => "test",
            Scenario::General => "general",
        }
    }

    /// Human-readable record label for summaries.
    pub fn record_label(&self) -> &'static str {
        match self {
            Scenario::Inventory => "库存",
            Scenario::ProductionTracking => "生产",
            Scenario::Test => "检测",
            Scenario::General => "",
        }
    }
}
