//! The structured response shape exposed to the hosting service layer.
//!
//! Every dispatch cycle ends in one of these, including failures: the
//! pipeline converts internal errors into a response with `success: false`
//! and a human-readable message rather than propagating them.

use serde::{Deserialize, Serialize};

/// What kind of response this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// A normal data answer
    #[default]
    Data,
    /// Classification missed; the response lists example queries
    Suggestion,
    /// The query could not be understood or every engine failed
    Error,
}

/// A single headline metric in the summary block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub label: String,
    pub value: serde_json::Value,
}

/// The summary block: headline text plus key metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_metrics: Vec<KeyMetric>,
}

/// One point in a grouped-count chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

/// A chart descriptor: grouped counts the UI can render directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    /// Renderer hint ("bar", "pie")
    pub chart_type: String,
    pub title: String,
    pub data: Vec<ChartPoint>,
}

/// A capped table preview of the raw rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub columns: Vec<String>,
    pub rows: Vec<crate::engine::Row>,

    /// How many rows the engine actually returned (>= rows.len())
    pub total_rows: usize,
}

/// A follow-up action the UI can offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLink {
    pub label: String,
    pub action: String,
}

/// A scenario card: one small aggregated statistic. Always derived fresh
/// from the current result set, never cached or mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCard {
    pub title: String,
    pub value: serde_json::Value,

    #[serde(default)]
    pub subtitle: String,

    /// Scenario tag ("inventory", "production_tracking", "test", "general")
    pub category: String,

    /// Display hint for the UI
    #[serde(default)]
    pub icon: String,
}

impl ScenarioCard {
    pub fn new(
        title: impl Into<String>,
        value: impl Into<serde_json::Value>,
        subtitle: impl Into<String>,
        category: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            subtitle: subtitle.into(),
            category: category.into(),
            icon: icon.into(),
        }
    }
}

/// Which engine answered, and how the cycle went.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Name of the engine that produced the rows, if any did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// True when the answering engine was not the first candidate
    #[serde(default)]
    pub is_fallback: bool,

    /// The classified intent name, if classification succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// Classifier confidence in [0, 1]
    #[serde(default)]
    pub confidence: f32,

    /// Wall-clock duration of the whole resolve cycle
    #[serde(default)]
    pub response_time_ms: u64,
}

/// The full multi-part response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResponse {
    #[serde(rename = "type", default)]
    pub response_type: ResponseType,

    pub title: String,

    /// False when the cycle ended in an apology/suggestion path
    pub success: bool,

    /// Human-readable outcome message
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub summary: Summary,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TablePayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<ScenarioCard>,

    #[serde(default)]
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_with_renamed_type_field() {
        let resp = StructuredResponse {
            response_type: ResponseType::Suggestion,
            title: "试试这些问题".into(),
            success: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"suggestion\""));
        assert!(json.contains("\"success\":false"));
    }

    #[test]
    fn empty_collections_are_skipped() {
        let resp = StructuredResponse::default();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("charts"));
        assert!(!json.contains("cards"));
        assert!(!json.contains("insights"));
    }

    #[test]
    fn card_constructor_fills_all_fields() {
        let card = ScenarioCard::new("风险库存", 3, "需要复检", "inventory", "alert");
        assert_eq!(card.title, "风险库存");
        assert_eq!(card.value, serde_json::json!(3));
        assert_eq!(card.category, "inventory");
    }
}
