//! The response synthesizer — raw rows into the structured multi-part
//! response, plus the graceful-degradation responses for every failure
//! path (suggestion, not-understood, apology).

use inspectql_core::response::{ActionLink, ChartDescriptor, ChartPoint, KeyMetric, Summary};
use inspectql_core::{ResponseType, Row, Rule, StructuredResponse, TablePayload};
use std::collections::BTreeMap;
use tracing::debug;

use crate::cards::{self, RATE_ALERT_THRESHOLD, STATUS_RISK};
use crate::scenario::Scenario;

const STATUS_KEYS: &[&str] = &["status", "状态"];
const GROUP_KEYS: &[&str] = &["factory", "工厂", "material", "物料", "supplier", "供应商"];
const MAX_CHART_GROUPS: usize = 10;

/// Turns rows into a structured response. Deterministic given identical
/// `rule` and `rows`.
pub struct ResponseSynthesizer {
    /// Table preview cap
    table_preview_rows: usize,

    /// Row count above which a "narrow your filter" insight fires
    volume_insight_threshold: usize,
}

impl ResponseSynthesizer {
    pub fn new(table_preview_rows: usize, volume_insight_threshold: usize) -> Self {
        Self {
            table_preview_rows,
            volume_insight_threshold,
        }
    }

    /// Synthesize a data response. Metadata (engine, timing) is filled in
    /// by the caller, which owns that information.
    pub fn synthesize(
        &self,
        rule: &Rule,
        normalized_text: &str,
        rows: &[Row],
    ) -> StructuredResponse {
        let scenario = Scenario::detect(&rule.category, normalized_text);
        debug!(rule = %rule.id, scenario = scenario.tag(), rows = rows.len(), "synthesizing response");

        let cards = cards::generate(scenario, rows);
        let key_metrics = cards
            .iter()
            .map(|c| KeyMetric {
                label: c.title.clone(),
                value: c.value.clone(),
            })
            .collect();

        StructuredResponse {
            response_type: ResponseType::Data,
            title: rule.name.clone(),
            success: true,
            message: "查询成功".into(),
            summary: Summary {
                text: summary_text(scenario, rows.len()),
                key_metrics,
            },
            charts: self.charts(rows),
            table: Some(self.table(rows)),
            insights: self.insights(rows),
            actions: scenario_actions(scenario),
            cards,
            metadata: Default::default(),
        }
    }

    /// Classification miss: list example queries the classifier does know.
    pub fn suggestion(examples: &[String]) -> StructuredResponse {
        StructuredResponse {
            response_type: ResponseType::Suggestion,
            title: "没有理解这个问题".into(),
            success: false,
            message: "可以试试下面这些问法".into(),
            actions: examples
                .iter()
                .map(|e| ActionLink {
                    label: e.clone(),
                    action: format!("ask:{e}"),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// No rule matched and no default rule is configured.
    pub fn not_understood() -> StructuredResponse {
        StructuredResponse {
            response_type: ResponseType::Error,
            title: "无法理解的查询".into(),
            success: false,
            message: "没有找到匹配的查询规则，请换一种问法".into(),
            ..Default::default()
        }
    }

    /// Every engine failed — the terminal apology.
    pub fn apology(detail: &str) -> StructuredResponse {
        StructuredResponse {
            response_type: ResponseType::Error,
            title: "数据源暂时不可用".into(),
            success: false,
            message: format!("所有数据源均未响应，请稍后重试（{detail}）"),
            ..Default::default()
        }
    }

    /// Up to two grouped-count chart descriptors: status distribution and
    /// the first present dimension column.
    fn charts(&self, rows: &[Row]) -> Vec<ChartDescriptor> {
        let mut charts = Vec::with_capacity(2);
        if let Some(data) = grouped_counts(rows, STATUS_KEYS) {
            charts.push(ChartDescriptor {
                chart_type: "pie".into(),
                title: "状态分布".into(),
                data,
            });
        }
        if let Some(data) = grouped_counts(rows, GROUP_KEYS) {
            charts.push(ChartDescriptor {
                chart_type: "bar".into(),
                title: "维度分布".into(),
                data,
            });
        }
        charts
    }

    fn table(&self, rows: &[Row]) -> TablePayload {
        let columns = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        TablePayload {
            columns,
            rows: rows.iter().take(self.table_preview_rows).cloned().collect(),
            total_rows: rows.len(),
        }
    }

    fn insights(&self, rows: &[Row]) -> Vec<String> {
        let mut insights = Vec::new();
        if rows.is_empty() {
            insights.push("未找到匹配记录，请检查筛选条件".into());
            return insights;
        }
        if rows.len() > self.volume_insight_threshold {
            insights.push(format!(
                "结果共 {} 条，超过 {} 条，建议增加筛选条件",
                rows.len(),
                self.volume_insight_threshold
            ));
        }
        let risk = cards::status_count(rows, STATUS_RISK);
        let risk_rate = risk as f64 / rows.len() as f64;
        if risk_rate > RATE_ALERT_THRESHOLD {
            insights.push(format!(
                "风险记录占比 {:.1}%，超过 {:.0}% 警戒线，建议优先处置",
                risk_rate * 100.0,
                RATE_ALERT_THRESHOLD * 100.0
            ));
        }
        insights
    }
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

fn summary_text(scenario: Scenario, count: usize) -> String {
    format!("共找到 {} 条{}记录", count, scenario.record_label())
}

/// Count rows per value of the first present candidate column. `None` when
/// no row carries any of the columns.
fn grouped_counts(rows: &[Row], keys: &[&str]) -> Option<Vec<ChartPoint>> {
    let key = keys
        .iter()
        .find(|k| rows.iter().any(|r| r.get(**k).and_then(|v| v.as_str()).is_some()))?;
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in rows {
        if let Some(value) = row.get(*key).and_then(|v| v.as_str()) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    let mut data: Vec<ChartPoint> = counts
        .into_iter()
        .map(|(label, value)| ChartPoint { label, value })
        .collect();
    // Largest groups first; BTreeMap input keeps equal counts in a stable
    // alphabetical order, so the output is deterministic.
    data.sort_by(|a, b| b.value.cmp(&a.value).then(a.label.cmp(&b.label)));
    data.truncate(MAX_CHART_GROUPS);
    Some(data)
}

fn scenario_actions(scenario: Scenario) -> Vec<ActionLink> {
    let mut actions = vec![ActionLink {
        label: "导出明细".into(),
        action: "export_table".into(),
    }];
    match scenario {
        Scenario::Inventory => actions.push(ActionLink {
            label: "查看风险物料".into(),
            action: "filter:status=风险".into(),
        }),
        Scenario::ProductionTracking => actions.push(ActionLink {
            label: "查看超期批次".into(),
            action: "filter:status=超期".into(),
        }),
        Scenario::Test => actions.push(ActionLink {
            label: "查看不合格记录".into(),
            action: "filter:status=不合格".into(),
        }),
        Scenario::General => {}
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(category: &str) -> Rule {
        Rule {
            id: "r".into(),
            name: "库存查询".into(),
            trigger_words: vec!["库存".into()],
            priority: 10,
            category: category.into(),
            query_template: "SELECT 1".into(),
            example_query: String::new(),
            is_default: false,
        }
    }

    fn row(fields: &[(&str, &str)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn inventory_rows() -> Vec<Row> {
        vec![
            row(&[("material", "M-1"), ("factory", "深圳"), ("status", "风险")]),
            row(&[("material", "M-2"), ("factory", "深圳"), ("status", "冻结")]),
            row(&[("material", "M-3"), ("factory", "东莞"), ("status", "正常")]),
        ]
    }

    #[test]
    fn data_response_carries_all_parts() {
        let synth = ResponseSynthesizer::default();
        let resp = synth.synthesize(&rule("inventory"), "查询库存", &inventory_rows());

        assert!(resp.success);
        assert_eq!(resp.response_type, ResponseType::Data);
        assert_eq!(resp.title, "库存查询");
        assert!(resp.summary.text.contains("3 条"));
        assert_eq!(resp.cards.len(), 4);
        assert_eq!(resp.summary.key_metrics.len(), 4);
        assert_eq!(resp.charts.len(), 2);
        assert_eq!(resp.table.as_ref().unwrap().total_rows, 3);
        assert!(resp.actions.iter().any(|a| a.action == "export_table"));
    }

    #[test]
    fn charts_group_by_status_and_dimension() {
        let synth = ResponseSynthesizer::default();
        let resp = synth.synthesize(&rule("inventory"), "查询库存", &inventory_rows());

        let status_chart = &resp.charts[0];
        assert_eq!(status_chart.title, "状态分布");
        assert_eq!(status_chart.data.len(), 3);

        let dim_chart = &resp.charts[1];
        assert_eq!(dim_chart.chart_type, "bar");
        let shenzhen = dim_chart.data.iter().find(|p| p.label == "深圳").unwrap();
        assert_eq!(shenzhen.value, 2);
    }

    #[test]
    fn table_preview_is_capped() {
        let synth = ResponseSynthesizer::new(5, 100);
        let rows: Vec<Row> = (0..20)
            .map(|i| {
                let material = format!("M-{i}");
                row(&[("material", material.as_str()), ("status", "正常")])
            })
            .collect();
        let resp = synth.synthesize(&rule("inventory"), "库存", &rows);
        let table = resp.table.unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.total_rows, 20);
        assert!(table.columns.contains(&"material".to_string()));
    }

    #[test]
    fn volume_insight_fires_above_threshold() {
        let synth = ResponseSynthesizer::new(10, 5);
        let rows: Vec<Row> = (0..6).map(|_| row(&[("status", "正常")])).collect();
        let resp = synth.synthesize(&rule("inventory"), "库存", &rows);
        assert!(resp.insights.iter().any(|i| i.contains("建议增加筛选条件")));
    }

    #[test]
    fn risk_rate_insight_fires_above_alert_line() {
        let synth = ResponseSynthesizer::default();
        let resp = synth.synthesize(&rule("inventory"), "库存", &inventory_rows());
        // 1/3 risk rate is far above 3%
        assert!(resp.insights.iter().any(|i| i.contains("警戒线")));
    }

    #[test]
    fn empty_rows_yield_an_empty_result_insight() {
        let synth = ResponseSynthesizer::default();
        let resp = synth.synthesize(&rule("inventory"), "库存", &[]);
        assert!(resp.insights[0].contains("未找到"));
        assert!(resp.charts.is_empty());
    }

    #[test]
    fn synthesis_is_deterministic() {
        let synth = ResponseSynthesizer::default();
        let rows = inventory_rows();
        let a = synth.synthesize(&rule("inventory"), "库存", &rows);
        let b = synth.synthesize(&rule("inventory"), "库存", &rows);
        assert_eq!(a, b);
    }

    #[test]
    fn suggestion_response_lists_examples() {
        let resp = ResponseSynthesizer::suggestion(&["查询库存".into(), "检测趋势".into()]);
        assert!(!resp.success);
        assert_eq!(resp.response_type, ResponseType::Suggestion);
        assert_eq!(resp.actions.len(), 2);
        assert_eq!(resp.actions[0].action, "ask:查询库存");
    }

    #[test]
    fn failure_responses_are_marked_unsuccessful() {
        assert!(!ResponseSynthesizer::not_understood().success);
        let apology = ResponseSynthesizer::apology("timeout");
        assert!(!apology.success);
        assert!(apology.message.contains("timeout"));
    }
}
