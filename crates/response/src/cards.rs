//! Scenario card generators — pure aggregation over raw rows.
//!
//! Counts, distinct-counts, and rate computations only. No I/O, no
//! randomness, no clock: calling a generator twice on the same rows yields
//! byte-identical cards.

use inspectql_core::{Row, ScenarioCard};
use std::collections::BTreeSet;

use crate::scenario::Scenario;

/// Status markers used by the inspection dashboard.
pub const STATUS_RISK: &str = "风险";
pub const STATUS_FROZEN: &str = "冻结";
pub const STATUS_OVERDUE: &str = "超期";
pub const STATUS_PASSED: &str = "合格";
pub const STATUS_FAILED: &str = "不合格";

/// Alert threshold for defect/anomaly rates.
pub const RATE_ALERT_THRESHOLD: f64 = 0.03;

const STATUS_KEYS: &[&str] = &["status", "状态"];
const MATERIAL_KEYS: &[&str] = &["material", "material_code", "物料"];
const BATCH_KEYS: &[&str] = &["batch", "batch_no", "批次"];

/// Generate the cards for a scenario. Exhaustive over all variants.
pub fn generate(scenario: Scenario, rows: &[Row]) -> Vec<ScenarioCard> {
    match scenario {
        Scenario::Inventory => inventory_cards(rows),
        Scenario::ProductionTracking => production_cards(rows),
        Scenario::Test => test_cards(rows),
        Scenario::General => general_cards(rows),
    }
}

fn inventory_cards(rows: &[Row]) -> Vec<ScenarioCard> {
    let tag = Scenario::Inventory.tag();
    let risk = status_count(rows, STATUS_RISK);
    let frozen = status_count(rows, STATUS_FROZEN);
    vec![
        ScenarioCard::new("库存记录", rows.len(), "当前结果集", tag, "box"),
        ScenarioCard::new("物料种类", distinct_count(rows, MATERIAL_KEYS), "去重统计", tag, "layers"),
        ScenarioCard::new(
            "风险库存",
            risk,
            if risk > 0 { "需要优先处置" } else { "无风险记录" },
            tag,
            "alert",
        ),
        ScenarioCard::new(
            "冻结库存",
            frozen,
            if frozen > 0 { "待复检放行" } else { "无冻结记录" },
            tag,
            "lock",
        ),
    ]
}

fn production_cards(rows: &[Row]) -> Vec<ScenarioCard> {
    let tag = Scenario::ProductionTracking.tag();
    let overdue = status_count(rows, STATUS_OVERDUE);
    let overdue_rate = rate(overdue, rows.len());
    vec![
        ScenarioCard::new("生产记录", rows.len(), "当前结果集", tag, "factory"),
        ScenarioCard::new("批次数量", distinct_count(rows, BATCH_KEYS), "去重统计", tag, "hash"),
        ScenarioCard::new(
            "超期批次",
            overdue,
            if overdue > 0 { "超出计划周期" } else { "进度正常" },
            tag,
            "clock",
        ),
        ScenarioCard::new(
            "超期率",
            format_rate(overdue_rate),
            rate_subtitle(overdue_rate),
            tag,
            "trending-up",
        ),
    ]
}

fn test_cards(rows: &[Row]) -> Vec<ScenarioCard> {
    let tag = Scenario::Test.tag();
    let failed = status_count(rows, STATUS_FAILED);
    let failed_rate = rate(failed, rows.len());
    vec![
        ScenarioCard::new("检测记录", rows.len(), "当前结果集", tag, "clipboard"),
        ScenarioCard::new("合格数", status_count(rows, STATUS_PASSED), "检测通过", tag, "check"),
        ScenarioCard::new(
            "不合格数",
            failed,
            if failed > 0 { "需要评审" } else { "全部通过" },
            tag,
            "x-circle",
        ),
        ScenarioCard::new(
            "不合格率",
            format_rate(failed_rate),
            rate_subtitle(failed_rate),
            tag,
            "trending-down",
        ),
    ]
}

fn general_cards(rows: &[Row]) -> Vec<ScenarioCard> {
    let tag = Scenario::General.tag();
    vec![
        ScenarioCard::new("记录总数", rows.len(), "当前结果集", tag, "database"),
        ScenarioCard::new("状态种类", distinct_count(rows, STATUS_KEYS), "去重统计", tag, "tag"),
    ]
}

// --- Aggregation helpers ---

/// First string value among candidate column names.
pub fn field<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| row.get(*k).and_then(|v| v.as_str()))
}

/// Rows whose status column equals the given marker.
pub fn status_count(rows: &[Row], marker: &str) -> usize {
    rows.iter()
        .filter(|r| field(r, STATUS_KEYS) == Some(marker))
        .count()
}

/// Distinct non-empty values of the first present candidate column.
pub fn distinct_count(rows: &[Row], keys: &[&str]) -> usize {
    rows.iter()
        .filter_map(|r| field(r, keys))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn rate_subtitle(rate: f64) -> String {
    if rate > RATE_ALERT_THRESHOLD {
        format!("高于 {:.0}% 警戒线", RATE_ALERT_THRESHOLD * 100.0)
    } else {
        format!("低于 {:.0}% 警戒线", RATE_ALERT_THRESHOLD * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(fields: &[(&str, &str)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn inventory_rows() -> Vec<Row> {
        vec![
            row(&[("material", "M-1001"), ("status", "风险")]),
            row(&[("material", "M-1002"), ("status", "冻结")]),
            row(&[("material", "M-1001"), ("status", "正常")]),
        ]
    }

    #[test]
    fn inventory_cards_count_risk_and_frozen() {
        let cards = generate(Scenario::Inventory, &inventory_rows());

        let risk = cards.iter().find(|c| c.title == "风险库存").unwrap();
        assert_eq!(risk.value, json!(1));
        let frozen = cards.iter().find(|c| c.title == "冻结库存").unwrap();
        assert_eq!(frozen.value, json!(1));
        let materials = cards.iter().find(|c| c.title == "物料种类").unwrap();
        assert_eq!(materials.value, json!(2));
    }

    #[test]
    fn generators_are_deterministic() {
        let rows = inventory_rows();
        assert_eq!(
            generate(Scenario::Inventory, &rows),
            generate(Scenario::Inventory, &rows)
        );
        assert_eq!(generate(Scenario::Test, &rows), generate(Scenario::Test, &rows));
    }

    #[test]
    fn test_cards_compare_against_the_alert_threshold() {
        let mut rows: Vec<Row> = (0..97)
            .map(|_| row(&[("status", "合格"), ("batch", "B1")]))
            .collect();
        rows.push(row(&[("status", "不合格"), ("batch", "B2")]));
        rows.push(row(&[("status", "不合格"), ("batch", "B3")]));
        rows.push(row(&[("status", "不合格"), ("batch", "B4")]));

        // 3/100 = exactly the threshold; strictly-greater triggers alert
        let cards = generate(Scenario::Test, &rows);
        let rate_card = cards.iter().find(|c| c.title == "不合格率").unwrap();
        assert_eq!(rate_card.value, json!("3.0%"));
        assert!(rate_card.subtitle.contains("低于"));

        rows.push(row(&[("status", "不合格"), ("batch", "B5")]));
        let cards = generate(Scenario::Test, &rows);
        let rate_card = cards.iter().find(|c| c.title == "不合格率").unwrap();
        assert!(rate_card.subtitle.contains("高于"));
    }

    #[test]
    fn production_cards_count_distinct_batches() {
        let rows = vec![
            row(&[("batch", "B-01"), ("status", "正常")]),
            row(&[("batch", "B-01"), ("status", "超期")]),
            row(&[("batch", "B-02"), ("status", "正常")]),
        ];
        let cards = generate(Scenario::ProductionTracking, &rows);
        let batches = cards.iter().find(|c| c.title == "批次数量").unwrap();
        assert_eq!(batches.value, json!(2));
        let overdue = cards.iter().find(|c| c.title == "超期批次").unwrap();
        assert_eq!(overdue.value, json!(1));
    }

    #[test]
    fn empty_rows_produce_zeroed_cards() {
        for scenario in [
            Scenario::Inventory,
            Scenario::ProductionTracking,
            Scenario::Test,
            Scenario::General,
        ] {
            let cards = generate(scenario, &[]);
            assert!(!cards.is_empty());
            assert_eq!(cards[0].value, json!(0));
        }
    }

    #[test]
    fn cjk_column_names_are_recognized() {
        let rows = vec![row(&[("物料", "M-9"), ("状态", "风险")])];
        let cards = generate(Scenario::Inventory, &rows);
        let risk = cards.iter().find(|c| c.title == "风险库存").unwrap();
        assert_eq!(risk.value, json!(1));
        let materials = cards.iter().find(|c| c.title == "物料种类").unwrap();
        assert_eq!(materials.value, json!(1));
    }
}
