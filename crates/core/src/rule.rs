//! Query rules — trigger-word-guarded, prioritized mappings from a query
//! shape to a parameterized query template.
//!
//! Rules are loaded once at startup from a `RuleSource` (see the rules
//! crate), are read-only during a dispatch cycle, and may be hot-reloaded
//! between cycles.

use serde::{Deserialize, Serialize};

/// Sentinel bound to a template parameter when no entity of the matching
/// kind was extracted. Executors treat it as "no filter".
pub const UNSET_PARAM: &str = "__unset__";

/// A single query rule.
///
/// Lower `priority` means higher precedence. The rule with non-empty
/// trigger intersection and the smallest priority wins resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable id (e.g., "inventory_by_factory")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Words that activate this rule when found in the query text
    pub trigger_words: Vec<String>,

    /// Lower value = higher precedence
    pub priority: i32,

    /// Scenario category (e.g., "inventory", "production_tracking", "test")
    pub category: String,

    /// Parameterized query template with `{factory}`-style placeholders
    pub query_template: String,

    /// An example query this rule is meant to answer, surfaced in
    /// suggestion responses
    #[serde(default)]
    pub example_query: String,

    /// Marks the designated last-resort rule used when nothing else matches
    #[serde(default)]
    pub is_default: bool,
}

impl Rule {
    /// Whether any trigger word occurs in the normalized query text.
    ///
    /// CJK triggers match by containment — whitespace tokenization does not
    /// segment CJK words. All-ASCII triggers additionally require word
    /// boundaries, so `test` does not fire inside `latest`.
    pub fn matches(&self, normalized_text: &str) -> bool {
        self.trigger_words.iter().any(|w| {
            if w.is_empty() {
                return false;
            }
            let w = w.to_lowercase();
            if w.is_ascii() {
                ascii_word_match(normalized_text, &w)
            } else {
                normalized_text.contains(w.as_str())
            }
        })
    }
}

/// Containment with ASCII word boundaries: an occurrence counts only when
/// it is not flanked by ASCII alphanumerics. `word` must be ASCII, so all
/// byte offsets below sit on char boundaries.
fn ascii_word_match(text: &str, word: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = text[from..].find(word) {
        let start = from + pos;
        let end = start + word.len();
        let boundary_before = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        let boundary_after = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
        from = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(triggers: &[&str]) -> Rule {
        Rule {
            id: "r".into(),
            name: "r".into(),
            trigger_words: triggers.iter().map(|s| s.to_string()).collect(),
            priority: 10,
            category: "inventory".into(),
            query_template: "SELECT * FROM inventory".into(),
            example_query: String::new(),
            is_default: false,
        }
    }

    #[test]
    fn matches_cjk_substring() {
        let r = rule(&["库存", "物料"]);
        assert!(r.matches("查询深圳工厂的库存"));
        assert!(!r.matches("查询供应商信息"));
    }

    #[test]
    fn matches_is_case_insensitive_on_triggers() {
        let r = rule(&["Inventory"]);
        assert!(r.matches("show inventory for factory a"));
    }

    #[test]
    fn empty_trigger_never_matches() {
        let r = rule(&[""]);
        assert!(!r.matches("anything"));
    }

    #[test]
    fn ascii_trigger_requires_word_boundaries() {
        let r = rule(&["test"]);
        assert!(!r.matches("show the latest batches"));
        assert!(!r.matches("pending retests"));
        assert!(r.matches("show test records"));
        assert!(r.matches("test"));
        assert!(r.matches("re-run test-42"));
    }

    #[test]
    fn cjk_trigger_still_matches_by_containment() {
        let r = rule(&["检测"]);
        assert!(r.matches("最新检测结果"));
    }
}
