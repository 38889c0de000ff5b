//! Entity extraction — pulls typed values out of normalized query text.
//!
//! One regex per entity kind, compiled once at construction. For each kind
//! the first match wins; if the pattern defines capture groups, the first
//! non-empty group is taken instead of the whole match. Extraction never
//! fails — an empty `EntitySet` is a valid result.

use inspectql_core::{EntityKind, EntitySet, Error, Result};
use regex::Regex;
use tracing::debug;

/// Extracts typed entities via per-kind patterns.
pub struct EntityExtractor {
    patterns: Vec<(EntityKind, Regex)>,
}

impl EntityExtractor {
    /// Build an extractor from explicit `(kind, pattern)` pairs.
    ///
    /// An invalid pattern aborts construction — this is startup
    /// misconfiguration, the one place errors are allowed to surface.
    pub fn new(patterns: Vec<(EntityKind, &str)>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for (kind, source) in patterns {
            let re = Regex::new(source).map_err(|e| Error::Config {
                message: format!("invalid entity pattern for {:?}: {e}", kind),
            })?;
            compiled.push((kind, re));
        }
        Ok(Self { patterns: compiled })
    }

    /// The default pattern set for the quality-inspection query corpus.
    /// Bilingual: the dashboard's users mix Chinese and English freely.
    pub fn standard() -> Self {
        // Patterns here are fixed literals; compilation cannot fail.
        // The CJK name captures are pinned to two characters: location and
        // supplier names in the inspection corpus are two-character words,
        // and a variable-width capture would swallow the verb prefix under
        // leftmost-match semantics.
        Self::new(vec![
            (
                EntityKind::Factory,
                r"(\p{Han}{2})(?:工厂|车间)|factory\s+([a-z0-9_-]+)",
            ),
            (
                EntityKind::Supplier,
                r"(\p{Han}{2})供应商|supplier\s+([a-z0-9_-]+)",
            ),
            (
                EntityKind::Material,
                r"物料\s*([a-z0-9][a-z0-9-]*)|material\s+([a-z0-9][a-z0-9-]*)",
            ),
            (
                EntityKind::Status,
                r"(风险|冻结|正常|合格|不合格|超期|risk|frozen|normal|passed|failed|overdue)",
            ),
            (
                EntityKind::ChartType,
                r"(柱状图|饼图|折线图|bar|pie|line)",
            ),
            (
                EntityKind::TimeRange,
                r"(今天|昨天|本周|本月|上月|最近\s*\d+\s*天|today|yesterday|this week|this month|last month)",
            ),
        ])
        .unwrap_or_else(|_| unreachable!("standard entity patterns are valid"))
    }

    /// Extract entities from normalized text.
    pub fn extract(&self, text: &str) -> EntitySet {
        let mut set = EntitySet::new();
        for (kind, re) in &self.patterns {
            if let Some(caps) = re.captures(text) {
                // First non-empty capture group, or the whole match when the
                // pattern defines none. Not plain group 1: the bilingual
                // patterns are alternations, and in the English branch group
                // 1 is unmatched or empty.
                let value = (1..caps.len())
                    .filter_map(|i| caps.get(i))
                    .map(|m| m.as_str())
                    .find(|s| !s.is_empty())
                    .unwrap_or_else(|| caps.get(0).map(|m| m.as_str()).unwrap_or(""));
                if !value.is_empty() {
                    debug!(kind = ?kind, value, "entity extracted");
                    set.insert(*kind, value);
                }
            }
        }
        set
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_factory_from_cjk_text() {
        let ex = EntityExtractor::standard();
        let set = ex.extract("查询深圳工厂的库存");
        assert_eq!(set.get(EntityKind::Factory), Some("深圳"));
    }

    #[test]
    fn extracts_multiple_kinds() {
        let ex = EntityExtractor::standard();
        let set = ex.extract("本月深圳工厂风险物料 m-1042");
        assert_eq!(set.get(EntityKind::Factory), Some("深圳"));
        assert_eq!(set.get(EntityKind::Status), Some("风险"));
        assert_eq!(set.get(EntityKind::Material), Some("m-1042"));
        assert_eq!(set.get(EntityKind::TimeRange), Some("本月"));
    }

    #[test]
    fn extracts_english_variants() {
        let ex = EntityExtractor::standard();
        let set = ex.extract("show frozen inventory for factory sz-01 as a pie chart");
        assert_eq!(set.get(EntityKind::Factory), Some("sz-01"));
        assert_eq!(set.get(EntityKind::Status), Some("frozen"));
        assert_eq!(set.get(EntityKind::ChartType), Some("pie"));
    }

    #[test]
    fn no_match_yields_empty_set() {
        let ex = EntityExtractor::standard();
        let set = ex.extract("你好");
        assert!(set.is_empty());
    }

    #[test]
    fn first_match_wins_per_kind() {
        let ex = EntityExtractor::standard();
        let set = ex.extract("对比深圳工厂和东莞工厂");
        assert_eq!(set.get(EntityKind::Factory), Some("深圳"));
    }

    #[test]
    fn empty_leading_group_is_skipped_for_the_next_capture() {
        // Group 1 participates with an empty match; group 2 carries the value.
        let ex = EntityExtractor::new(vec![(EntityKind::Material, r"(m*)(\d+)")]).unwrap();
        let set = ex.extract("batch 1042");
        assert_eq!(set.get(EntityKind::Material), Some("1042"));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let result = EntityExtractor::new(vec![(EntityKind::Factory, "(unclosed")]);
        assert!(result.is_err());
    }
}
