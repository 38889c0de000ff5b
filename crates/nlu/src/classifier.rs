//! Intent classification — a deterministic scoring function, not a model.
//!
//! Every configured intent is scored as `10 * keyword_matches +
//! 20 * pattern_matches`; zero-score intents are discarded; the highest
//! score wins with ties broken by configuration order. A miss returns
//! `None`, which callers treat as "offer suggestions", never as an error.

use inspectql_core::{Error, Intent, Result};
use regex::Regex;
use tracing::debug;

const KEYWORD_WEIGHT: u32 = 10;
const PATTERN_WEIGHT: u32 = 20;

/// One configured intent: keywords, patterns, and routing hints.
pub struct IntentDefinition {
    pub name: String,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,

    /// Engine this intent prefers, consulted by the dispatcher when the
    /// caller does not force one
    pub preferred_engine: Option<String>,

    /// Example queries surfaced in suggestion responses on a miss
    pub examples: Vec<String>,
}

impl IntentDefinition {
    /// Build a definition, compiling patterns. Invalid patterns abort
    /// startup.
    pub fn new(
        name: impl Into<String>,
        keywords: &[&str],
        patterns: &[&str],
        preferred_engine: Option<&str>,
        examples: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        let mut compiled = Vec::with_capacity(patterns.len());
        for source in patterns {
            let re = Regex::new(source).map_err(|e| Error::Config {
                message: format!("invalid pattern for intent '{name}': {e}"),
            })?;
            compiled.push(re);
        }
        Ok(Self {
            name,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            patterns: compiled,
            preferred_engine: preferred_engine.map(String::from),
            examples: examples.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Score this intent against normalized text, returning the raw score
    /// and which keywords/patterns matched.
    fn score(&self, text: &str) -> (u32, Vec<String>) {
        let mut matched = Vec::new();
        let mut score = 0u32;
        for kw in &self.keywords {
            if text.contains(kw.as_str()) {
                score += KEYWORD_WEIGHT;
                matched.push(kw.clone());
            }
        }
        for re in &self.patterns {
            if re.is_match(text) {
                score += PATTERN_WEIGHT;
                matched.push(re.as_str().to_string());
            }
        }
        (score, matched)
    }
}

/// Scores query text against a fixed, ordered set of intent definitions.
pub struct IntentClassifier {
    intents: Vec<IntentDefinition>,
}

impl IntentClassifier {
    pub fn new(intents: Vec<IntentDefinition>) -> Self {
        Self { intents }
    }

    /// The default intent set for the quality-inspection dashboard.
    pub fn standard() -> Self {
        let intents = vec![
            IntentDefinition::new(
                "data_query",
                &[
                    "查询", "查看", "显示", "库存", "物料", "批次", "记录", "query", "show",
                    "list", "inventory",
                ],
                &[r"查.{0,6}(库存|物料|批次|记录)"],
                None,
                &["查询深圳工厂的库存", "显示本月的检测记录"],
            ),
            IntentDefinition::new(
                "chart_request",
                &["图", "图表", "趋势", "分布", "占比", "chart", "trend"],
                &[r"(柱状图|饼图|折线图|bar|pie|line)"],
                None,
                &["按状态生成库存分布饼图", "最近30天的检测趋势图"],
            ),
            IntentDefinition::new(
                "comparison",
                &["对比", "比较", "差异", "compare", "versus", " vs "],
                &[r"对比.{0,12}(工厂|供应商|物料)"],
                None,
                &["对比深圳工厂和东莞工厂的合格率"],
            ),
            IntentDefinition::new(
                "anomaly_check",
                &["异常", "风险", "超期", "冻结", "告警", "anomaly", "risk", "overdue"],
                &[r"(风险|超期|冻结).{0,6}(库存|物料|批次)"],
                None,
                &["有哪些风险库存需要处理", "超期未检的批次"],
            ),
        ];
        // Fixed literal definitions; compilation cannot fail.
        Self::new(
            intents
                .into_iter()
                .collect::<Result<Vec<_>>>()
                .unwrap_or_else(|_| unreachable!("standard intent patterns are valid")),
        )
    }

    /// Classify normalized text. `None` means no intent scored above zero.
    pub fn classify(&self, text: &str) -> Option<Intent> {
        let mut best: Option<Intent> = None;
        for def in &self.intents {
            let (score, matched) = def.score(text);
            if score == 0 {
                continue;
            }
            // Strict comparison keeps the first definition on ties.
            let beats = best.as_ref().map(|b| score > b.score).unwrap_or(true);
            if beats {
                best = Some(Intent {
                    name: def.name.clone(),
                    score,
                    confidence: Intent::confidence_for(score),
                    matched,
                    preferred_engine: def.preferred_engine.clone(),
                });
            }
        }
        if let Some(intent) = &best {
            debug!(
                intent = %intent.name,
                score = intent.score,
                confidence = intent.confidence,
                "intent classified"
            );
        }
        best
    }

    /// Example queries across all intents, for suggestion responses.
    pub fn example_queries(&self) -> Vec<String> {
        self.intents
            .iter()
            .flat_map(|d| d.examples.iter().cloned())
            .collect()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(defs: Vec<(&'static str, Vec<&'static str>, Vec<&'static str>)>) -> IntentClassifier {
        IntentClassifier::new(
            defs.into_iter()
                .map(|(name, kws, pats)| {
                    IntentDefinition::new(name, &kws, &pats, None, &[]).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn scores_keywords_and_patterns() {
        let c = classifier(vec![(
            "data_query",
            vec!["库存", "查询"],
            vec![r"查.{0,6}库存"],
        )]);
        let intent = c.classify("查询深圳工厂的库存").unwrap();
        // 2 keywords (10 each) + 1 pattern (20)
        assert_eq!(intent.score, 40);
        assert_eq!(intent.confidence, 1.0);
        assert_eq!(intent.name, "data_query");
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let c = IntentClassifier::standard();
        for text in ["查询库存", "风险物料分布饼图", "对比工厂", "hello"] {
            if let Some(intent) = c.classify(text) {
                assert!((0.0..=1.0).contains(&intent.confidence), "text: {text}");
            }
        }
    }

    #[test]
    fn extra_matching_keyword_never_lowers_score() {
        let c = classifier(vec![("q", vec!["库存", "物料"], vec![])]);
        let one = c.classify("库存").unwrap().score;
        let two = c.classify("库存物料").unwrap().score;
        assert!(two >= one);
    }

    #[test]
    fn miss_returns_none() {
        let c = IntentClassifier::standard();
        assert!(c.classify("天气怎么样").is_none());
    }

    #[test]
    fn tie_goes_to_first_configured_intent() {
        let c = classifier(vec![
            ("first", vec!["库存"], vec![]),
            ("second", vec!["库存"], vec![]),
        ]);
        assert_eq!(c.classify("库存").unwrap().name, "first");
    }

    #[test]
    fn higher_score_beats_configuration_order() {
        let c = classifier(vec![
            ("weak", vec!["库存"], vec![]),
            ("strong", vec!["库存", "风险"], vec![]),
        ]);
        assert_eq!(c.classify("风险库存").unwrap().name, "strong");
    }

    #[test]
    fn example_queries_are_collected() {
        let c = IntentClassifier::standard();
        let examples = c.example_queries();
        assert!(examples.iter().any(|e| e.contains("库存")));
    }
}
