//! The rule repository — ordered resolution and template binding.
//!
//! Resolution is deterministic for a fixed rule set and query: rules are
//! walked in ascending priority order (stable-sorted, so declaration order
//! breaks priority ties) and the first trigger match wins. A designated
//! default rule is the last resort; with none configured, resolution
//! returns `None` and the caller produces a "could not understand"
//! response.

use inspectql_core::{EntityKind, EntitySet, Intent, Rule, RuleError, UNSET_PARAM};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

fn param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder pattern"))
}

/// Holds the active rule set, sorted by ascending priority.
#[derive(Debug)]
pub struct RuleRepository {
    rules: Vec<Rule>,
    default_rule: Option<usize>,
}

impl RuleRepository {
    /// Build a repository, validating every rule template.
    ///
    /// Validation failures abort startup: a rule with an unknown template
    /// parameter or a duplicate id would otherwise mis-resolve silently at
    /// query time.
    pub fn new(mut rules: Vec<Rule>) -> Result<Self, RuleError> {
        for rule in &rules {
            validate_template(rule)?;
        }
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|r| r.id == rule.id) {
                return Err(RuleError::DuplicateId(rule.id.clone()));
            }
        }
        rules.sort_by_key(|r| r.priority);
        let default_rule = rules.iter().position(|r| r.is_default);
        info!(count = rules.len(), has_default = default_rule.is_some(), "rule set loaded");
        Ok(Self { rules, default_rule })
    }

    /// Swap in a new rule set between dispatch cycles.
    pub fn reload(&mut self, rules: Vec<Rule>) -> Result<(), RuleError> {
        let next = Self::new(rules)?;
        self.rules = next.rules;
        self.default_rule = next.default_rule;
        Ok(())
    }

    /// Resolve the best rule for a classified query.
    ///
    /// The intent is currently advisory (it travels with the dispatch
    /// request); matching itself is trigger-word driven, so a classifier
    /// miss can still resolve a rule.
    pub fn resolve(&self, _intent: Option<&Intent>, normalized_text: &str) -> Option<&Rule> {
        for rule in &self.rules {
            if rule.matches(normalized_text) {
                debug!(rule = %rule.id, priority = rule.priority, "rule resolved");
                return Some(rule);
            }
        }
        let fallback = self.default_rule.map(|i| &self.rules[i]);
        if let Some(rule) = fallback {
            debug!(rule = %rule.id, "no trigger match; using default rule");
        }
        fallback
    }

    /// Bind a rule's template parameters from extracted entities.
    ///
    /// A parameter with no matching entity binds to [`UNSET_PARAM`] rather
    /// than failing resolution; executors interpret the sentinel as "no
    /// filter".
    pub fn bind_template(&self, rule: &Rule, entities: &EntitySet) -> String {
        param_re()
            .replace_all(&rule.query_template, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                EntityKind::from_param_name(name)
                    .and_then(|kind| entities.get(kind))
                    .unwrap_or(UNSET_PARAM)
                    .to_string()
            })
            .into_owned()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Check that every `{placeholder}` names a known entity kind.
fn validate_template(rule: &Rule) -> Result<(), RuleError> {
    for caps in param_re().captures_iter(&rule.query_template) {
        let name = &caps[1];
        if EntityKind::from_param_name(name).is_none() {
            return Err(RuleError::InvalidTemplate {
                rule_id: rule.id.clone(),
                detail: format!("unknown parameter {{{name}}}"),
            });
        }
    }
    Ok(())
}
