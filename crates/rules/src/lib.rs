//! Rule storage and resolution for inspectql.
//!
//! A `RuleRepository` holds the prioritized rule set and resolves the best
//! match for a query; `RuleSource` implementations load rule definitions
//! from wherever they live (a TOML file, a database table, test fixtures).

pub mod repository;
pub mod source;

pub use repository::RuleRepository;
pub use source::{standard_rules, RuleSource, StaticRuleSource, TomlRuleSource};
