//! Deterministic NLU for inspectql — no model, no network.
//!
//! Entity extraction is regex-per-kind; intent classification is a scoring
//! function over keyword and pattern sets. Both components are total: they
//! never fail, they only return less.

pub mod classifier;
pub mod extractor;

pub use classifier::{IntentClassifier, IntentDefinition};
pub use extractor::EntityExtractor;
