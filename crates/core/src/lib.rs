//! # inspectql Core
//!
//! Domain types, traits, and error definitions for the inspectql query
//! resolution layer. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The seams of the system (engine executors, rule sources) are defined as
//! traits here. Implementations live in their respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod entity;
pub mod error;
pub mod engine;
pub mod intent;
pub mod query;
pub mod response;
pub mod rule;

// Re-export key types at crate root for ergonomics
pub use entity::{EntityKind, EntitySet};
pub use error::{DispatchError, EngineError, Error, Result, RuleError};
pub use engine::{EngineExecutor, EngineRequest, Row};
pub use intent::Intent;
pub use query::Query;
pub use response::{
    ChartDescriptor, ResponseMetadata, ResponseType, ScenarioCard, StructuredResponse,
    TablePayload,
};
pub use rule::{Rule, UNSET_PARAM};
