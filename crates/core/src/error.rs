//! Error types for the inspectql domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Note the deliberate asymmetry with the response path: classification
//! misses and absent entities are *not* errors (they are valid `None` /
//! empty results), so there is no NLU error type at all.

use thiserror::Error;

/// The top-level error type for all inspectql operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Rule errors ---
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    // --- Engine errors ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Dispatch errors ---
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the rule store. Only `InvalidTemplate` is allowed to abort
/// startup; everything else is converted into a graceful response upstream.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("Rule source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to parse rule definitions: {0}")]
    Parse(String),

    #[error("Rule '{rule_id}' has an invalid query template: {detail}")]
    InvalidTemplate { rule_id: String, detail: String },

    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),
}

/// A single engine attempt failing. Timeout, transport, and response errors
/// are classified uniformly: all three trigger retry-then-fallback.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Engine request timed out: {0}")]
    Timeout(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Engine returned a failure response: {message} (status: {status_code})")]
    Response { status_code: u16, message: String },

    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    #[error("Engine is disabled: {0}")]
    Disabled(String),
}

/// Terminal outcome of a single dispatch cycle. Never propagated to the
/// caller of the pipeline entry point — converted into an apology response.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("No enabled engine available: {0}")]
    NoEngineAvailable(String),

    #[error("All {tried} engine(s) failed; last error: {last}")]
    AllEnginesFailed { tried: usize, last: EngineError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_displays_correctly() {
        let err = Error::Engine(EngineError::Response {
            status_code: 502,
            message: "Bad Gateway".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn dispatch_error_carries_last_failure() {
        let err = DispatchError::AllEnginesFailed {
            tried: 3,
            last: EngineError::Timeout("primary timed out after 5s".into()),
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn rule_error_names_the_rule() {
        let err = RuleError::InvalidTemplate {
            rule_id: "inventory_by_factory".into(),
            detail: "unknown parameter {warehouse}".into(),
        };
        assert!(err.to_string().contains("inventory_by_factory"));
        assert!(err.to_string().contains("{warehouse}"));
    }
}
