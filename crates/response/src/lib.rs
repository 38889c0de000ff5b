//! Response synthesis for inspectql — raw rows in, structured multi-part
//! response out.
//!
//! Everything here is deterministic and pure: identical rows and rule
//! always produce the identical response body.

pub mod cards;
pub mod scenario;
pub mod synthesizer;

pub use scenario::Scenario;
pub use synthesizer::ResponseSynthesizer;
