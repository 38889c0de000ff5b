//! Engine registry, dispatch, and bundled executors for inspectql.
//!
//! The dispatcher owns the retry/fallback state machine; executors only
//! know how to run one request against one backend.

pub mod dispatcher;
pub mod executors;
pub mod registry;

pub use dispatcher::{BroadcastOutcome, DispatchOptions, DispatchOutcome, EngineDispatcher};
pub use executors::http::HttpExecutor;
pub use executors::static_rows::StaticExecutor;
pub use registry::{Engine, EngineRegistry};

#[cfg(feature = "sqlite")]
pub use executors::sqlite::SqliteExecutor;
