//! Bundled executors — one per backend technology.

pub mod http;
pub mod static_rows;

#[cfg(feature = "sqlite")]
pub mod sqlite;
