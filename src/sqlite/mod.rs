// SQLite backend - the default driver adapter
//
// This module is split into several sub-modules for better organization:
// - config: Connection options and facade construction
// - params: Parameter conversion between facade and SQLite types
// - query: Result extraction and buffering
// - adapter: The driver adapter over one rusqlite connection
// - statement: Re-executable prepared statement backend

pub mod adapter;
pub mod config;
pub mod params;
pub mod query;

pub(crate) mod statement;

// Re-export the public API
pub use adapter::SqliteAdapter;
pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use params::{Params, to_sqlite_value};
pub use query::build_result_set;
