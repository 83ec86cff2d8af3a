// MySQL backend - enabled with the `mysql` feature
//
// This module is split into several sub-modules for better organization:
// - config: Connection options, environment fallbacks, facade construction
// - params: Parameter conversion between facade and MySQL wire types
// - query: Column-aware wire decoding and result buffering
// - adapter: The driver adapter over one mysql connection
// - statement: Re-executable prepared statement backend

pub mod adapter;
pub mod config;
pub mod params;
pub mod query;

pub(crate) mod statement;

// Re-export the public API
pub use adapter::{MysqlAdapter, escape_string};
pub use config::{DEFAULT_CHARSET, MysqlOptions, MysqlOptionsBuilder};
pub use params::{Params, to_mysql_value};
pub use query::{ColumnInfo, decode_value};
