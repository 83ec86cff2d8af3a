//! Database-specific type exports.
//!
//! This module contains all the conditional feature exports for different
//! database backends, keeping them organized in one place.

// SQLite exports
#[cfg(feature = "sqlite")]
pub use crate::sqlite::Params as SqliteParams;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteAdapter;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteOptions;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteOptionsBuilder;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::build_result_set as sqlite_build_result_set;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::to_sqlite_value;

// MySQL exports
#[cfg(feature = "mysql")]
pub use crate::mysql::ColumnInfo;
#[cfg(feature = "mysql")]
pub use crate::mysql::DEFAULT_CHARSET;
#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlAdapter;
#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlOptions;
#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlOptionsBuilder;
#[cfg(feature = "mysql")]
pub use crate::mysql::Params as MysqlParams;
#[cfg(feature = "mysql")]
pub use crate::mysql::decode_value as mysql_decode_value;
#[cfg(feature = "mysql")]
pub use crate::mysql::escape_string as mysql_escape_string;
#[cfg(feature = "mysql")]
pub use crate::mysql::to_mysql_value;
