//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::{
    DbFacade, DriverAdapter, ExecOutcome, FromRow, MappedRow, NullProfiler, ObjectRows,
    OutputRow, ParamKind, Profiler, QueryArg, ResultSet, Row, RowCallback, Rows, SqlFacadeError,
    SqlValue, Statement, TracingProfiler, format_query,
};

pub use crate::registry;
pub use crate::registry::FacadeHandle;

#[cfg(feature = "sqlite")]
pub use crate::exports::SqliteAdapter;
#[cfg(feature = "sqlite")]
pub use crate::exports::SqliteOptions;
#[cfg(feature = "sqlite")]
pub use crate::exports::SqliteOptionsBuilder;

#[cfg(feature = "mysql")]
pub use crate::exports::MysqlAdapter;
#[cfg(feature = "mysql")]
pub use crate::exports::MysqlOptions;
#[cfg(feature = "mysql")]
pub use crate::exports::MysqlOptionsBuilder;
