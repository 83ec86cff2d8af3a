mod driver;
mod error;
mod facade;
mod format;
mod hydrate;
mod outcome;
mod profiler;
mod results;
mod statement;
mod types;

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod exports;
pub mod prelude;
pub mod registry;

pub use driver::{DriverAdapter, RowCallback};
pub use error::SqlFacadeError;
pub use facade::{DbFacade, MappedRow};
pub use format::{QueryArg, format_query};
pub use hydrate::{FromRow, ObjectRows};
pub use outcome::ExecOutcome;
pub use profiler::{NullProfiler, Profiler, TracingProfiler};
pub use registry::FacadeHandle;
pub use results::{ResultSet, Row, Rows};
pub use statement::{OutputRow, ParamKind, Statement, infer_kind};
pub use types::SqlValue;
