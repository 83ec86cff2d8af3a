use serde::{Deserialize, Serialize};

use super::adapter::SqliteAdapter;
use crate::facade::DbFacade;

/// Connection options for a SQLite database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteOptions {
    /// Database file path. `None` opens a private in-memory database.
    pub db_path: Option<String>,
}

impl SqliteOptions {
    /// Options for a file-backed database at `db_path`.
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path: Some(db_path),
        }
    }

    /// Options for an in-memory database.
    ///
    /// The database lives and dies with the connection that opened it.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { db_path: None }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    /// Start from a database file path.
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    /// Start from an in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            opts: SqliteOptions::in_memory(),
        }
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Finish and wrap the options in a ready-to-use facade.
    #[must_use]
    pub fn build(self) -> DbFacade {
        DbFacade::new_sqlite(self.finish())
    }
}

impl DbFacade {
    #[must_use]
    pub fn sqlite_builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Create a facade over a `SQLite` database.
    ///
    /// The underlying connection opens lazily on first use, so construction
    /// never fails; a bad path surfaces as `ConnectionError` from the first
    /// query instead.
    #[must_use]
    pub fn new_sqlite(opts: SqliteOptions) -> Self {
        DbFacade::new(SqliteAdapter::new(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_the_path() {
        let opts = SqliteOptionsBuilder::new("scores.db".to_string()).finish();
        assert_eq!(opts.db_path.as_deref(), Some("scores.db"));
    }

    #[test]
    fn in_memory_has_no_path() {
        let opts = SqliteOptionsBuilder::in_memory().finish();
        assert!(opts.db_path.is_none());
    }
}
