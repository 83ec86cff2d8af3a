use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::params::Params;
use super::query::build_result_set;
use crate::error::SqlFacadeError;
use crate::statement::{BoundParam, DriverExec, StatementDriver, lock_recovering};

/// Per-statement execution backend for `SQLite`.
///
/// Holds the shared connection and the statement text; the compiled form
/// comes out of the connection's prepared-statement cache on every run, so
/// a handle stays valid for as long as the connection lives.
pub(crate) struct SqliteStatementDriver {
    conn: Arc<Mutex<Connection>>,
    sql: Arc<String>,
}

impl SqliteStatementDriver {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, sql: Arc<String>) -> Self {
        Self { conn, sql }
    }
}

impl StatementDriver for SqliteStatementDriver {
    fn execute(&mut self, params: &[BoundParam]) -> Result<DriverExec, SqlFacadeError> {
        let guard = lock_recovering(&self.conn);
        let values = Params::from_bound(params);
        let mut stmt = guard.prepare_cached(&self.sql)?;

        if stmt.column_count() > 0 {
            let rows = build_result_set(&mut stmt, values.as_values())?;
            Ok(DriverExec {
                insert_id: 0,
                affected: 0,
                rows: Some(rows),
            })
        } else {
            let rowid_before = guard.last_insert_rowid();
            let affected = stmt.execute(&values.as_refs()[..])?;
            let rowid_after = guard.last_insert_rowid();
            let insert_id = if rowid_after == rowid_before {
                0
            } else {
                rowid_after
            };
            Ok(DriverExec {
                insert_id,
                affected: affected as u64,
                rows: None,
            })
        }
    }
}
