use std::sync::{Arc, Mutex};

use mysql::Conn;
use mysql::prelude::Queryable;

use super::params::Params;
use super::query::buffer_result_set;
use crate::error::SqlFacadeError;
use crate::statement::{BoundParam, DriverExec, StatementDriver, lock_recovering};

/// Per-statement execution backend for `MySQL`.
///
/// Holds the shared connection and the server-side prepared statement;
/// every execution goes over the binary protocol and its result is buffered
/// before the connection lock is released.
pub(crate) struct MysqlStatementDriver {
    conn: Arc<Mutex<Conn>>,
    stmt: mysql::Statement,
}

impl MysqlStatementDriver {
    pub(crate) fn new(conn: Arc<Mutex<Conn>>, stmt: mysql::Statement) -> Self {
        Self { conn, stmt }
    }
}

impl StatementDriver for MysqlStatementDriver {
    fn execute(&mut self, params: &[BoundParam]) -> Result<DriverExec, SqlFacadeError> {
        let mut guard = lock_recovering(&self.conn);
        let values = Params::from_bound(params).into_values();

        let mut result = guard.exec_iter(&self.stmt, values)?;
        let insert_id = result.last_insert_id().unwrap_or(0) as i64;
        let affected = result.affected_rows();
        let rows = match result.iter() {
            Some(rs) => Some(buffer_result_set(rs)?),
            None => None,
        };

        Ok(DriverExec {
            insert_id,
            affected,
            rows,
        })
    }
}
