use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::config::SqliteOptions;
use super::query::{build_result_set, extract_value};
use super::statement::SqliteStatementDriver;
use crate::driver::{DriverAdapter, RowCallback};
use crate::error::SqlFacadeError;
use crate::outcome::ExecOutcome;
use crate::results::{ResultSet, Row, Rows};
use crate::statement::{Statement, lock_recovering};
use crate::types::SqlValue;

/// Driver adapter over one `rusqlite` connection.
///
/// The connection opens lazily and sits behind `Arc<Mutex<_>>` so prepared
/// statements can keep executing through their own handles after the facade
/// moves on. Query results are buffered into an active [`ResultSet`] the
/// fetch calls then walk.
pub struct SqliteAdapter {
    opts: SqliteOptions,
    conn: Option<Arc<Mutex<Connection>>>,
    active: Option<ResultSet>,
}

impl SqliteAdapter {
    #[must_use]
    pub fn new(opts: SqliteOptions) -> Self {
        Self {
            opts,
            conn: None,
            active: None,
        }
    }

    /// The shared native connection, opening it first if needed.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError::ConnectionError` when the database cannot
    /// be opened.
    pub fn connection(&mut self) -> Result<Arc<Mutex<Connection>>, SqlFacadeError> {
        if let Some(conn) = &self.conn {
            return Ok(Arc::clone(conn));
        }

        let opened = match &self.opts.db_path {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        };
        let conn = opened.map_err(connect_error)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(connect_error)?;
        tracing::debug!(
            path = self.opts.db_path.as_deref().unwrap_or(":memory:"),
            "sqlite connection opened"
        );

        let conn = Arc::new(Mutex::new(conn));
        self.conn = Some(Arc::clone(&conn));
        Ok(conn)
    }

    fn run_batch(&mut self, sql: &str) -> Result<(), SqlFacadeError> {
        let conn = self.connection()?;
        let guard = lock_recovering(&conn);
        guard.execute_batch(sql)?;
        Ok(())
    }
}

fn connect_error(e: rusqlite::Error) -> SqlFacadeError {
    let code = match &e {
        rusqlite::Error::SqliteFailure(err, _) => err.extended_code,
        _ => -1,
    };
    SqlFacadeError::ConnectionError {
        code,
        message: e.to_string(),
    }
}

impl DriverAdapter for SqliteAdapter {
    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn ensure_connected(&mut self) -> Result<(), SqlFacadeError> {
        self.connection().map(|_| ())
    }

    fn escape(&mut self, raw: &str) -> Result<String, SqlFacadeError> {
        // Purely lexical in SQLite: double every single quote
        self.ensure_connected()?;
        Ok(raw.replace('\'', "''"))
    }

    fn start_transaction(&mut self) -> Result<(), SqlFacadeError> {
        self.run_batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), SqlFacadeError> {
        self.run_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        self.run_batch("ROLLBACK")
    }

    fn exec(&mut self, query: &str) -> Result<ExecOutcome, SqlFacadeError> {
        let conn = self.connection()?;
        let guard = lock_recovering(&conn);

        // last_insert_rowid is sticky, so compare around the call to tell
        // an INSERT from everything else
        let rowid_before = guard.last_insert_rowid();
        let affected = guard.execute(query, [])?;
        let rowid_after = guard.last_insert_rowid();

        if rowid_after != rowid_before {
            Ok(ExecOutcome::Inserted(rowid_after))
        } else {
            Ok(ExecOutcome::Affected(affected as u64))
        }
    }

    fn query(&mut self, query: &str) -> Result<(), SqlFacadeError> {
        // A new query always displaces the active result, consumed or not
        self.active = None;

        let conn = self.connection()?;
        let set = {
            let guard = lock_recovering(&conn);
            let mut stmt = guard.prepare(query)?;
            build_result_set(&mut stmt, &[])?
        };
        self.active = Some(set);
        Ok(())
    }

    fn query_exclusive_callback(
        &mut self,
        query: &str,
        on_started: &mut dyn FnMut(),
        per_row: &mut RowCallback<'_>,
    ) -> Result<bool, SqlFacadeError> {
        self.active = None;

        let conn = self.connection()?;
        let guard = lock_recovering(&conn);
        let mut stmt = guard.prepare(query)?;

        let column_names: Arc<Vec<String>> = Arc::new(
            stmt.column_names()
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
        );
        let column_count = column_names.len();
        let index_cache: Arc<HashMap<String, usize>> = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect(),
        );

        let mut rows_iter = stmt.query([])?;
        on_started();

        let mut callback_error = None;
        while let Some(native_row) = rows_iter.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(extract_value(native_row, i)?);
            }
            let row = Row {
                column_names: Arc::clone(&column_names),
                values,
                column_index_cache: Arc::clone(&index_cache),
            };
            if let Err(e) = per_row(&row) {
                callback_error = Some(e);
                break;
            }
        }

        // Release the native cursor before surfacing a callback error
        drop(rows_iter);
        drop(stmt);
        drop(guard);

        match callback_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    fn fetch_count(&self) -> usize {
        self.active.as_ref().map_or(0, ResultSet::row_count)
    }

    fn fetch(&mut self) -> Option<Row> {
        self.active.as_mut().and_then(ResultSet::next_row)
    }

    fn fetch_num(&mut self) -> Option<Vec<SqlValue>> {
        self.active.as_mut().and_then(ResultSet::next_values)
    }

    fn fetch_value(&mut self) -> Option<SqlValue> {
        self.active.as_mut().and_then(ResultSet::next_value)
    }

    fn fetch_all(&mut self) -> Vec<Row> {
        self.active.as_mut().map_or_else(Vec::new, ResultSet::drain_rows)
    }

    fn fetch_generator(&mut self) -> Rows {
        self.active.take().map_or_else(Rows::empty, Rows::from_set)
    }

    fn prepare(&mut self, query: &str) -> Result<Statement, SqlFacadeError> {
        let conn = self.connection()?;
        {
            // Compile now so a bad statement fails here, not at first execute
            let guard = lock_recovering(&conn);
            guard
                .prepare_cached(query)
                .map_err(|e| SqlFacadeError::PrepareError(e.to_string()))?;
        }

        let sql = Arc::new(query.to_string());
        let driver = SqliteStatementDriver::new(conn, Arc::clone(&sql));
        Ok(Statement::new(sql, Box::new(driver)))
    }
}
