use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mysql::Conn;
use mysql::prelude::Queryable;

use super::config::MysqlOptions;
use super::query::{buffer_result_set, column_header, decode_row};
use super::statement::MysqlStatementDriver;
use crate::driver::{DriverAdapter, RowCallback};
use crate::error::SqlFacadeError;
use crate::outcome::ExecOutcome;
use crate::results::{ResultSet, Row, Rows};
use crate::statement::{Statement, lock_recovering};
use crate::types::SqlValue;

/// Escape a string for interpolation into single-quoted `MySQL` literals.
///
/// Follows the client library's byte rules; every escaped character is
/// ASCII, so the result stays valid UTF-8.
#[must_use]
pub fn escape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out
}

/// Driver adapter over one `mysql` connection.
///
/// The connection opens lazily and sits behind `Arc<Mutex<_>>` so prepared
/// statements can keep executing through their own handles. Query results
/// are buffered client-side into the active [`ResultSet`]; only the
/// streaming callback path reads rows straight off the wire.
pub struct MysqlAdapter {
    opts: MysqlOptions,
    conn: Option<Arc<Mutex<Conn>>>,
    active: Option<ResultSet>,
}

impl MysqlAdapter {
    #[must_use]
    pub fn new(opts: MysqlOptions) -> Self {
        Self {
            opts,
            conn: None,
            active: None,
        }
    }

    /// The shared native connection, connecting first if needed.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError::ConnectionError` when the server cannot be
    /// reached or refuses the handshake.
    pub fn connection(&mut self) -> Result<Arc<Mutex<Conn>>, SqlFacadeError> {
        if let Some(conn) = &self.conn {
            return Ok(Arc::clone(conn));
        }

        let mut conn = Conn::new(self.opts.to_opts()).map_err(connect_error)?;
        conn.query_drop(format!("SET NAMES {}", self.opts.charset))
            .map_err(connect_error)?;
        tracing::debug!(charset = %self.opts.charset, "mysql connection opened");

        let conn = Arc::new(Mutex::new(conn));
        self.conn = Some(Arc::clone(&conn));
        Ok(conn)
    }

    fn run_simple(&mut self, sql: &str) -> Result<(), SqlFacadeError> {
        let conn = self.connection()?;
        let mut guard = lock_recovering(&conn);
        guard.query_drop(sql)?;
        Ok(())
    }
}

fn connect_error(e: mysql::Error) -> SqlFacadeError {
    let code = match &e {
        mysql::Error::MySqlError(server) => i32::from(server.code),
        _ => -1,
    };
    SqlFacadeError::ConnectionError {
        code,
        message: e.to_string(),
    }
}

impl DriverAdapter for MysqlAdapter {
    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn ensure_connected(&mut self) -> Result<(), SqlFacadeError> {
        self.connection().map(|_| ())
    }

    fn escape(&mut self, raw: &str) -> Result<String, SqlFacadeError> {
        self.ensure_connected()?;
        Ok(escape_string(raw))
    }

    fn start_transaction(&mut self) -> Result<(), SqlFacadeError> {
        self.run_simple("START TRANSACTION")
    }

    fn commit(&mut self) -> Result<(), SqlFacadeError> {
        self.run_simple("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        self.run_simple("ROLLBACK")
    }

    fn exec(&mut self, query: &str) -> Result<ExecOutcome, SqlFacadeError> {
        let conn = self.connection()?;
        let mut guard = lock_recovering(&conn);

        let result = guard.query_iter(query)?;
        let insert_id = result.last_insert_id();
        let affected = result.affected_rows();
        // Dropping the result drains anything a misdirected SELECT produced
        drop(result);

        match insert_id {
            Some(id) if id != 0 => Ok(ExecOutcome::Inserted(id as i64)),
            _ => Ok(ExecOutcome::Affected(affected)),
        }
    }

    fn query(&mut self, query: &str) -> Result<(), SqlFacadeError> {
        // A new query always displaces the active result, consumed or not
        self.active = None;

        let conn = self.connection()?;
        let set = {
            let mut guard = lock_recovering(&conn);
            let mut result = guard.query_iter(query)?;
            match result.iter() {
                Some(rs) => buffer_result_set(rs)?,
                // No result columns, e.g. a DML routed through query
                None => ResultSet::empty(),
            }
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
        let mut guard = lock_recovering(&conn);
        let mut result = guard.query_iter(query)?;
        on_started();

        let mut callback_error = None;
        if let Some(rs) = result.iter() {
            let (column_names, infos) = column_header(&rs);
            let index_cache: Arc<HashMap<String, usize>> = Arc::new(
                column_names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), i))
                    .collect(),
            );

            for native_row in rs {
                let native_row = native_row?;
                let row = Row {
                    column_names: Arc::clone(&column_names),
                    values: decode_row(native_row, &infos),
                    column_index_cache: Arc::clone(&index_cache),
                };
                if let Err(e) = per_row(&row) {
                    callback_error = Some(e);
                    break;
                }
            }
        }

        // Dropping the result drains whatever the break left on the wire
        drop(result);
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
        let stmt = {
            let mut guard = lock_recovering(&conn);
            guard
                .prep(query)
                .map_err(|e| SqlFacadeError::PrepareError(e.to_string()))?
        };

        let sql = Arc::new(query.to_string());
        let driver = MysqlStatementDriver::new(conn, stmt);
        Ok(Statement::new(sql, Box::new(driver)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_the_special_bytes() {
        assert_eq!(
            escape_string("a'b\"c\\d\ne\rf\0g\u{1a}h"),
            "a\\'b\\\"c\\\\d\\ne\\rf\\0g\\Zh"
        );
    }

    #[test]
    fn escape_leaves_multibyte_text_alone() {
        assert_eq!(escape_string("naïve 試験"), "naïve 試験");
    }
}
