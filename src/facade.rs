use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::driver::DriverAdapter;
use crate::error::SqlFacadeError;
use crate::format::{QueryArg, format_query};
use crate::hydrate::{FromRow, ObjectRows};
use crate::outcome::ExecOutcome;
use crate::profiler::{NullProfiler, Profiler};
use crate::results::{Row, Rows};
use crate::statement::Statement;
use crate::types::SqlValue;

/// Value side of a mapped-rows result: the remaining row as an ordered map
/// when more than one column is left after removing the key column, the
/// bare scalar when exactly one is.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRow {
    Scalar(SqlValue),
    Row(IndexMap<String, SqlValue>),
}

/// The convenience facade over one driver adapter.
///
/// Owns the adapter, a profiler, the count of the last counted result, and
/// a prepared-statement cache keyed by formatted query text. Every
/// query-issuing method formats its template once, brackets the driver call
/// in a profiler span, and reshapes the buffered result. One facade wraps
/// one connection; share it across threads through the registry handle,
/// whose lock serializes callers.
pub struct DbFacade {
    db: Box<dyn DriverAdapter>,
    profiler: Box<dyn Profiler>,
    statements: HashMap<String, Statement>,
    last_result_count: usize,
}

impl DbFacade {
    /// Facade with the no-op profiler.
    pub fn new<A>(adapter: A) -> Self
    where
        A: DriverAdapter + 'static,
    {
        Self::with_profiler(adapter, NullProfiler)
    }

    pub fn with_profiler<A, P>(adapter: A, profiler: P) -> Self
    where
        A: DriverAdapter + 'static,
        P: Profiler + 'static,
    {
        Self {
            db: Box::new(adapter),
            profiler: Box::new(profiler),
            statements: HashMap::new(),
            last_result_count: 0,
        }
    }

    /// Swap the profiler sink.
    pub fn set_profiler<P>(&mut self, profiler: P)
    where
        P: Profiler + 'static,
    {
        self.profiler = Box::new(profiler);
    }

    /// The current profiler sink.
    pub fn profiler(&mut self) -> &mut dyn Profiler {
        self.profiler.as_mut()
    }

    /// Direct access to the underlying adapter, for fetch-family calls the
    /// reshaping methods do not cover.
    pub fn adapter(&mut self) -> &mut dyn DriverAdapter {
        self.db.as_mut()
    }

    /// Non-blocking liveness check; never forces a connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.db.is_connected()
    }

    /// Establish the connection now instead of on first query.
    ///
    /// # Errors
    ///
    /// `ConnectionError` when the server refuses the connection.
    pub fn connect(&mut self) -> Result<(), SqlFacadeError> {
        self.db.ensure_connected()
    }

    /// Row count of the last counted result (`exists`, `iterate`,
    /// `iterate_object` update it; the plain query shapes do not).
    #[must_use]
    pub fn latest_count(&self) -> usize {
        self.last_result_count
    }

    /// Make a value safe for direct inclusion in query text.
    ///
    /// Native numbers pass through unchanged; every other value is escaped
    /// by the driver and wrapped in single quotes. The result feeds a `%s`
    /// directive.
    ///
    /// # Errors
    ///
    /// Escaping connects first, so `ConnectionError` can surface here.
    pub fn esc(&mut self, value: &SqlValue) -> Result<QueryArg, SqlFacadeError> {
        Ok(match value {
            SqlValue::Int(v) => QueryArg::Int(*v),
            SqlValue::UInt(v) => QueryArg::Uint(*v),
            SqlValue::Float(v) => QueryArg::Float(*v),
            other => {
                let escaped = self.db.escape(&other.to_string())?;
                QueryArg::Str(format!("'{escaped}'"))
            }
        })
    }

    /// Run a write statement. Reports the insert id when the statement
    /// generated one, otherwise the affected-row count.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn exec(&mut self, query: &str, args: &[QueryArg]) -> Result<ExecOutcome, SqlFacadeError> {
        let sql = format_query(query, args)?;
        self.profiler.named_start(&sql);
        let result = self.db.exec(&sql);
        self.profiler.stop();
        result
    }

    /// Run a query and report its row count. Updates `latest_count`.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn exists(&mut self, query: &str, args: &[QueryArg]) -> Result<usize, SqlFacadeError> {
        self.run_query(query, args)?;
        self.last_result_count = self.db.fetch_count();
        Ok(self.last_result_count)
    }

    /// First cell of the first row, None when the query produced no rows.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_value(
        &mut self,
        query: &str,
        args: &[QueryArg],
    ) -> Result<Option<SqlValue>, SqlFacadeError> {
        self.run_query(query, args)?;
        Ok(self.db.fetch_value())
    }

    /// First cell of every row, in order, to the end of the data. NULL
    /// cells and zero values are kept; only exhaustion ends the list.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_values(
        &mut self,
        query: &str,
        args: &[QueryArg],
    ) -> Result<Vec<SqlValue>, SqlFacadeError> {
        self.run_query(query, args)?;
        let mut data = Vec::new();
        while let Some(value) = self.db.fetch_value() {
            data.push(value);
        }
        Ok(data)
    }

    /// First row, name-addressable. None when the query produced no rows.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_row(
        &mut self,
        query: &str,
        args: &[QueryArg],
    ) -> Result<Option<Row>, SqlFacadeError> {
        self.run_query(query, args)?;
        Ok(self.db.fetch())
    }

    /// First row as positional values.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_indexed_row(
        &mut self,
        query: &str,
        args: &[QueryArg],
    ) -> Result<Option<Vec<SqlValue>>, SqlFacadeError> {
        self.run_query(query, args)?;
        Ok(self.db.fetch_num())
    }

    /// Every row of the result. Does not update `latest_count`.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_rows(
        &mut self,
        query: &str,
        args: &[QueryArg],
    ) -> Result<Vec<Row>, SqlFacadeError> {
        self.run_query(query, args)?;
        Ok(self.db.fetch_all())
    }

    /// Rows keyed by one of their columns.
    ///
    /// The key column is removed from each row; when more than one column
    /// remains the map value is the remaining row, when exactly one remains
    /// it is that scalar. Keys render to their canonical string form.
    /// Duplicate keys keep the first insertion position but take the last
    /// row's value.
    ///
    /// # Errors
    ///
    /// `InvalidColumn` when `key_column` is absent from the result; format
    /// and native driver errors pass through.
    pub fn query_mapped_rows(
        &mut self,
        query: &str,
        key_column: &str,
        args: &[QueryArg],
    ) -> Result<IndexMap<String, MappedRow>, SqlFacadeError> {
        self.run_query(query, args)?;
        let mut data = IndexMap::new();
        while let Some(row) = self.db.fetch() {
            let key_idx = row
                .get_column_index(key_column)
                .ok_or_else(|| SqlFacadeError::InvalidColumn(key_column.to_string()))?;
            let key = row
                .get_by_index(key_idx)
                .map(ToString::to_string)
                .unwrap_or_default();

            let mut remaining = row.to_map();
            remaining.shift_remove(key_column);
            let value = if remaining.len() == 1 {
                let scalar = remaining
                    .into_iter()
                    .next()
                    .map_or(SqlValue::Null, |(_, v)| v);
                MappedRow::Scalar(scalar)
            } else {
                MappedRow::Row(remaining)
            };
            data.insert(key, value);
        }
        Ok(data)
    }

    /// Detach the result as an owning iterator. Updates `latest_count`;
    /// zero rows yield an explicitly empty iterator that can be tested
    /// before consumption.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn iterate(&mut self, query: &str, args: &[QueryArg]) -> Result<Rows, SqlFacadeError> {
        self.run_query(query, args)?;
        self.last_result_count = self.db.fetch_count();
        Ok(self.db.fetch_generator())
    }

    /// First row hydrated into `T`, None when the query produced no rows.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn query_object<T>(
        &mut self,
        query: &str,
        ctor_args: T::Args,
        args: &[QueryArg],
    ) -> Result<Option<T>, SqlFacadeError>
    where
        T: FromRow,
    {
        self.run_query(query, args)?;
        Ok(self.db.fetch().map(|row| T::from_row(&row, &ctor_args)))
    }

    /// Like [`DbFacade::iterate`], hydrating each row into `T` with the
    /// given constructor arguments.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through.
    pub fn iterate_object<T>(
        &mut self,
        query: &str,
        ctor_args: T::Args,
        args: &[QueryArg],
    ) -> Result<ObjectRows<T>, SqlFacadeError>
    where
        T: FromRow,
    {
        self.run_query(query, args)?;
        self.last_result_count = self.db.fetch_count();
        Ok(self.db.fetch_generator().hydrate(ctor_args))
    }

    /// Stream a query through `per_row` without client-side buffering,
    /// holding the connection exclusively for the duration.
    ///
    /// The profiler span closes as soon as the server accepts the query,
    /// before the first row is delivered, so the span measures query time
    /// rather than processing time. Returns true when the query ran and
    /// every row was delivered.
    ///
    /// # Errors
    ///
    /// Format and native driver errors pass through; a `per_row` error
    /// propagates after the native result has been released.
    pub fn batch<F>(
        &mut self,
        query: &str,
        args: &[QueryArg],
        mut per_row: F,
    ) -> Result<bool, SqlFacadeError>
    where
        F: FnMut(&Row) -> Result<(), SqlFacadeError>,
    {
        let sql = format_query(query, args)?;
        self.profiler.named_start(&sql);

        let profiler = self.profiler.as_mut();
        let mut started = false;
        let mut on_started = || {
            profiler.stop();
            started = true;
        };
        let result = self
            .db
            .query_exclusive_callback(&sql, &mut on_started, &mut per_row);
        // The query may have failed before the server accepted it; the
        // span still has to close.
        if !started {
            self.profiler.stop();
        }
        result
    }

    /// Compile a prepared statement, reusing the cached handle when one
    /// for the same formatted text is still open.
    ///
    /// # Errors
    ///
    /// `PrepareError` when compilation fails; format and connection errors
    /// pass through.
    pub fn prepare(&mut self, query: &str, args: &[QueryArg]) -> Result<Statement, SqlFacadeError> {
        let sql = format_query(query, args)?.into_owned();
        if let Some(stmt) = self.statements.get(&sql) {
            if stmt.is_open() {
                return Ok(stmt.clone());
            }
        }

        let label = format!("[Prepared] {sql}");
        self.profiler.named_start(&label);
        let result = self.db.prepare(&sql);
        self.profiler.stop();

        let stmt = result?;
        self.statements.insert(sql, stmt.clone());
        Ok(stmt)
    }

    /// Close every cached prepared statement and forget the cache.
    pub fn clear_stmt_cache(&mut self) {
        for stmt in self.statements.values() {
            stmt.close();
        }
        self.statements.clear();
    }

    /// One field of one row: `` SELECT {field} FROM `{table}` {suffix} ``.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn table_value(
        &mut self,
        table: &str,
        field: &str,
        suffix: &str,
    ) -> Result<Option<SqlValue>, SqlFacadeError> {
        self.query_value(
            "SELECT %s FROM `%s` %s",
            &[
                QueryArg::str(field),
                QueryArg::str(table),
                QueryArg::str(suffix),
            ],
        )
    }

    /// `SELECT COUNT({field}) FROM {table} {suffix}`, zero when the query
    /// produces nothing countable.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn table_count(
        &mut self,
        table: &str,
        field: &str,
        suffix: &str,
    ) -> Result<i64, SqlFacadeError> {
        let value = self.query_value(
            "SELECT COUNT(%s) FROM %s %s",
            &[
                QueryArg::str(field),
                QueryArg::str(table),
                QueryArg::str(suffix),
            ],
        )?;
        Ok(value.and_then(|v| v.as_int()).unwrap_or(0))
    }

    /// `` SELECT SUM({field}) FROM `{table}` {suffix} ``, with a missing
    /// or NULL sum normalized to integer zero.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn table_sum(
        &mut self,
        table: &str,
        field: &str,
        suffix: &str,
    ) -> Result<SqlValue, SqlFacadeError> {
        let value = self.query_value(
            "SELECT SUM(%s) FROM `%s` %s",
            &[
                QueryArg::str(field),
                QueryArg::str(table),
                QueryArg::str(suffix),
            ],
        )?;
        Ok(match value {
            None | Some(SqlValue::Null) => SqlValue::Int(0),
            Some(v) => v,
        })
    }

    /// Open a transaction on the underlying connection.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn start_transaction(&mut self) -> Result<(), SqlFacadeError> {
        self.db.start_transaction()
    }

    /// Commit the open transaction.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn commit(&mut self) -> Result<(), SqlFacadeError> {
        self.db.commit()
    }

    /// Roll back the open transaction.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        self.db.rollback()
    }

    // Formats the template, then runs the buffered query path inside a
    // profiler span closed whether or not the driver call succeeds.
    fn run_query(&mut self, query: &str, args: &[QueryArg]) -> Result<(), SqlFacadeError> {
        let sql = format_query(query, args)?;
        self.profiler.named_start(&sql);
        let result = self.db.query(&sql);
        self.profiler.stop();
        result
    }
}

impl fmt::Debug for DbFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbFacade")
            .field("connected", &self.db.is_connected())
            .field("cached_statements", &self.statements.len())
            .field("last_result_count", &self.last_result_count)
            .finish()
    }
}
