use crate::error::SqlFacadeError;
use crate::outcome::ExecOutcome;
use crate::results::{Row, Rows};
use crate::statement::Statement;
use crate::types::SqlValue;

/// Per-row callback for the unbuffered exclusive query path.
pub type RowCallback<'a> = dyn FnMut(&Row) -> Result<(), SqlFacadeError> + 'a;

/// The capability surface a backend exposes to the facade.
///
/// One adapter wraps one native connection, established lazily on first
/// use. The facade owns the adapter boxed, so every method here is
/// object-safe; the generic hydration forms live on [`Rows`] instead.
///
/// At most one buffered result is active per adapter: `query` replaces the
/// active result (unread rows are discarded), the fetch family consumes it,
/// and `fetch_generator` detaches it entirely.
pub trait DriverAdapter: Send {
    /// Non-blocking liveness check. Never forces a connection.
    fn is_connected(&self) -> bool;

    /// Establish the native connection if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError::ConnectionError` carrying the native code
    /// and message when the server refuses the connection.
    fn ensure_connected(&mut self) -> Result<(), SqlFacadeError>;

    /// Escape a string for inclusion inside a single-quoted SQL literal.
    ///
    /// Connects first when the escape rules depend on the session (MySQL
    /// charset); SQLite escaping is purely lexical.
    ///
    /// # Errors
    ///
    /// Only connection establishment can fail here.
    fn escape(&mut self, raw: &str) -> Result<String, SqlFacadeError>;

    /// Open a transaction on the connection.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    fn start_transaction(&mut self) -> Result<(), SqlFacadeError>;

    /// Commit the open transaction.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    fn commit(&mut self) -> Result<(), SqlFacadeError>;

    /// Roll back the open transaction.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    fn rollback(&mut self) -> Result<(), SqlFacadeError>;

    /// Run a statement that is not expected to produce rows.
    ///
    /// Reports the auto-generated insert id when the statement produced
    /// one, otherwise the affected-row count (zero included).
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    fn exec(&mut self, query: &str) -> Result<ExecOutcome, SqlFacadeError>;

    /// Run a query and buffer its rows as the new active result.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through; the prior active result is
    /// discarded either way.
    fn query(&mut self, query: &str) -> Result<(), SqlFacadeError>;

    /// Stream a query without client-side buffering.
    ///
    /// `on_started` fires once the server has accepted the query, before
    /// the first row; `per_row` then receives each row in order. The native
    /// result is released before this returns, even when `per_row` fails
    /// partway. Needs `&mut self` for its whole duration, so nothing else
    /// can touch the connection while rows stream.
    ///
    /// Returns true when the query ran and every row was delivered.
    ///
    /// # Errors
    ///
    /// Native driver errors pass through; a `per_row` error propagates
    /// after the native result has been released.
    fn query_exclusive_callback(
        &mut self,
        query: &str,
        on_started: &mut dyn FnMut(),
        per_row: &mut RowCallback<'_>,
    ) -> Result<bool, SqlFacadeError>;

    /// Total number of rows in the active result, zero when there is none.
    /// Consuming rows does not change this.
    fn fetch_count(&self) -> usize;

    /// Next row of the active result, name-addressable. None when the
    /// result is exhausted or there is no active result.
    fn fetch(&mut self) -> Option<Row>;

    /// Next row of the active result as positional values.
    fn fetch_num(&mut self) -> Option<Vec<SqlValue>>;

    /// First cell of the next row. None means end of data; a NULL cell
    /// comes back as `Some(SqlValue::Null)`.
    fn fetch_value(&mut self) -> Option<SqlValue>;

    /// Every remaining row of the active result. Empty when there is none.
    fn fetch_all(&mut self) -> Vec<Row>;

    /// Detach the active result and hand it over as an owning iterator.
    /// The adapter is left with no active result; when it had none, the
    /// returned iterator is empty.
    fn fetch_generator(&mut self) -> Rows;

    /// Compile a prepared statement against this connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError::PrepareError` when the driver refuses to
    /// compile the text, `ConnectionError` when connecting fails.
    fn prepare(&mut self, query: &str) -> Result<Statement, SqlFacadeError>;
}
