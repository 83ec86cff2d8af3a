use thiserror::Error;

/// Error type shared by every fallible operation in this crate.
///
/// Native driver errors pass through unmodified via the transparent variants;
/// everything the facade layer itself detects gets a message-carrying variant.
#[derive(Debug, Error)]
pub enum SqlFacadeError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MysqlError(#[from] mysql::Error),

    /// Establishing the connection failed. Carries the native error code
    /// and message so callers can branch on the code.
    #[error("Connection error {code}: {message}")]
    ConnectionError { code: i32, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The driver refused to compile a statement.
    #[error("Prepare error: {0}")]
    PrepareError(String),

    /// A requested key column is absent from the result row.
    #[error("No column named '{0}' in result row")]
    InvalidColumn(String),

    /// A query template and its argument list do not line up.
    #[error("Format error: {0}")]
    FormatError(String),

    /// The operation needs an open prepared statement but the handle
    /// has been closed.
    #[error("Prepared statement is closed")]
    StatementClosed,
}
