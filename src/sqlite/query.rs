use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use std::sync::Arc;

use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Extract one cell from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlFacadeError::SqliteError` if the value cannot be read.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlFacadeError> {
    let value: Value = row.get(idx)?;
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Integer(i) => Ok(SqlValue::Int(i)),
        Value::Real(f) => Ok(SqlValue::Float(f)),
        Value::Text(s) => Ok(SqlValue::Text(s)),
        Value::Blob(b) => Ok(SqlValue::Blob(b)),
    }
}

/// Run a compiled statement and buffer every row it produces.
///
/// Works for any statement kind: one without result columns simply yields
/// an empty set.
///
/// # Errors
/// Returns `SqlFacadeError::SqliteError` if execution or row reads fail.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, SqlFacadeError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(Arc::new(column_names), 10);

    let mut rows_iter = stmt.query(&param_refs[..])?;
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            row_values.push(extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
