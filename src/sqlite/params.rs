use rusqlite::ToSql;
use rusqlite::types::Value;

use crate::statement::{BoundParam, ParamKind};
use crate::types::SqlValue;

/// Convert one facade value to its `rusqlite` equivalent.
#[must_use]
pub fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::UInt(u) => match i64::try_from(*u) {
            Ok(i) => Value::Integer(i),
            // Beyond i64 range; SQLite has no unsigned storage class
            Err(_) => Value::Text(u.to_string()),
        },
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        SqlValue::Null => Value::Null,
        SqlValue::Json(jval) => Value::Text(jval.to_string()),
        SqlValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Unified `SQLite` parameter container.
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert bound statement slots, honoring each slot's wire kind: a
    /// text slot promoted to the blob kind binds as raw bytes.
    pub(crate) fn from_bound(params: &[BoundParam]) -> Self {
        let values = params
            .iter()
            .map(|(kind, value)| match (kind, value) {
                (ParamKind::Blob, SqlValue::Text(s)) => Value::Blob(s.clone().into_bytes()),
                (_, value) => to_sqlite_value(value),
            })
            .collect();
        Params(values)
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn ToSql> {
        self.0.iter().map(|v| v as &dyn ToSql).collect()
    }
}
