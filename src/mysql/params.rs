use chrono::{Datelike, Timelike};
use mysql::Value;

use crate::statement::BoundParam;
use crate::types::SqlValue;

/// Convert one facade value to its `MySQL` wire equivalent.
#[must_use]
pub fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Int(*i),
        SqlValue::UInt(u) => Value::UInt(*u),
        SqlValue::Float(f) => Value::Double(*f),
        SqlValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SqlValue::Bool(b) => Value::Int(i64::from(*b)),
        SqlValue::Timestamp(dt) => match u16::try_from(dt.year()) {
            Ok(year) => Value::Date(
                year,
                dt.month() as u8,
                dt.day() as u8,
                dt.hour() as u8,
                dt.minute() as u8,
                dt.second() as u8,
                dt.and_utc().timestamp_subsec_micros(),
            ),
            // Outside the wire's year range; bind as text instead
            Err(_) => Value::Bytes(dt.format("%F %T%.f").to_string().into_bytes()),
        },
        SqlValue::Null => Value::NULL,
        SqlValue::Json(jval) => Value::Bytes(jval.to_string().into_bytes()),
        SqlValue::Blob(bytes) => Value::Bytes(bytes.clone()),
    }
}

/// Unified `MySQL` parameter container.
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert bound statement slots. Text and blob kinds share the same
    /// wire form here, so the slot kind carries no extra information.
    pub(crate) fn from_bound(params: &[BoundParam]) -> Self {
        Params(
            params
                .iter()
                .map(|(_, value)| to_mysql_value(value))
                .collect(),
        )
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}
