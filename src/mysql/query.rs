use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mysql::Value;
use mysql::consts::{ColumnFlags, ColumnType};
use mysql::prelude::Protocol;

use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Per-column metadata needed to decode wire values.
#[derive(Debug, Clone, Copy)]
pub struct ColumnInfo {
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
}

/// Decode one wire value using its column metadata.
///
/// The text protocol returns every non-NULL cell as bytes, so the column
/// type drives the decoding there; the binary protocol already returns
/// typed values for numeric and temporal columns. Both land here.
#[must_use]
pub fn decode_value(value: Value, info: &ColumnInfo) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(i) => SqlValue::Int(i),
        Value::UInt(u) => SqlValue::UInt(u),
        Value::Float(f) => SqlValue::Float(f64::from(f)),
        Value::Double(d) => SqlValue::Float(d),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            decode_date(year, month, day, hour, minute, second, micros)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            SqlValue::Text(render_time(negative, days, hours, minutes, seconds, micros))
        }
        Value::Bytes(bytes) => decode_bytes(bytes, info),
    }
}

fn decode_date(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
) -> SqlValue {
    // The zero date has no chrono representation and comes back as NULL
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|d| {
            d.and_hms_micro_opt(
                u32::from(hour),
                u32::from(minute),
                u32::from(second),
                micros,
            )
        })
        .map_or(SqlValue::Null, SqlValue::Timestamp)
}

fn render_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + u32::from(hours);
    if micros == 0 {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

fn decode_bytes(bytes: Vec<u8>, info: &ColumnInfo) -> SqlValue {
    use ColumnType::*;

    let binary = info.flags.contains(ColumnFlags::BINARY_FLAG);
    match info.column_type {
        MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG
        | MYSQL_TYPE_LONGLONG | MYSQL_TYPE_YEAR => decode_integer(&bytes, info.flags),
        MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE => {
            let text = String::from_utf8_lossy(&bytes);
            match text.parse::<f64>() {
                Ok(f) => SqlValue::Float(f),
                Err(_) => SqlValue::Text(text.into_owned()),
            }
        }
        MYSQL_TYPE_TIMESTAMP | MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => {
            decode_datetime_text(&bytes)
        }
        MYSQL_TYPE_JSON => match serde_json::from_slice(&bytes) {
            Ok(jval) => SqlValue::Json(jval),
            Err(_) => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        },
        // TEXT columns report as blob types without the binary flag
        MYSQL_TYPE_TINY_BLOB | MYSQL_TYPE_MEDIUM_BLOB | MYSQL_TYPE_LONG_BLOB | MYSQL_TYPE_BLOB
        | MYSQL_TYPE_STRING | MYSQL_TYPE_VAR_STRING | MYSQL_TYPE_VARCHAR => {
            if binary {
                SqlValue::Blob(bytes)
            } else {
                SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
        MYSQL_TYPE_BIT | MYSQL_TYPE_GEOMETRY => SqlValue::Blob(bytes),
        // DECIMAL and friends stay textual to preserve exactness
        _ => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn decode_integer(bytes: &[u8], flags: ColumnFlags) -> SqlValue {
    let text = String::from_utf8_lossy(bytes);
    if flags.contains(ColumnFlags::UNSIGNED_FLAG) {
        match text.parse::<u64>() {
            Ok(u) => SqlValue::UInt(u),
            Err(_) => SqlValue::Text(text.into_owned()),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => SqlValue::Int(i),
            Err(_) => SqlValue::Text(text.into_owned()),
        }
    }
}

fn decode_datetime_text(bytes: &[u8]) -> SqlValue {
    let text = String::from_utf8_lossy(bytes);
    if let Ok(dt) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f") {
        return SqlValue::Timestamp(dt);
    }
    if let Some(dt) = NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return SqlValue::Timestamp(dt);
    }
    // Zero dates and anything else unparseable pass through as text
    SqlValue::Text(text.into_owned())
}

/// Shared column names and decode metadata for one native result set.
pub(crate) fn column_header<P: Protocol>(
    rs: &mysql::ResultSet<'_, '_, '_, '_, P>,
) -> (Arc<Vec<String>>, Vec<ColumnInfo>) {
    let columns = rs.columns();
    let mut names = Vec::with_capacity(columns.as_ref().len());
    let mut infos = Vec::with_capacity(columns.as_ref().len());
    for column in columns.as_ref() {
        names.push(column.name_str().to_string());
        infos.push(ColumnInfo {
            column_type: column.column_type(),
            flags: column.flags(),
        });
    }
    (Arc::new(names), infos)
}

/// Decode one native row into facade values, in column order.
pub(crate) fn decode_row(mut row: mysql::Row, infos: &[ColumnInfo]) -> Vec<SqlValue> {
    let mut values = Vec::with_capacity(infos.len());
    for (i, info) in infos.iter().enumerate() {
        let value = row.take::<Value, _>(i).unwrap_or(Value::NULL);
        values.push(decode_value(value, info));
    }
    values
}

/// Drain a native result set into a client-side buffer.
///
/// # Errors
/// Returns `SqlFacadeError::MysqlError` if reading a row fails mid-stream.
pub(crate) fn buffer_result_set<P: Protocol>(
    rs: mysql::ResultSet<'_, '_, '_, '_, P>,
) -> Result<ResultSet, SqlFacadeError> {
    let (names, infos) = column_header(&rs);
    let mut out = ResultSet::with_capacity(names, 10);
    for row in rs {
        let row = row?;
        out.add_row_values(decode_row(row, &infos));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(column_type: ColumnType, flags: ColumnFlags) -> ColumnInfo {
        ColumnInfo { column_type, flags }
    }

    #[test]
    fn text_protocol_integers_decode_by_column_type() {
        let signed = info(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::empty());
        assert_eq!(
            decode_value(Value::Bytes(b"-42".to_vec()), &signed),
            SqlValue::Int(-42)
        );

        let unsigned = info(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::UNSIGNED_FLAG);
        assert_eq!(
            decode_value(Value::Bytes(u64::MAX.to_string().into_bytes()), &unsigned),
            SqlValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn text_protocol_datetimes_become_timestamps() {
        let ts = info(ColumnType::MYSQL_TYPE_DATETIME, ColumnFlags::BINARY_FLAG);
        let decoded = decode_value(Value::Bytes(b"2024-03-09 14:30:00".to_vec()), &ts);
        match decoded {
            SqlValue::Timestamp(dt) => {
                assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-09 14:30:00");
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn zero_dates_stay_textual() {
        let ts = info(ColumnType::MYSQL_TYPE_DATETIME, ColumnFlags::BINARY_FLAG);
        assert_eq!(
            decode_value(Value::Bytes(b"0000-00-00 00:00:00".to_vec()), &ts),
            SqlValue::Text("0000-00-00 00:00:00".to_string())
        );
    }

    #[test]
    fn binary_flag_separates_blob_from_text() {
        let blob = info(ColumnType::MYSQL_TYPE_BLOB, ColumnFlags::BINARY_FLAG);
        assert_eq!(
            decode_value(Value::Bytes(vec![0, 159, 146]), &blob),
            SqlValue::Blob(vec![0, 159, 146])
        );

        // A TEXT column reports the blob type without the binary flag
        let text = info(ColumnType::MYSQL_TYPE_BLOB, ColumnFlags::empty());
        assert_eq!(
            decode_value(Value::Bytes(b"plain".to_vec()), &text),
            SqlValue::Text("plain".to_string())
        );
    }

    #[test]
    fn json_columns_parse_into_structured_values() {
        let json = info(ColumnType::MYSQL_TYPE_JSON, ColumnFlags::empty());
        assert_eq!(
            decode_value(Value::Bytes(br#"{"a": 1}"#.to_vec()), &json),
            SqlValue::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn decimals_keep_exact_text() {
        let dec = info(ColumnType::MYSQL_TYPE_NEWDECIMAL, ColumnFlags::empty());
        assert_eq!(
            decode_value(Value::Bytes(b"12345.6789".to_vec()), &dec),
            SqlValue::Text("12345.6789".to_string())
        );
    }

    #[test]
    fn binary_protocol_values_pass_through() {
        let any = info(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::empty());
        assert_eq!(decode_value(Value::Int(7), &any), SqlValue::Int(7));
        assert_eq!(decode_value(Value::Double(2.5), &any), SqlValue::Float(2.5));
        assert_eq!(
            decode_value(Value::Date(2024, 3, 9, 0, 0, 0, 0), &any),
            SqlValue::Timestamp(
                NaiveDate::from_ymd_opt(2024, 3, 9)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn negative_times_render_with_sign() {
        assert_eq!(render_time(true, 1, 2, 3, 4, 0), "-26:03:04");
        assert_eq!(render_time(false, 0, 8, 30, 0, 500_000), "08:30:00.500000");
    }
}
