//! Forward conversion: SqlValue → PostgreSQL value
//!
//! This module implements `TryFrom<SqlValue>` for `PostgreSQLValue`. Unlike
//! MySQL, PostgreSQL binds parameters with their wire type, so timestamps are
//! parsed into `NaiveDateTime` here and a malformed one is rejected before the
//! statement is sent.

use chrono::NaiveDateTime;
use sync_core::{ClientError, Row, SqlValue};
use tokio_postgres::types::ToSql;

/// Format produced by timestamp coercion; the fraction is optional.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// PostgreSQL value wrapper for type-safe conversions.
///
/// This enum wraps the PostgreSQL-compatible types that can be used
/// with tokio-postgres queries.
#[derive(Debug, Clone, PartialEq)]
pub enum PostgreSQLValue {
    /// Boolean value
    Bool(bool),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Text/string value
    Text(String),
    /// Timestamp without timezone
    Timestamp(NaiveDateTime),
    /// JSON value (binds to both JSON and JSONB)
    Json(serde_json::Value),
}

/// Parse a coerced timestamp string.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

impl PostgreSQLValue {
    /// Convert a coerced value bound for `column`.
    pub fn from_sql_value(column: &str, value: SqlValue) -> Result<Self, ClientError> {
        Ok(match value {
            SqlValue::Bool(b) => PostgreSQLValue::Bool(b),
            SqlValue::SmallInt(i) => PostgreSQLValue::Int16(i),
            SqlValue::Int(i) => PostgreSQLValue::Int32(i),
            SqlValue::BigInt(i) => PostgreSQLValue::Int64(i),
            SqlValue::Text(s) => PostgreSQLValue::Text(s),
            SqlValue::Timestamp(s) => match parse_timestamp(&s) {
                Some(ts) => PostgreSQLValue::Timestamp(ts),
                None => {
                    return Err(ClientError::InvalidValue {
                        column: column.to_string(),
                        message: format!("'{s}' is not a valid timestamp"),
                    })
                }
            },
            SqlValue::Json(v) => PostgreSQLValue::Json(v),
        })
    }
}

/// Convert a PostgreSQLValue to a boxed ToSql trait object.
pub fn pg_value_to_boxed(value: PostgreSQLValue) -> Box<dyn ToSql + Sync + Send> {
    match value {
        PostgreSQLValue::Bool(b) => Box::new(b),
        PostgreSQLValue::Int16(i) => Box::new(i),
        PostgreSQLValue::Int32(i) => Box::new(i),
        PostgreSQLValue::Int64(i) => Box::new(i),
        PostgreSQLValue::Text(s) => Box::new(s),
        PostgreSQLValue::Timestamp(ts) => Box::new(ts),
        PostgreSQLValue::Json(j) => Box::new(j),
    }
}

/// Column names and boxed parameters for a row, in column order.
pub fn row_params(row: &Row) -> Result<(Vec<&str>, Vec<Box<dyn ToSql + Sync + Send>>), ClientError> {
    let mut columns = Vec::with_capacity(row.len());
    let mut params: Vec<Box<dyn ToSql + Sync + Send>> = Vec::with_capacity(row.len());
    for (name, value) in row.columns() {
        let pg_value = PostgreSQLValue::from_sql_value(name, value.clone())?;
        columns.push(name.as_str());
        params.push(pg_value_to_boxed(pg_value));
    }
    Ok((columns, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(
            PostgreSQLValue::from_sql_value("c", SqlValue::Bool(true)).unwrap(),
            PostgreSQLValue::Bool(true)
        );
        assert_eq!(
            PostgreSQLValue::from_sql_value("c", SqlValue::SmallInt(1)).unwrap(),
            PostgreSQLValue::Int16(1)
        );
        assert_eq!(
            PostgreSQLValue::from_sql_value("c", SqlValue::BigInt(-7)).unwrap(),
            PostgreSQLValue::Int64(-7)
        );
        assert_eq!(
            PostgreSQLValue::from_sql_value("c", "abc".into()).unwrap(),
            PostgreSQLValue::Text("abc".to_string())
        );
    }

    #[test]
    fn test_timestamp_with_fraction() {
        let value = PostgreSQLValue::from_sql_value(
            "jansLastLogonTime",
            SqlValue::Timestamp("2024-01-31 23:59:59.123".to_string()),
        )
        .unwrap();
        let PostgreSQLValue::Timestamp(ts) = value else {
            panic!("Expected Timestamp value");
        };
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(ts.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_timestamp_without_fraction() {
        let ts = parse_timestamp("2020-06-01 10:00:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.nanosecond(), 0);
    }

    #[test]
    fn test_malformed_timestamp_is_rejected() {
        let err = PostgreSQLValue::from_sql_value(
            "jansExpDate",
            SqlValue::Timestamp("20-- ::".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue { ref column, .. } if column == "jansExpDate"));
    }

    #[test]
    fn test_row_params() {
        let mut row = Row::new("jansClnt");
        row.insert("doc_id", "123".into());
        row.insert("jansRedirectURI", SqlValue::Json(json!({"v": ["https://a"]})));

        let (columns, params) = row_params(&row).unwrap();
        assert_eq!(columns, vec!["doc_id", "jansRedirectURI"]);
        assert_eq!(params.len(), 2);
    }
}
