//! Forward conversion: SqlValue → MySQLValue
//!
//! This module implements `From<SqlValue>` for `MySQLValue`, converting
//! coerced row values into MySQL parameters for INSERT statements.

use mysql_async::Value;
use sync_core::{Row, SqlValue};

/// MySQL value wrapper for type-safe conversions.
#[derive(Debug, Clone)]
pub struct MySQLValue(pub Value);

impl MySQLValue {
    /// Get the inner mysql_async::Value.
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Get a reference to the inner value.
    pub fn as_inner(&self) -> &Value {
        &self.0
    }
}

impl From<SqlValue> for MySQLValue {
    fn from(value: SqlValue) -> Self {
        match value {
            // Boolean - MySQL stores as TINYINT
            SqlValue::Bool(b) => MySQLValue(Value::Int(i64::from(b))),

            // Integer types
            SqlValue::SmallInt(i) => MySQLValue(Value::Int(i64::from(i))),
            SqlValue::Int(i) => MySQLValue(Value::Int(i64::from(i))),
            SqlValue::BigInt(i) => MySQLValue(Value::Int(i)),

            // Text - sent as bytes
            SqlValue::Text(s) => MySQLValue(Value::Bytes(s.into_bytes())),

            // DATETIME(3) accepts 'YYYY-MM-DD HH:MM:SS.fff' as text
            SqlValue::Timestamp(s) => MySQLValue(Value::Bytes(s.into_bytes())),

            // JSON - serialized document
            SqlValue::Json(v) => MySQLValue(Value::Bytes(v.to_string().into_bytes())),
        }
    }
}

/// Column names and positional parameters for a row, in column order.
pub fn row_params(row: &Row) -> (Vec<&str>, Vec<Value>) {
    row.columns()
        .iter()
        .map(|(name, value)| (name.as_str(), MySQLValue::from(value.clone()).into_inner()))
        .unzip()
}
