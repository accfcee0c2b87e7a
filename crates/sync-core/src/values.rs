//! Coerced column values and relational rows.

use serde_json::{Map, Value};

/// Value coerced to the representation its column type requires.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// BOOL / BOOLEAN column
    Bool(bool),
    /// SMALLINT / TINYINT flag column (0 or 1)
    SmallInt(i16),
    /// 32-bit integer column
    Int(i32),
    /// BIGINT column
    BigInt(i64),
    /// Text-family column
    Text(String),
    /// DATETIME / TIMESTAMP column, formatted as `YYYY-MM-DD HH:MM:SS.fff`
    Timestamp(String),
    /// JSON / JSONB column
    Json(Value),
}

impl SqlValue {
    /// Text view of the value, if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) | SqlValue::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    /// JSON representation, used when printing rows.
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::SmallInt(i) => Value::from(*i),
            SqlValue::Int(i) => Value::from(*i),
            SqlValue::BigInt(i) => Value::from(*i),
            SqlValue::Text(s) | SqlValue::Timestamp(s) => Value::String(s.clone()),
            SqlValue::Json(v) => v.clone(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

/// Relational row destined for one table.
///
/// Columns keep insertion order; inserting an existing column name replaces its
/// value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: String,
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Destination table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Set a column value, replacing an existing one with the same name.
    pub fn insert(&mut self, column: impl Into<String>, value: SqlValue) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> &[(String, SqlValue)] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// JSON object of the row's columns, in column order.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.columns {
            object.insert(name.clone(), value.to_json());
        }
        Value::Object(object)
    }
}
