//! PostgreSQL schema introspection and error classification.

use sync_core::{ErrorClass, TableColumnTypes};
use tokio_postgres::error::SqlState;

/// Column types of every table in the current schema.
///
/// information_schema columns are domain types, hence the casts.
pub const COLUMN_TYPES_QUERY: &str = "
    SELECT table_name::text, column_name::text, data_type::text,
           character_maximum_length::int4
    FROM information_schema.columns
    WHERE table_schema = current_schema()
    ORDER BY table_name, ordinal_position";

/// Normalise an information_schema `data_type` to the spelling used in DDL.
///
/// ```
/// use postgresql_types::postgresql_column_type;
///
/// assert_eq!(postgresql_column_type("character varying", Some(64)), "VARCHAR(64)");
/// assert_eq!(postgresql_column_type("jsonb", None), "JSONB");
/// ```
pub fn postgresql_column_type(data_type: &str, max_length: Option<i32>) -> String {
    let data_type = data_type.trim().to_lowercase();
    match data_type.as_str() {
        "character varying" | "varchar" => match max_length {
            Some(n) => format!("VARCHAR({n})"),
            None => "VARCHAR".to_string(),
        },
        "character" | "char" => match max_length {
            Some(n) => format!("CHAR({n})"),
            None => "CHAR".to_string(),
        },
        "timestamp without time zone" => "TIMESTAMP".to_string(),
        "timestamp with time zone" => "TIMESTAMPTZ".to_string(),
        other => other.to_uppercase(),
    }
}

/// Group `(table, column, data_type, max_length)` rows into a column type map.
pub fn collect_column_types<I>(rows: I) -> TableColumnTypes
where
    I: IntoIterator<Item = (String, String, String, Option<i32>)>,
{
    let mut tables = TableColumnTypes::new();
    for (table, column, data_type, max_length) in rows {
        tables
            .entry(table)
            .or_default()
            .insert(column, postgresql_column_type(&data_type, max_length));
    }
    tables
}

/// Classify a SQLSTATE.
pub fn classify_state(state: &SqlState) -> ErrorClass {
    if *state == SqlState::DUPLICATE_TABLE || *state == SqlState::DUPLICATE_OBJECT {
        ErrorClass::AlreadyExists
    } else if *state == SqlState::UNDEFINED_TABLE {
        ErrorClass::MissingTable
    } else {
        ErrorClass::Other
    }
}

/// Classify a driver error; connection-level errors carry no SQLSTATE.
pub fn classify_error(err: &tokio_postgres::Error) -> ErrorClass {
    err.code().map(classify_state).unwrap_or(ErrorClass::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_normalisation() {
        assert_eq!(postgresql_column_type("boolean", None), "BOOLEAN");
        assert_eq!(postgresql_column_type("smallint", None), "SMALLINT");
        assert_eq!(postgresql_column_type("text", None), "TEXT");
        assert_eq!(postgresql_column_type("json", None), "JSON");
        assert_eq!(
            postgresql_column_type("timestamp without time zone", None),
            "TIMESTAMP"
        );
        assert_eq!(
            postgresql_column_type("timestamp with time zone", None),
            "TIMESTAMPTZ"
        );
    }

    #[test]
    fn test_collect_column_types() {
        let rows = vec![
            ("jansClnt".to_string(), "doc_id".to_string(), "character varying".to_string(), Some(64)),
            ("jansClnt".to_string(), "jansRedirectURI".to_string(), "jsonb".to_string(), None),
        ];
        let tables = collect_column_types(rows);
        assert_eq!(tables["jansClnt"]["doc_id"], "VARCHAR(64)");
        assert_eq!(tables["jansClnt"]["jansRedirectURI"], "JSONB");
    }

    #[test]
    fn test_classify_state() {
        assert_eq!(classify_state(&SqlState::from_code("42P07")), ErrorClass::AlreadyExists);
        assert_eq!(classify_state(&SqlState::from_code("42710")), ErrorClass::AlreadyExists);
        assert_eq!(classify_state(&SqlState::from_code("42P01")), ErrorClass::MissingTable);
        assert_eq!(classify_state(&SqlState::from_code("23505")), ErrorClass::Other);
    }
}
