//! MySQL schema introspection and error classification.

use sync_core::{ErrorClass, TableColumnTypes};

/// Column types of every table in the connected database.
pub const COLUMN_TYPES_QUERY: &str = "
    SELECT TABLE_NAME, COLUMN_NAME, DATA_TYPE, COLUMN_TYPE
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
    ORDER BY TABLE_NAME, ORDINAL_POSITION";

/// `ER_TABLE_EXISTS_ERROR`
pub const ER_TABLE_EXISTS: u16 = 1050;

/// `ER_DUP_KEYNAME`
pub const ER_DUP_KEYNAME: u16 = 1061;

/// `ER_NO_SUCH_TABLE`
pub const ER_NO_SUCH_TABLE: u16 = 1146;

/// Normalise an INFORMATION_SCHEMA column type to the form used in DDL.
///
/// `COLUMN_TYPE` carries the size (`varchar(64)`), `DATA_TYPE` only the base
/// name; the former wins when present.
///
/// ```
/// use mysql_types::mysql_column_type;
///
/// assert_eq!(mysql_column_type("varchar", "varchar(64)"), "VARCHAR(64)");
/// assert_eq!(mysql_column_type("json", ""), "JSON");
/// ```
pub fn mysql_column_type(data_type: &str, column_type: &str) -> String {
    let column_type = column_type.trim();
    if column_type.is_empty() {
        data_type.trim().to_uppercase()
    } else {
        column_type.to_uppercase()
    }
}

/// Group `(table, column, data_type, column_type)` rows into a column type map.
pub fn collect_column_types<I>(rows: I) -> TableColumnTypes
where
    I: IntoIterator<Item = (String, String, String, String)>,
{
    let mut tables = TableColumnTypes::new();
    for (table, column, data_type, column_type) in rows {
        tables
            .entry(table)
            .or_default()
            .insert(column, mysql_column_type(&data_type, &column_type));
    }
    tables
}

/// Classify a MySQL server error code.
pub fn classify_code(code: u16) -> ErrorClass {
    match code {
        ER_TABLE_EXISTS | ER_DUP_KEYNAME => ErrorClass::AlreadyExists,
        ER_NO_SUCH_TABLE => ErrorClass::MissingTable,
        _ => ErrorClass::Other,
    }
}

/// Classify a driver error; only server errors carry a code.
pub fn classify_error(err: &mysql_async::Error) -> ErrorClass {
    match err {
        mysql_async::Error::Server(server) => classify_code(server.code),
        _ => ErrorClass::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_normalisation() {
        assert_eq!(mysql_column_type("smallint", "smallint"), "SMALLINT");
        assert_eq!(mysql_column_type("datetime", "datetime(3)"), "DATETIME(3)");
        assert_eq!(mysql_column_type("tinytext", " tinytext "), "TINYTEXT");
    }

    #[test]
    fn test_collect_column_types() {
        let rows = vec![
            ("jansClnt".to_string(), "doc_id".to_string(), "varchar".to_string(), "varchar(64)".to_string()),
            ("jansClnt".to_string(), "jansRedirectURI".to_string(), "json".to_string(), "json".to_string()),
            ("jansPerson".to_string(), "doc_id".to_string(), "varchar".to_string(), "varchar(128)".to_string()),
        ];
        let tables = collect_column_types(rows);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables["jansClnt"]["jansRedirectURI"], "JSON");
        assert_eq!(tables["jansPerson"]["doc_id"], "VARCHAR(128)");
    }

    #[test]
    fn test_classify_code() {
        assert_eq!(classify_code(1050), ErrorClass::AlreadyExists);
        assert_eq!(classify_code(1061), ErrorClass::AlreadyExists);
        assert_eq!(classify_code(1146), ErrorClass::MissingTable);
        assert_eq!(classify_code(1045), ErrorClass::Other);
    }
}
