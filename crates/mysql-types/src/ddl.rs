//! MySQL statement generation.
//!
//! Identifiers are quoted with backticks; values are always bound as `?`
//! parameters.

use sync_core::{Dialect, TableDefinition};

/// Trait for generating the statements the bootstrap issues.
pub trait ToDdl {
    /// Quote an identifier.
    fn quote(&self, name: &str) -> String;

    /// Generate a CREATE TABLE statement with the table's primary key.
    fn to_create_table(&self, table: &TableDefinition) -> String;

    /// Generate a CREATE INDEX statement on one column.
    fn to_create_index(&self, name: &str, table: &str, column: &str) -> String;

    /// Generate an INSERT statement template for the given columns.
    fn to_insert(&self, table: &str, columns: &[&str]) -> String;

    /// Generate a query selecting one row by primary key.
    fn to_row_exists(&self, table: &str, primary_key: &str) -> String;
}

/// MySQL DDL generator.
pub struct MySQLDdl;

impl ToDdl for MySQLDdl {
    fn quote(&self, name: &str) -> String {
        Dialect::MySql.quote_identifier(name)
    }

    fn to_create_table(&self, table: &TableDefinition) -> String {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let null_clause = if column.name == table.primary_key {
                    " NOT NULL"
                } else {
                    ""
                };
                format!("  {} {}{}", self.quote(&column.name), column.sql_type, null_clause)
            })
            .collect();

        format!(
            "CREATE TABLE {} (\n{},\n  PRIMARY KEY ({})\n)",
            self.quote(&table.name),
            column_defs.join(",\n"),
            self.quote(&table.primary_key)
        )
    }

    fn to_create_index(&self, name: &str, table: &str, column: &str) -> String {
        format!(
            "CREATE INDEX {} ON {} ({})",
            self.quote(name),
            self.quote(table),
            self.quote(column)
        )
    }

    fn to_insert(&self, table: &str, columns: &[&str]) -> String {
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote(table),
            columns
                .iter()
                .map(|c| self.quote(c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders.join(", ")
        )
    }

    fn to_row_exists(&self, table: &str, primary_key: &str) -> String {
        format!(
            "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
            self.quote(table),
            self.quote(primary_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::{ColumnDefinition, SqlType};

    fn table() -> TableDefinition {
        TableDefinition {
            name: "jansClnt".to_string(),
            primary_key: "doc_id".to_string(),
            columns: vec![
                ColumnDefinition::new("doc_id", SqlType::sized("VARCHAR", 64)),
                ColumnDefinition::new("objectClass", SqlType::sized("VARCHAR", 48)),
                ColumnDefinition::new("jansRedirectURI", SqlType::new("JSON")),
            ],
        }
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            MySQLDdl.to_create_table(&table()),
            "CREATE TABLE `jansClnt` (\n  `doc_id` VARCHAR(64) NOT NULL,\n  `objectClass` VARCHAR(48),\n  `jansRedirectURI` JSON,\n  PRIMARY KEY (`doc_id`)\n)"
        );
    }

    #[test]
    fn test_create_index() {
        assert_eq!(
            MySQLDdl.to_create_index("jansClnt_del", "jansClnt", "del"),
            "CREATE INDEX `jansClnt_del` ON `jansClnt` (`del`)"
        );
    }

    #[test]
    fn test_insert_and_lookup() {
        assert_eq!(
            MySQLDdl.to_insert("jansClnt", &["doc_id", "dn"]),
            "INSERT INTO `jansClnt` (`doc_id`, `dn`) VALUES (?, ?)"
        );
        assert_eq!(
            MySQLDdl.to_row_exists("jansClnt", "doc_id"),
            "SELECT 1 FROM `jansClnt` WHERE `doc_id` = ? LIMIT 1"
        );
    }

    #[test]
    fn test_quote_escapes_backticks() {
        assert_eq!(MySQLDdl.quote("a`b"), "`a``b`");
    }
}
