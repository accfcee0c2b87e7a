//! PostgreSQL statement generation.

use sync_core::{Dialect, TableDefinition};

/// Trait for generating the statements the bootstrap issues.
pub trait ToDdl {
    /// Quote an identifier.
    fn quote(&self, name: &str) -> String;

    /// Generate a CREATE TABLE statement with the table's primary key.
    fn to_create_table(&self, table: &TableDefinition) -> String;

    /// Generate a CREATE INDEX statement on one column.
    fn to_create_index(&self, name: &str, table: &str, column: &str) -> String;

    /// Generate an INSERT statement with `$n` placeholders.
    fn to_insert(&self, table: &str, columns: &[&str]) -> String;

    /// Generate a query selecting one row by primary key.
    fn to_row_exists(&self, table: &str, primary_key: &str) -> String;
}

/// PostgreSQL DDL generator.
pub struct PostgreSQLDdl;

impl ToDdl for PostgreSQLDdl {
    fn quote(&self, name: &str) -> String {
        Dialect::PostgreSql.quote_identifier(name)
    }

    fn to_create_table(&self, table: &TableDefinition) -> String {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                if column.name == table.primary_key {
                    format!("  {} {} NOT NULL", self.quote(&column.name), column.sql_type)
                } else {
                    format!("  {} {}", self.quote(&column.name), column.sql_type)
                }
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
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();

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
            "SELECT 1 FROM {} WHERE {} = $1 LIMIT 1",
            self.quote(table),
            self.quote(primary_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::{ColumnDefinition, SqlType};

    #[test]
    fn test_create_table_with_pk() {
        let table = TableDefinition {
            name: "jansPerson".to_string(),
            primary_key: "doc_id".to_string(),
            columns: vec![
                ColumnDefinition::new("doc_id", SqlType::sized("VARCHAR", 64)),
                ColumnDefinition::new("mail", SqlType::new("JSONB")),
                ColumnDefinition::new("jansLastLogonTime", SqlType::new("TIMESTAMP")),
            ],
        };

        assert_eq!(
            PostgreSQLDdl.to_create_table(&table),
            "CREATE TABLE \"jansPerson\" (\n  \"doc_id\" VARCHAR(64) NOT NULL,\n  \"mail\" JSONB,\n  \"jansLastLogonTime\" TIMESTAMP,\n  PRIMARY KEY (\"doc_id\")\n)"
        );
    }

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            PostgreSQLDdl.to_insert("jansPerson", &["doc_id", "objectClass", "dn"]),
            "INSERT INTO \"jansPerson\" (\"doc_id\", \"objectClass\", \"dn\") VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_index_and_lookup() {
        assert_eq!(
            PostgreSQLDdl.to_create_index("jansPerson_uid", "jansPerson", "uid"),
            "CREATE INDEX \"jansPerson_uid\" ON \"jansPerson\" (\"uid\")"
        );
        assert_eq!(
            PostgreSQLDdl.to_row_exists("jansClnt", "doc_id"),
            "SELECT 1 FROM \"jansClnt\" WHERE \"doc_id\" = $1 LIMIT 1"
        );
    }
}
