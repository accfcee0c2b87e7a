//! Offline rendering of the bootstrap's statements and rows.

use anyhow::Context;
use ldif_source::LdifReader;
use std::path::Path;
use sync_core::tables::column_types_of;
use sync_core::{Dialect, IndexStatement, Row, TableDefinition, Translator};

fn create_table_sql(dialect: Dialect, table: &TableDefinition) -> String {
    match dialect {
        Dialect::MySql => mysql_types::ToDdl::to_create_table(&mysql_types::MySQLDdl, table),
        Dialect::PostgreSql => {
            postgresql_types::ToDdl::to_create_table(&postgresql_types::PostgreSQLDdl, table)
        }
    }
}

fn create_index_sql(dialect: Dialect, statement: &IndexStatement) -> String {
    match statement {
        IndexStatement::Column {
            name,
            table,
            column,
        } => match dialect {
            Dialect::MySql => {
                mysql_types::ToDdl::to_create_index(&mysql_types::MySQLDdl, name, table, column)
            }
            Dialect::PostgreSql => postgresql_types::ToDdl::to_create_index(
                &postgresql_types::PostgreSQLDdl,
                name,
                table,
                column,
            ),
        },
        IndexStatement::Expression { sql, .. } => sql.clone(),
    }
}

/// Every `CREATE TABLE` and `CREATE INDEX` statement a bootstrap would issue
/// against an empty target, in execution order.
///
/// With no live target, the synthesized tables stand in for the column types
/// the target would report.
pub fn plan_statements(translator: &Translator) -> anyhow::Result<Vec<String>> {
    let dialect = translator.dialect();
    let tables = translator
        .synthesize_tables()
        .context("Failed to synthesize tables")?;

    let mut statements: Vec<String> = tables
        .iter()
        .map(|table| format!("{};", create_table_sql(dialect, table)))
        .collect();

    let indexes = translator.plan_indexes(&column_types_of(&tables));
    statements.extend(
        indexes
            .iter()
            .map(|statement| format!("{};", create_index_sql(dialect, statement))),
    );

    Ok(statements)
}

/// Rows produced from one LDIF file; container entries produce none.
pub fn transform_file(translator: &Translator, path: &Path) -> anyhow::Result<Vec<Row>> {
    let transformer = translator.transformer();
    let reader =
        LdifReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for entry in reader {
        let entry = entry.with_context(|| format!("Failed to parse {}", path.display()))?;
        if let Some(row) = transformer
            .transform_entry(&entry)
            .with_context(|| format!("Failed to transform '{}'", entry.dn.as_str()))?
        {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// One JSON line per row: `{"table": ..., "row": {...}}`.
pub fn row_to_json_line(row: &Row) -> String {
    serde_json::json!({"table": row.table(), "row": row.to_json()}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sync_core::{DirectorySchema, IndexCatalog, IndexHints, TypeCatalog};

    const STRING_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.15";

    fn translator(dialect: Dialect) -> Translator {
        let schema = DirectorySchema::from_value(json!({
            "attributeTypes": [
                {"names": ["jansId"], "syntax": STRING_SYNTAX},
                {"names": ["jansRedirectURI"], "syntax": STRING_SYNTAX, "multivalued": true}
            ],
            "objectClasses": [
                {"names": ["jansClnt"], "may": ["jansId", "jansRedirectURI"]}
            ]
        }))
        .unwrap();
        let types = TypeCatalog::from_values(
            json!({"doc_id": {"mysql": {"type": "VARCHAR", "size": 64},
                              "pgsql": {"type": "VARCHAR", "size": 64}}}),
            json!({
                STRING_SYNTAX: {"mysql": {"type": "VARCHAR", "size": 64},
                                "pgsql": {"type": "VARCHAR", "size": 64}},
                "JSON": {"mysql": {"type": "JSON"}, "pgsql": {"type": "JSONB"}}
            }),
            json!({}),
        )
        .unwrap();
        let catalog = IndexCatalog::from_value(json!({
            "__common__": {"fields": ["jansId", "jansRedirectURI"], "JSON": ["(($field)->>'v')"]}
        }))
        .unwrap();
        Translator::new(dialect, schema, types, catalog, IndexHints::default()).unwrap()
    }

    #[test]
    fn test_plan_statements_mysql() {
        let statements = plan_statements(&translator(Dialect::MySql)).unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE `jansClnt` (\n  `doc_id` VARCHAR(64) NOT NULL,"));
        assert!(statements[0].contains("`jansRedirectURI` JSON"));
        assert_eq!(statements[1], "CREATE INDEX `jansClnt_jansId` ON `jansClnt` (`jansId`);");
        assert!(statements[2].starts_with("CREATE INDEX `jansClnt_jansRedirectURI_json_1`"));
    }

    #[test]
    fn test_plan_statements_postgresql() {
        let statements = plan_statements(&translator(Dialect::PostgreSql)).unwrap();
        assert!(statements[0].contains("\"jansRedirectURI\" JSONB"));
        assert_eq!(
            statements[1],
            "CREATE INDEX \"jansClnt_jansId\" ON \"jansClnt\" (\"jansId\");"
        );
    }

    #[test]
    fn test_transform_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clients.ldif");
        std::fs::write(
            &path,
            "dn: ou=clients,o=jans\nobjectClass: organizationalUnit\n\n\
             dn: inum=1800.1,ou=clients,o=jans\nobjectClass: top\nobjectClass: jansClnt\n\
             jansRedirectURI: https://a\njansRedirectURI: https://b\n",
        )
        .unwrap();

        let rows = transform_file(&translator(Dialect::MySql), &path).unwrap();
        assert_eq!(rows.len(), 1);
        let line: serde_json::Value = serde_json::from_str(&row_to_json_line(&rows[0])).unwrap();
        assert_eq!(line["table"], "jansClnt");
        assert_eq!(line["row"]["doc_id"], "1800.1");
        assert_eq!(line["row"]["jansRedirectURI"], json!({"v": ["https://a", "https://b"]}));
    }
}
