//! In-memory [`SqlClient`] for tests and dry runs.
//!
//! Mirrors the contract real backends follow: repeated DDL reports
//! [`DdlOutcome::AlreadyExists`], inserting into an unknown table or reusing a
//! primary key fails, and `row_exists` on an unknown table is `false`.

use crate::client::{ClientError, DdlOutcome, SqlClient, TableColumnTypes};
use crate::dialect::Dialect;
use crate::tables::TableDefinition;
use crate::values::{Row, SqlValue};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// Everything a [`MemoryClient`] has been asked to create.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Tables by name
    pub tables: BTreeMap<String, TableDefinition>,
    /// Column indexes by name, as `(table, column)`
    pub indexes: BTreeMap<String, (String, String)>,
    /// Raw `CREATE INDEX` statements
    pub raw_indexes: BTreeSet<String>,
    /// Inserted rows, in insertion order
    pub rows: Vec<Row>,
}

impl MemoryState {
    /// Rows inserted into one table.
    pub fn rows_in(&self, table: &str) -> Vec<&Row> {
        self.rows.iter().filter(|row| row.table() == table).collect()
    }
}

/// [`SqlClient`] backed by a mutex-guarded [`MemoryState`].
#[derive(Debug, Default)]
pub struct MemoryClient {
    dialect: Dialect,
    state: Mutex<MemoryState>,
}

impl MemoryClient {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> MemoryState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn primary_key_of<'r>(row: &'r Row, table: &TableDefinition) -> Option<&'r SqlValue> {
    row.get(&table.primary_key)
}

#[async_trait]
impl SqlClient for MemoryClient {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<DdlOutcome, ClientError> {
        let mut state = self.lock();
        if state.tables.contains_key(&table.name) {
            return Ok(DdlOutcome::AlreadyExists);
        }
        state.tables.insert(table.name.clone(), table.clone());
        Ok(DdlOutcome::Created)
    }

    async fn create_index(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<DdlOutcome, ClientError> {
        let mut state = self.lock();
        if !state.tables.contains_key(table) {
            return Err(ClientError::MissingTable(table.to_string()));
        }
        if state.indexes.contains_key(name) {
            return Ok(DdlOutcome::AlreadyExists);
        }
        state
            .indexes
            .insert(name.to_string(), (table.to_string(), column.to_string()));
        Ok(DdlOutcome::Created)
    }

    async fn create_index_raw(&self, statement: &str) -> Result<DdlOutcome, ClientError> {
        let mut state = self.lock();
        if state.raw_indexes.insert(statement.to_string()) {
            Ok(DdlOutcome::Created)
        } else {
            Ok(DdlOutcome::AlreadyExists)
        }
    }

    async fn insert_row(&self, row: &Row) -> Result<(), ClientError> {
        let mut state = self.lock();
        let table = state
            .tables
            .get(row.table())
            .ok_or_else(|| ClientError::MissingTable(row.table().to_string()))?;

        let key = primary_key_of(row, table).cloned();
        let duplicate = state.rows.iter().any(|existing| {
            existing.table() == row.table() && existing.get(&table.primary_key) == key.as_ref()
        });
        if duplicate {
            return Err(ClientError::backend(
                format!("INSERT INTO {}", row.table()),
                format!("duplicate primary key {:?}", key),
            ));
        }

        state.rows.push(row.clone());
        Ok(())
    }

    async fn row_exists(&self, table: &str, primary_key: &str) -> Result<bool, ClientError> {
        let state = self.lock();
        let Some(definition) = state.tables.get(table) else {
            return Ok(false);
        };
        Ok(state.rows.iter().any(|row| {
            row.table() == table
                && row.get(&definition.primary_key).and_then(SqlValue::as_str) == Some(primary_key)
        }))
    }

    async fn table_column_types(&self) -> Result<TableColumnTypes, ClientError> {
        let state = self.lock();
        Ok(state
            .tables
            .values()
            .map(|table| (table.name.clone(), table.column_types()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ColumnDefinition;
    use crate::types::SqlType;

    fn table() -> TableDefinition {
        TableDefinition {
            name: "jansClnt".into(),
            primary_key: "doc_id".into(),
            columns: vec![
                ColumnDefinition::new("doc_id", SqlType::sized("VARCHAR", 64)),
                ColumnDefinition::new("displayName", SqlType::sized("VARCHAR", 64)),
            ],
        }
    }

    fn row(id: &str) -> Row {
        let mut row = Row::new("jansClnt");
        row.insert("doc_id", id.into());
        row
    }

    #[tokio::test]
    async fn test_rows_and_markers() {
        let client = MemoryClient::new(Dialect::MySql);
        assert!(!client.row_exists("jansClnt", "a").await.unwrap());
        assert!(matches!(
            client.insert_row(&row("a")).await,
            Err(ClientError::MissingTable(_))
        ));

        client.create_table(&table()).await.unwrap();
        client.insert_row(&row("a")).await.unwrap();
        assert!(client.row_exists("jansClnt", "a").await.unwrap());
        assert!(!client.row_exists("jansClnt", "b").await.unwrap());
        assert!(client.insert_row(&row("a")).await.is_err());
        assert_eq!(client.snapshot().rows_in("jansClnt").len(), 1);
    }

    #[tokio::test]
    async fn test_indexes_are_idempotent() {
        let client = MemoryClient::new(Dialect::PostgreSql);
        client.create_table(&table()).await.unwrap();

        assert_eq!(
            client.create_index("i", "jansClnt", "displayName").await.unwrap(),
            DdlOutcome::Created
        );
        assert_eq!(
            client.create_index("i", "jansClnt", "displayName").await.unwrap(),
            DdlOutcome::AlreadyExists
        );
        assert_eq!(client.create_index_raw("CREATE INDEX x").await.unwrap(), DdlOutcome::Created);
        assert_eq!(
            client.create_index_raw("CREATE INDEX x").await.unwrap(),
            DdlOutcome::AlreadyExists
        );

        let types = client.table_column_types().await.unwrap();
        assert_eq!(types["jansClnt"]["displayName"], "VARCHAR(64)");
        assert_eq!(client.quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
