//! SQL backend boundary.
//!
//! The engine never talks to a database directly; table, index and row
//! creation go through [`SqlClient`]. Implementations are expected to map the
//! backend's own "object already exists" error codes to
//! [`DdlOutcome::AlreadyExists`] so callers can treat re-runs as benign, and to
//! report every other failure as a [`ClientError`].

use crate::dialect::Dialect;
use crate::tables::TableDefinition;
use crate::values::Row;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Column types per table, as reported by the target: table → column → type.
pub type TableColumnTypes = BTreeMap<String, BTreeMap<String, String>>;

/// Result of an idempotent DDL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlOutcome {
    /// The object was created by this call
    Created,
    /// The object was already present
    AlreadyExists,
}

/// How a backend error relates to the idempotency contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The object being created is already present
    AlreadyExists,
    /// The referenced table does not exist
    MissingTable,
    /// Any other failure
    Other,
}

/// Error reported by a SQL backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Backend failure other than "already exists"
    #[error("{operation} failed: {source}")]
    Backend {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Value could not be bound to its column
    #[error("Invalid value for column '{column}': {message}")]
    InvalidValue { column: String, message: String },

    /// Table referenced by an operation does not exist
    #[error("Table '{0}' does not exist")]
    MissingTable(String),
}

impl ClientError {
    /// Wrap a backend error with the operation that produced it.
    pub fn backend(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ClientError::Backend {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

/// SQL execution client used by the synthesizers and the bootstrap.
#[async_trait]
pub trait SqlClient: Send + Sync {
    /// Dialect spoken by the backend.
    fn dialect(&self) -> Dialect;

    /// Create a table with its primary key.
    async fn create_table(&self, table: &TableDefinition) -> Result<DdlOutcome, ClientError>;

    /// Create a plain index on one column.
    async fn create_index(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<DdlOutcome, ClientError>;

    /// Execute a complete `CREATE INDEX` statement.
    async fn create_index_raw(&self, statement: &str) -> Result<DdlOutcome, ClientError>;

    /// Insert one row into its table.
    async fn insert_row(&self, row: &Row) -> Result<(), ClientError>;

    /// Whether a row with the given primary key exists. A missing table counts
    /// as "no row".
    async fn row_exists(&self, table: &str, primary_key: &str) -> Result<bool, ClientError>;

    /// Column types of every table in the target schema.
    async fn table_column_types(&self) -> Result<TableColumnTypes, ClientError>;

    /// Quote an identifier for this backend.
    fn quote_identifier(&self, name: &str) -> String {
        self.dialect().quote_identifier(name)
    }

    /// Release pooled connections. Nothing may be issued afterwards.
    async fn close(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

#[async_trait]
impl<T: SqlClient + ?Sized> SqlClient for Box<T> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<DdlOutcome, ClientError> {
        (**self).create_table(table).await
    }

    async fn create_index(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<DdlOutcome, ClientError> {
        (**self).create_index(name, table, column).await
    }

    async fn create_index_raw(&self, statement: &str) -> Result<DdlOutcome, ClientError> {
        (**self).create_index_raw(statement).await
    }

    async fn insert_row(&self, row: &Row) -> Result<(), ClientError> {
        (**self).insert_row(row).await
    }

    async fn row_exists(&self, table: &str, primary_key: &str) -> Result<bool, ClientError> {
        (**self).row_exists(table, primary_key).await
    }

    async fn table_column_types(&self) -> Result<TableColumnTypes, ClientError> {
        (**self).table_column_types().await
    }

    fn quote_identifier(&self, name: &str) -> String {
        (**self).quote_identifier(name)
    }

    async fn close(&self) -> Result<(), ClientError> {
        (**self).close().await
    }
}
