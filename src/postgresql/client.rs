//! PostgreSQL client
//!
//! [`SqlClient`] over a single `tokio-postgres` connection.

use async_trait::async_trait;
use postgresql_types::{classify_error, collect_column_types, row_params, PostgreSQLDdl, ToDdl};
use sync_core::tables::PRIMARY_KEY_COLUMN;
use sync_core::{
    ClientError, DdlOutcome, Dialect, ErrorClass, Row, SqlClient, TableColumnTypes,
    TableDefinition,
};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

pub struct PostgreSqlClient {
    client: Client,
}

impl PostgreSqlClient {
    /// Connect and spawn the connection task.
    pub async fn connect(connection_string: &str) -> Result<Self, ClientError> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| ClientError::backend("Connect to PostgreSQL", e))?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
        });

        Ok(Self { client })
    }

    async fn execute_ddl(&self, operation: String, sql: &str) -> Result<DdlOutcome, ClientError> {
        debug!("{sql}");
        match self.client.batch_execute(sql).await {
            Ok(()) => Ok(DdlOutcome::Created),
            Err(e) if classify_error(&e) == ErrorClass::AlreadyExists => {
                Ok(DdlOutcome::AlreadyExists)
            }
            Err(e) => Err(ClientError::backend(operation, e)),
        }
    }
}

#[async_trait]
impl SqlClient for PostgreSqlClient {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<DdlOutcome, ClientError> {
        let sql = PostgreSQLDdl.to_create_table(table);
        self.execute_ddl(format!("Create table {}", table.name), &sql)
            .await
    }

    async fn create_index(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<DdlOutcome, ClientError> {
        let sql = PostgreSQLDdl.to_create_index(name, table, column);
        debug!("{sql}");
        match self.client.batch_execute(&sql).await {
            Ok(()) => Ok(DdlOutcome::Created),
            Err(e) => match classify_error(&e) {
                ErrorClass::AlreadyExists => Ok(DdlOutcome::AlreadyExists),
                ErrorClass::MissingTable => Err(ClientError::MissingTable(table.to_string())),
                ErrorClass::Other => Err(ClientError::backend(format!("Create index {name}"), e)),
            },
        }
    }

    async fn create_index_raw(&self, statement: &str) -> Result<DdlOutcome, ClientError> {
        self.execute_ddl(format!("Execute '{statement}'"), statement)
            .await
    }

    async fn insert_row(&self, row: &Row) -> Result<(), ClientError> {
        let (columns, params) = row_params(row)?;
        let sql = PostgreSQLDdl.to_insert(row.table(), &columns);
        debug!("{sql}");

        // Convert to references for execution
        let param_refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        match self.client.execute(&sql, &param_refs).await {
            Ok(_) => Ok(()),
            Err(e) if classify_error(&e) == ErrorClass::MissingTable => {
                Err(ClientError::MissingTable(row.table().to_string()))
            }
            Err(e) => Err(ClientError::backend(
                format!("Insert into {}", row.table()),
                e,
            )),
        }
    }

    async fn row_exists(&self, table: &str, primary_key: &str) -> Result<bool, ClientError> {
        let sql = PostgreSQLDdl.to_row_exists(table, PRIMARY_KEY_COLUMN);
        match self.client.query_opt(&sql, &[&primary_key]).await {
            Ok(found) => Ok(found.is_some()),
            Err(e) if classify_error(&e) == ErrorClass::MissingTable => Ok(false),
            Err(e) => Err(ClientError::backend(format!("Look up row in {table}"), e)),
        }
    }

    async fn table_column_types(&self) -> Result<TableColumnTypes, ClientError> {
        let rows = self
            .client
            .query(postgresql_types::COLUMN_TYPES_QUERY, &[])
            .await
            .map_err(|e| ClientError::backend("Read information_schema.columns", e))?;

        Ok(collect_column_types(rows.iter().map(|row| {
            (
                row.get::<_, String>(0),
                row.get::<_, String>(1),
                row.get::<_, String>(2),
                row.get::<_, Option<i32>>(3),
            )
        })))
    }
}
