//! Backend selection.

use crate::config::mask_connection_password;
use crate::mysql::MySqlClient;
use crate::postgresql::PostgreSqlClient;
use anyhow::Context;
use sync_core::{Dialect, SqlClient};
use tracing::info;

/// Connect to the target for `dialect`.
pub async fn connect_client(
    dialect: Dialect,
    connection_string: &str,
) -> anyhow::Result<Box<dyn SqlClient>> {
    let masked = mask_connection_password(connection_string);
    info!("Connecting to {dialect} target {masked}");

    let client: Box<dyn SqlClient> = match dialect {
        Dialect::MySql => Box::new(
            MySqlClient::new(connection_string)
                .with_context(|| format!("Invalid MySQL connection string {masked}"))?,
        ),
        Dialect::PostgreSql => Box::new(
            PostgreSqlClient::connect(connection_string)
                .await
                .with_context(|| format!("Failed to connect to PostgreSQL at {masked}"))?,
        ),
    };
    Ok(client)
}
