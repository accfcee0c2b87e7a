//! PostgreSQL physical layer for ldap-sql-sync.
//!
//! # Structure
//!
//! - `forward`: Convert `SqlValue` → `PostgreSQLValue` → boxed `ToSql` parameters
//! - `ddl`: Generate PostgreSQL statements from `TableDefinition`
//! - `schema`: information_schema column types and SQLSTATE classification

pub mod ddl;
pub mod forward;
pub mod schema;

pub use ddl::{PostgreSQLDdl, ToDdl};
pub use forward::{parse_timestamp, pg_value_to_boxed, row_params, PostgreSQLValue};
pub use schema::{
    classify_error, classify_state, collect_column_types, postgresql_column_type,
    COLUMN_TYPES_QUERY,
};
