//! MySQL physical layer for ldap-sql-sync.
//!
//! This crate provides the MySQL-specific pieces the bootstrap needs, kept
//! free of connection handling so they can be tested without a server.
//!
//! # Structure
//!
//! - `forward`: Convert `SqlValue` → `MySQLValue` (for INSERT operations)
//! - `ddl`: Generate MySQL statements from `TableDefinition`
//! - `schema`: INFORMATION_SCHEMA column types and server error classification
//!
//! # Example
//!
//! ```rust
//! use mysql_types::{classify_code, MySQLDdl, MySQLValue, ToDdl};
//! use sync_core::{ErrorClass, SqlValue};
//!
//! let value: MySQLValue = SqlValue::Bool(true).into();
//! assert!(matches!(value.0, mysql_async::Value::Int(1)));
//!
//! assert_eq!(MySQLDdl.to_create_index("t_c", "t", "c"), "CREATE INDEX `t_c` ON `t` (`c`)");
//! assert_eq!(classify_code(1061), ErrorClass::AlreadyExists);
//! ```

pub mod ddl;
pub mod forward;
pub mod schema;

pub use ddl::{MySQLDdl, ToDdl};
pub use forward::{row_params, MySQLValue};
pub use schema::{
    classify_code, classify_error, collect_column_types, mysql_column_type, COLUMN_TYPES_QUERY,
};
