//! Core translation engine for ldap-sql-sync.
//!
//! This crate turns a directory-style schema (object classes and attribute
//! types, loaded from JSON) and parsed directory entries into a relational
//! schema and relational rows for one of the supported SQL dialects.
//!
//! - [`Dialect`] - The closed set of target dialects and their fixed properties
//! - [`DirectorySchema`] - Attribute type and object class definitions
//! - [`TypeCatalog`] - Per-attribute overrides and syntax to SQL type mappings
//! - [`TypeResolver`] - Attribute name to physical column type
//! - [`synthesize_tables`] - One [`TableDefinition`] per object class
//! - [`IndexPlanner`] - Index statements for the tables that exist on the target
//! - [`EntryTransformer`] - [`DirectoryEntry`] to [`Row`] conversion
//! - [`SqlClient`] - The boundary to the SQL backend
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── ldif-source        (produces DirectoryEntry values from LDIF files)
//!    ├─── mysql-types        (DDL text, bind values, error codes for MySQL)
//!    └─── postgresql-types   (DDL text, bind values, error codes for PostgreSQL)
//! ```
//!
//! Nothing in this crate holds global state; every component borrows the
//! catalogs it needs, so the whole engine can be driven from in-memory
//! fixtures in tests.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use sync_core::{Dialect, DirectorySchema, IndexCatalog, IndexHints, TypeCatalog, Translator};
//!
//! let schema = DirectorySchema::from_value(json!({
//!     "attributeTypes": [{"names": ["displayName"], "syntax": "1.3.6.1.4.1.1466.115.121.1.15"}],
//!     "objectClasses": [{"names": ["jansPerson"], "may": ["displayName"]}]
//! })).unwrap();
//! let types = TypeCatalog::from_values(
//!     json!({"doc_id": {"mysql": {"type": "VARCHAR", "size": 64}}}),
//!     json!({"1.3.6.1.4.1.1466.115.121.1.15": {"mysql": {"type": "VARCHAR", "size": 64}}}),
//!     json!({}),
//! ).unwrap();
//! let translator = Translator::new(
//!     Dialect::MySql,
//!     schema,
//!     types,
//!     IndexCatalog::default(),
//!     IndexHints::default(),
//! ).unwrap();
//!
//! let tables = translator.synthesize_tables().unwrap();
//! assert_eq!(tables[0].name, "jansPerson");
//! assert_eq!(tables[0].column_names(), vec!["doc_id", "objectClass", "dn", "displayName"]);
//! ```

pub mod client;
pub mod dialect;
pub mod entry;
pub mod error;
pub mod indexes;
pub mod resolver;
pub mod schema;
pub mod tables;
pub mod template;
pub mod testing;
pub mod transform;
pub mod translator;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use client::{ClientError, DdlOutcome, ErrorClass, SqlClient, TableColumnTypes};
pub use dialect::{Dialect, DialectProfile};
pub use entry::{DirectoryEntry, DistinguishedName, Rdn};
pub use error::{SchemaError, TransformError};
pub use indexes::{create_indexes, IndexCatalog, IndexHints, IndexPlanner, IndexReport, IndexStatement};
pub use resolver::{TypeResolver, DEFAULT_SYNTAX, STRUCTURED_SYNTAX};
pub use schema::{AttributeTypeDefinition, DirectorySchema, ObjectClassDefinition, SqlOptions};
pub use tables::{create_tables, synthesize_tables, ColumnDefinition, TableDefinition, TableReport};
pub use transform::EntryTransformer;
pub use translator::Translator;
pub use types::{ColumnKind, SqlType, TypeCatalog, TypeSpec};
pub use values::{Row, SqlValue};
