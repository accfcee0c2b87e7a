//! Error types for catalog loading, type resolution and entry transformation.

use std::path::PathBuf;

/// Error type for schema and catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading a catalog file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a catalog file
    #[error("Failed to parse {path}: {source}")]
    FileJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error parsing an in-memory catalog document
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Object class definition without any name
    #[error("Object class definition has no names")]
    UnnamedObjectClass,

    /// `sql.includeObjectClass` refers to an object class that is not loaded
    #[error("Object class '{object_class}' includes unknown object class '{included}'")]
    UnknownObjectClass {
        object_class: String,
        included: String,
    },

    /// Resolved syntax has no entry in the syntax to SQL type mapping
    #[error("Syntax '{syntax}' of attribute '{attribute}' has no SQL type mapping")]
    UnmappedSyntax { attribute: String, syntax: String },

    /// Catalog entry has neither the requested dialect nor the fallback dialect
    #[error("Type mapping '{name}' has no entry for dialect '{dialect}'")]
    MissingDialect { name: String, dialect: String },

    /// The default syntax must always be mapped so every attribute gets a type
    #[error("Default syntax '{0}' is missing from the syntax to SQL type mapping")]
    MissingDefaultSyntax(String),
}

/// Error type for directory entry to row conversion.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Value could not be coerced into the attribute's resolved type
    #[error("Cannot convert value '{value}' of attribute '{attribute}': {source}")]
    ValueCoercion {
        attribute: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Entry has no object class besides the base class
    #[error("Entry '{dn}' has no object class to map to a table")]
    MissingObjectClass { dn: String },

    /// Entry DN has no RDN components
    #[error("Entry has an empty DN")]
    EmptyDn,

    /// Attribute present without any value
    #[error("Attribute '{attribute}' has no values")]
    EmptyValue { attribute: String },

    /// Type resolution failed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
