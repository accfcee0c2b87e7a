//! Physical SQL types and the catalogs they are resolved from.
//!
//! Three catalogs drive type resolution:
//!
//! - **Overrides** (`sql_data_types.json`): attribute name → dialect → type, with
//!   optional per-table overrides:
//!   ```json
//!   {"jansAttrs": {"mysql": {"type": "TEXT", "tables": {"jansClnt": {"type": "JSON"}}},
//!                  "pgsql": {"type": "JSONB"}}}
//!   ```
//! - **Syntax mapping** (`ldap_sql_data_type_mapping.json`): syntax OID → dialect → type:
//!   ```json
//!   {"1.3.6.1.4.1.1466.115.121.1.27": {"mysql": {"type": "INT"}, "pgsql": {"type": "INT"}}}
//!   ```
//! - **Legacy syntaxes** (`opendj_attributes_syntax.json`): attribute name → syntax OID,
//!   consulted for attributes absent from the directory schema.

use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::schema::load_json;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// Type entry in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Type name, e.g. `VARCHAR`, `DATETIME(3)`, `JSON`
    #[serde(rename = "type")]
    pub name: String,

    /// Declared size, rendered as `NAME(size)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    /// Per-table overrides keyed by table name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tables: BTreeMap<String, TypeSpec>,
}

/// Catalog entry: dialect key → type.
pub type DialectTypes = BTreeMap<String, TypeSpec>;

/// Pick the entry for `dialect`, falling back to [`Dialect::FALLBACK`].
fn for_dialect(types: &DialectTypes, dialect: Dialect) -> Option<&TypeSpec> {
    types
        .get(dialect.catalog_key())
        .or_else(|| types.get(Dialect::FALLBACK.catalog_key()))
}

/// Resolved physical column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlType {
    /// Type name as declared in the catalog
    pub name: String,
    /// Optional size suffix
    pub size: Option<u32>,
}

/// Coercion category of a physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// BOOL / BOOLEAN
    Boolean,
    /// SMALLINT / TINYINT used as a 0/1 flag
    SmallInt,
    /// 32-bit integer family
    Integer,
    /// BIGINT
    BigInteger,
    /// DATETIME / TIMESTAMP family
    Timestamp,
    /// JSON / JSONB
    Structured,
    /// Everything else, stored as text
    Text,
}

impl SqlType {
    /// Type without a size suffix.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    /// Type with a size suffix.
    pub fn sized(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
        }
    }

    /// Coercion category of this type.
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::of(&self.name)
    }

    /// Whether values of this type are stored as JSON documents.
    pub fn is_structured(&self) -> bool {
        self.kind() == ColumnKind::Structured
    }
}

impl From<&TypeSpec> for SqlType {
    fn from(spec: &TypeSpec) -> Self {
        Self {
            name: spec.name.clone(),
            size: spec.size,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "{}({size})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl ColumnKind {
    /// Classify a type name such as `SMALLINT`, `datetime(3)` or `jsonb`.
    pub fn of(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        match base {
            "BOOL" | "BOOLEAN" => ColumnKind::Boolean,
            "SMALLINT" | "TINYINT" => ColumnKind::SmallInt,
            "INT" | "INTEGER" | "MEDIUMINT" => ColumnKind::Integer,
            "BIGINT" => ColumnKind::BigInteger,
            "JSON" | "JSONB" => ColumnKind::Structured,
            b if b.starts_with("DATETIME") || b.starts_with("TIMESTAMP") => ColumnKind::Timestamp,
            _ => ColumnKind::Text,
        }
    }
}

/// Type mapping catalogs.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    overrides: HashMap<String, DialectTypes>,
    syntax_types: HashMap<String, DialectTypes>,
    legacy_syntaxes: HashMap<String, String>,
}

impl TypeCatalog {
    /// Build a catalog from already-parsed maps.
    pub fn new(
        overrides: HashMap<String, DialectTypes>,
        syntax_types: HashMap<String, DialectTypes>,
        legacy_syntaxes: HashMap<String, String>,
    ) -> Self {
        Self {
            overrides,
            syntax_types,
            legacy_syntaxes,
        }
    }

    /// Load the three catalog files.
    pub fn from_files(
        overrides: &Path,
        syntax_types: &Path,
        legacy_syntaxes: &Path,
    ) -> Result<Self, SchemaError> {
        Ok(Self::new(
            load_json(overrides)?,
            load_json(syntax_types)?,
            load_json(legacy_syntaxes)?,
        ))
    }

    /// Build a catalog from in-memory JSON documents.
    pub fn from_values(
        overrides: serde_json::Value,
        syntax_types: serde_json::Value,
        legacy_syntaxes: serde_json::Value,
    ) -> Result<Self, SchemaError> {
        Ok(Self::new(
            serde_json::from_value(overrides)?,
            serde_json::from_value(syntax_types)?,
            serde_json::from_value(legacy_syntaxes)?,
        ))
    }

    /// Explicit override for an attribute, already narrowed to `table` if the
    /// override declares a table-specific type.
    pub fn override_for(
        &self,
        attribute: &str,
        dialect: Dialect,
        table: Option<&str>,
    ) -> Result<Option<&TypeSpec>, SchemaError> {
        let Some(types) = self.overrides.get(attribute) else {
            return Ok(None);
        };
        let spec = for_dialect(types, dialect).ok_or_else(|| SchemaError::MissingDialect {
            name: attribute.to_string(),
            dialect: dialect.to_string(),
        })?;
        Ok(Some(
            table
                .and_then(|table| spec.tables.get(table))
                .unwrap_or(spec),
        ))
    }

    /// Type mapped to a syntax OID, if the syntax is known.
    pub fn syntax_type(
        &self,
        syntax: &str,
        dialect: Dialect,
    ) -> Result<Option<&TypeSpec>, SchemaError> {
        let Some(types) = self.syntax_types.get(syntax) else {
            return Ok(None);
        };
        for_dialect(types, dialect)
            .map(Some)
            .ok_or_else(|| SchemaError::MissingDialect {
                name: syntax.to_string(),
                dialect: dialect.to_string(),
            })
    }

    /// Whether a syntax OID has an entry in the syntax mapping.
    pub fn has_syntax(&self, syntax: &str) -> bool {
        self.syntax_types.contains_key(syntax)
    }

    /// Syntax recorded for an attribute in the legacy syntax table.
    pub fn legacy_syntax(&self, attribute: &str) -> Option<&str> {
        self.legacy_syntaxes.get(attribute).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_values(
            json!({
                "doc_id": {"mysql": {"type": "VARCHAR", "size": 64}},
                "jansAttrs": {
                    "mysql": {"type": "TEXT", "tables": {"jansClnt": {"type": "JSON"}}},
                    "pgsql": {"type": "JSONB"}
                }
            }),
            json!({
                "1.3.6.1.4.1.1466.115.121.1.27": {"mysql": {"type": "INT"}},
                "odd": {"oracle": {"type": "CLOB"}}
            }),
            json!({"jansLegacy": "1.3.6.1.4.1.1466.115.121.1.27"}),
        )
        .unwrap()
    }

    #[test]
    fn test_sql_type_display() {
        assert_eq!(SqlType::sized("VARCHAR", 64).to_string(), "VARCHAR(64)");
        assert_eq!(SqlType::new("DATETIME(3)").to_string(), "DATETIME(3)");
    }

    #[test]
    fn test_column_kind_classification() {
        assert_eq!(ColumnKind::of("BOOL"), ColumnKind::Boolean);
        assert_eq!(ColumnKind::of("boolean"), ColumnKind::Boolean);
        assert_eq!(ColumnKind::of("SMALLINT"), ColumnKind::SmallInt);
        assert_eq!(ColumnKind::of("INT"), ColumnKind::Integer);
        assert_eq!(ColumnKind::of("int(11)"), ColumnKind::Integer);
        assert_eq!(ColumnKind::of("BIGINT"), ColumnKind::BigInteger);
        assert_eq!(ColumnKind::of("DATETIME(3)"), ColumnKind::Timestamp);
        assert_eq!(ColumnKind::of("TIMESTAMP"), ColumnKind::Timestamp);
        assert_eq!(ColumnKind::of("json"), ColumnKind::Structured);
        assert_eq!(ColumnKind::of("JSONB"), ColumnKind::Structured);
        assert_eq!(ColumnKind::of("VARCHAR"), ColumnKind::Text);
        assert_eq!(ColumnKind::of("TINYTEXT"), ColumnKind::Text);
    }

    #[test]
    fn test_override_falls_back_to_default_dialect() {
        let catalog = catalog();
        let spec = catalog
            .override_for("doc_id", Dialect::PostgreSql, None)
            .unwrap()
            .unwrap();
        assert_eq!(SqlType::from(spec).to_string(), "VARCHAR(64)");
    }

    #[test]
    fn test_override_table_specific() {
        let catalog = catalog();
        let generic = catalog
            .override_for("jansAttrs", Dialect::MySql, Some("jansPerson"))
            .unwrap()
            .unwrap();
        let specific = catalog
            .override_for("jansAttrs", Dialect::MySql, Some("jansClnt"))
            .unwrap()
            .unwrap();
        assert_eq!(generic.name, "TEXT");
        assert_eq!(specific.name, "JSON");
    }

    #[test]
    fn test_missing_dialect_is_an_error() {
        let catalog = catalog();
        assert!(catalog.syntax_type("odd", Dialect::PostgreSql).is_err());
        assert!(catalog.syntax_type("unknown", Dialect::MySql).unwrap().is_none());
    }

    #[test]
    fn test_legacy_syntax_lookup() {
        let catalog = catalog();
        assert_eq!(
            catalog.legacy_syntax("jansLegacy"),
            Some("1.3.6.1.4.1.1466.115.121.1.27")
        );
        assert_eq!(catalog.legacy_syntax("other"), None);
    }
}
