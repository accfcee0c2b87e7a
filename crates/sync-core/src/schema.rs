//! Directory schema definitions.
//!
//! A directory schema is made of attribute type definitions and object class
//! definitions, loaded from one or more JSON documents of the form:
//!
//! ```json
//! {
//!   "attributeTypes": [
//!     {"names": ["jansId"], "syntax": "1.3.6.1.4.1.1466.115.121.1.15"},
//!     {"names": ["jansRedirectURI"], "syntax": "1.3.6.1.4.1.1466.115.121.1.15", "multivalued": true}
//!   ],
//!   "objectClasses": [
//!     {"names": ["jansClnt"], "may": ["jansId", "jansRedirectURI"],
//!      "sql": {"include": ["del"], "includeObjectClass": ["jansClntCustomAttributes"]}}
//!   ]
//! }
//! ```
//!
//! Attribute definitions keep their load order: lookups return the first
//! definition that lists the name among its aliases. Object classes are keyed by
//! their primary (first) name; a later document redefining a class replaces it
//! in place.

use crate::error::SchemaError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Attribute type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTypeDefinition {
    /// Alias names; the first one is the primary name
    pub names: Vec<String>,

    /// LDAP syntax OID
    #[serde(default)]
    pub syntax: Option<String>,

    /// Whether the attribute can hold several values
    #[serde(default)]
    pub multivalued: bool,
}

impl AttributeTypeDefinition {
    /// Whether `name` is one of this definition's aliases.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// SQL-specific options attached to an object class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlOptions {
    /// Do not create a table for this object class
    #[serde(default)]
    pub ignore: bool,

    /// Extra attributes to add as columns
    #[serde(default)]
    pub include: Vec<String>,

    /// Object classes whose `may` attributes are merged in
    #[serde(default)]
    pub include_object_class: Vec<String>,
}

/// Object class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectClassDefinition {
    /// Names; the first one is the table name
    pub names: Vec<String>,

    /// Attributes an entry of this class may carry
    #[serde(default)]
    pub may: Vec<String>,

    /// SQL options
    #[serde(default)]
    pub sql: Option<SqlOptions>,
}

impl ObjectClassDefinition {
    /// Primary name of the object class.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether no table should be synthesized for this class.
    pub fn is_ignored(&self) -> bool {
        self.sql.as_ref().is_some_and(|sql| sql.ignore)
    }
}

/// One schema document as found on disk.
#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaDocument {
    #[serde(default, rename = "attributeTypes")]
    attribute_types: Vec<AttributeTypeDefinition>,

    #[serde(default, rename = "objectClasses")]
    object_classes: Vec<ObjectClassDefinition>,
}

/// Loaded directory schema.
#[derive(Debug, Clone, Default)]
pub struct DirectorySchema {
    attribute_types: Vec<AttributeTypeDefinition>,
    object_classes: Vec<ObjectClassDefinition>,
}

impl DirectorySchema {
    /// Load and merge schema documents, in order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SchemaError> {
        let mut schema = Self::default();
        for path in paths {
            let document: SchemaDocument = load_json(path.as_ref())?;
            schema.append(document)?;
        }
        Ok(schema)
    }

    /// Build a schema from a single in-memory document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_value(value)?;
        let mut schema = Self::default();
        schema.append(document)?;
        Ok(schema)
    }

    /// Merge another in-memory document into this schema.
    pub fn extend_from_value(&mut self, value: serde_json::Value) -> Result<(), SchemaError> {
        let document: SchemaDocument = serde_json::from_value(value)?;
        self.append(document)
    }

    fn append(&mut self, document: SchemaDocument) -> Result<(), SchemaError> {
        self.attribute_types.extend(document.attribute_types);

        for object_class in document.object_classes {
            if object_class.names.is_empty() {
                return Err(SchemaError::UnnamedObjectClass);
            }
            match self
                .object_classes
                .iter_mut()
                .find(|existing| existing.name() == object_class.name())
            {
                Some(existing) => *existing = object_class,
                None => self.object_classes.push(object_class),
            }
        }
        Ok(())
    }

    /// First attribute definition listing `name` among its aliases.
    pub fn attribute(&self, name: &str) -> Option<&AttributeTypeDefinition> {
        self.attribute_types.iter().find(|attr| attr.has_name(name))
    }

    /// Object class by primary name.
    pub fn object_class(&self, name: &str) -> Option<&ObjectClassDefinition> {
        self.object_classes.iter().find(|oc| oc.name() == name)
    }

    /// All attribute definitions in load order.
    pub fn attribute_types(&self) -> &[AttributeTypeDefinition] {
        &self.attribute_types
    }

    /// All object classes in load order.
    pub fn object_classes(&self) -> &[ObjectClassDefinition] {
        &self.object_classes
    }
}

/// Read and deserialize a JSON catalog file.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, SchemaError> {
    let contents = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SchemaError::FileJson {
        path: path.to_path_buf(),
        source,
    })
}
