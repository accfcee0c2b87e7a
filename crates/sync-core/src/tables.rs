//! Table synthesis from object class definitions.

use crate::client::{ClientError, DdlOutcome, SqlClient, TableColumnTypes};
use crate::error::SchemaError;
use crate::resolver::TypeResolver;
use crate::schema::{DirectorySchema, ObjectClassDefinition};
use crate::types::SqlType;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Primary key column of every synthesized table.
pub const PRIMARY_KEY_COLUMN: &str = "doc_id";

/// Column holding the entry's structural object class.
pub const OBJECT_CLASS_COLUMN: &str = "objectClass";

/// Column holding the entry's full DN.
pub const DN_COLUMN: &str = "dn";

const OBJECT_CLASS_SIZE: u32 = 48;
const DN_SIZE: u32 = 128;

/// Column of a synthesized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// Synthesized table: name, primary key and ordered columns (primary key included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Column → rendered type map, in the shape a live target reports it.
    pub fn column_types(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.sql_type.to_string()))
            .collect()
    }
}

/// Column types of a set of synthesized tables, for planning without a live target.
pub fn column_types_of(tables: &[TableDefinition]) -> TableColumnTypes {
    tables
        .iter()
        .map(|t| (t.name.clone(), t.column_types()))
        .collect()
}

/// Attributes stored in an object class's table: its `may` list, then
/// `sql.include`, then the `may` lists of `sql.includeObjectClass` classes,
/// without duplicates. Included classes are not expanded further.
pub fn effective_attributes(
    schema: &DirectorySchema,
    object_class: &ObjectClassDefinition,
) -> Result<Vec<String>, SchemaError> {
    let mut seen = HashSet::new();
    let mut attributes = Vec::new();
    let mut add = |name: &String| {
        if seen.insert(name.clone()) {
            attributes.push(name.clone());
        }
    };

    object_class.may.iter().for_each(&mut add);

    if let Some(sql) = &object_class.sql {
        sql.include.iter().for_each(&mut add);

        for included in &sql.include_object_class {
            let other =
                schema
                    .object_class(included)
                    .ok_or_else(|| SchemaError::UnknownObjectClass {
                        object_class: object_class.name().to_string(),
                        included: included.clone(),
                    })?;
            other.may.iter().for_each(&mut add);
        }
    }

    Ok(attributes)
}

/// Build the table for one object class.
pub fn synthesize_table(
    schema: &DirectorySchema,
    resolver: &TypeResolver<'_>,
    object_class: &ObjectClassDefinition,
) -> Result<TableDefinition, SchemaError> {
    let table = object_class.name();

    let mut columns = vec![
        ColumnDefinition::new(
            PRIMARY_KEY_COLUMN,
            resolver.resolve_type(PRIMARY_KEY_COLUMN, Some(table))?,
        ),
        ColumnDefinition::new(OBJECT_CLASS_COLUMN, SqlType::sized("VARCHAR", OBJECT_CLASS_SIZE)),
        ColumnDefinition::new(DN_COLUMN, SqlType::sized("VARCHAR", DN_SIZE)),
    ];

    for attribute in effective_attributes(schema, object_class)? {
        if columns.iter().any(|c| c.name == attribute) {
            continue;
        }
        let sql_type = resolver.resolve_type(&attribute, Some(table))?;
        columns.push(ColumnDefinition::new(attribute, sql_type));
    }

    Ok(TableDefinition {
        name: table.to_string(),
        primary_key: PRIMARY_KEY_COLUMN.to_string(),
        columns,
    })
}

/// Build one table per object class not marked `sql.ignore`, in schema order.
pub fn synthesize_tables(
    schema: &DirectorySchema,
    resolver: &TypeResolver<'_>,
) -> Result<Vec<TableDefinition>, SchemaError> {
    schema
        .object_classes()
        .iter()
        .filter(|oc| !oc.is_ignored())
        .map(|oc| synthesize_table(schema, resolver, oc))
        .collect()
}

/// Outcome of the table creation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Create every table, treating already existing tables as success.
pub async fn create_tables<C: SqlClient + ?Sized>(
    client: &C,
    tables: &[TableDefinition],
) -> Result<TableReport, ClientError> {
    let mut report = TableReport::default();

    for table in tables {
        debug!("Creating table {} ({} columns)", table.name, table.columns.len());
        match client.create_table(table).await? {
            DdlOutcome::Created => report.created.push(table.name.clone()),
            DdlOutcome::AlreadyExists => {
                info!("Table {} already exists", table.name);
                report.existing.push(table.name.clone());
            }
        }
    }

    Ok(report)
}
