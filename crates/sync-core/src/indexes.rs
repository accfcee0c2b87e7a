//! Index synthesis.
//!
//! Which columns get an index is the union of three sources:
//!
//! 1. the table's own `fields` in the dialect index catalog,
//! 2. the catalog's `__common__.fields`,
//! 3. fields named by the secondary index-hint catalog.
//!
//! Plain columns get one standard index each. Structured (JSON) columns get one
//! functional index per `__common__.JSON` template instead, because a plain
//! index over a JSON column is either rejected or useless on both dialects.
//! Raw `custom` expressions declared for a table are added as-is.
//!
//! Index catalog shape (`mysql_index.json` / `postgresql_index.json`):
//!
//! ```json
//! {
//!   "__common__": {"fields": ["del", "jansId"],
//!                  "JSON": ["(CAST(($field->\"$$.v\") AS CHAR(128) ARRAY))"]},
//!   "jansClnt": {"fields": ["displayName"], "custom": ["LOWER(`displayName`)"]}
//! }
//! ```

use crate::client::{ClientError, DdlOutcome, SqlClient, TableColumnTypes};
use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::schema::load_json;
use crate::tables::{OBJECT_CLASS_COLUMN, PRIMARY_KEY_COLUMN};
use crate::template::safe_substitute;
use crate::types::ColumnKind;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Key of the entry shared by all tables.
const COMMON_KEY: &str = "__common__";

/// Index settings for one table (or for all tables under `__common__`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableIndexSpec {
    /// Columns to index
    #[serde(default)]
    pub fields: Vec<String>,

    /// Raw index expressions
    #[serde(default)]
    pub custom: Vec<String>,

    /// Functional index templates for JSON columns (only read from `__common__`)
    #[serde(default, rename = "JSON")]
    pub json_templates: Vec<String>,
}

/// Dialect index catalog.
#[derive(Debug, Clone, Default)]
pub struct IndexCatalog {
    common: TableIndexSpec,
    tables: HashMap<String, TableIndexSpec>,
}

impl IndexCatalog {
    pub fn new(common: TableIndexSpec, tables: HashMap<String, TableIndexSpec>) -> Self {
        Self { common, tables }
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self::from_map(load_json(path)?))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        Ok(Self::from_map(serde_json::from_value(value)?))
    }

    fn from_map(mut tables: HashMap<String, TableIndexSpec>) -> Self {
        let common = tables.remove(COMMON_KEY).unwrap_or_default();
        Self { common, tables }
    }

    pub fn common(&self) -> &TableIndexSpec {
        &self.common
    }

    pub fn table(&self, table: &str) -> Option<&TableIndexSpec> {
        self.tables.get(table)
    }
}

#[derive(Debug, Deserialize)]
struct HintDefinition {
    #[serde(default)]
    attributes: Vec<Vec<String>>,

    #[serde(default, rename = "static")]
    statics: Vec<Vec<serde_json::Value>>,
}

/// Field names taken from the secondary index-hint catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexHints {
    fields: BTreeSet<String>,
}

impl IndexHints {
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: BTreeSet<String> = fields.into_iter().map(Into::into).collect();
        fields.remove(OBJECT_CLASS_COLUMN);
        Self { fields }
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self::from_definitions(load_json(path)?))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        Ok(Self::from_definitions(serde_json::from_value(value)?))
    }

    /// Flatten `attributes` lists and the field lists of `static` entries;
    /// expressions (anything containing a parenthesis) are not fields.
    fn from_definitions(definitions: HashMap<String, HintDefinition>) -> Self {
        let mut fields = Vec::new();

        for definition in definitions.into_values() {
            fields.extend(definition.attributes.into_iter().flatten());

            for entry in definition.statics {
                let Some(serde_json::Value::Array(items)) = entry.into_iter().next() else {
                    continue;
                };
                fields.extend(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .filter(|item| !item.contains('(')),
                );
            }
        }

        Self::from_fields(fields)
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }
}

/// Index to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatement {
    /// Standard index on one column
    Column {
        name: String,
        table: String,
        column: String,
    },
    /// Complete `CREATE INDEX` statement over an expression
    Expression {
        name: String,
        table: String,
        sql: String,
    },
}

impl IndexStatement {
    pub fn name(&self) -> &str {
        match self {
            IndexStatement::Column { name, .. } | IndexStatement::Expression { name, .. } => name,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            IndexStatement::Column { table, .. } | IndexStatement::Expression { table, .. } => {
                table
            }
        }
    }
}

/// Replace each run of characters other than ASCII letters, digits and
/// whitespace with a single `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c.is_whitespace() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Base index name for a column: `{table}_{sanitized column}`.
pub fn index_name(table: &str, column: &str) -> String {
    format!("{table}_{}", sanitize_identifier(column))
}

/// Computes index statements for tables that exist on the target.
#[derive(Debug, Clone, Copy)]
pub struct IndexPlanner<'a> {
    dialect: Dialect,
    catalog: &'a IndexCatalog,
    hints: &'a IndexHints,
}

impl<'a> IndexPlanner<'a> {
    pub fn new(dialect: Dialect, catalog: &'a IndexCatalog, hints: &'a IndexHints) -> Self {
        Self {
            dialect,
            catalog,
            hints,
        }
    }

    /// Columns of `table` that should be indexed.
    pub fn fields_for(&self, table: &str) -> BTreeSet<&'a str> {
        let own = self
            .catalog
            .table(table)
            .map(|spec| spec.fields.as_slice())
            .unwrap_or_default();

        let mut fields: BTreeSet<&'a str> = own
            .iter()
            .chain(self.catalog.common.fields.iter())
            .chain(self.hints.fields.iter())
            .map(String::as_str)
            .collect();
        fields.remove(PRIMARY_KEY_COLUMN);
        fields
    }

    /// Index statements for every table in `live`, in table then column order.
    pub fn plan(&self, live: &TableColumnTypes) -> Vec<IndexStatement> {
        let mut statements = Vec::new();

        for (table, columns) in live {
            let fields = self.fields_for(table);

            for (column, column_type) in columns {
                if column == PRIMARY_KEY_COLUMN || !fields.contains(column.as_str()) {
                    continue;
                }
                statements.extend(self.column_indexes(table, column, column_type));
            }

            let custom = self
                .catalog
                .table(table)
                .map(|spec| spec.custom.as_slice())
                .unwrap_or_default();
            for (i, expression) in custom.iter().enumerate() {
                let name = format!("{table}_custom_{}", i + 1);
                statements.push(self.expression_index(name, table, expression));
            }
        }

        statements
    }

    fn column_indexes(&self, table: &str, column: &str, column_type: &str) -> Vec<IndexStatement> {
        let base = index_name(table, column);

        if ColumnKind::of(column_type) != ColumnKind::Structured {
            return vec![IndexStatement::Column {
                name: base,
                table: table.to_string(),
                column: column.to_string(),
            }];
        }

        self.catalog
            .common
            .json_templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let expression =
                    safe_substitute(template, &[("field", column), ("data_type", column_type)]);
                self.expression_index(format!("{base}_json_{}", i + 1), table, &expression)
            })
            .collect()
    }

    fn expression_index(&self, name: String, table: &str, expression: &str) -> IndexStatement {
        let sql = format!(
            "CREATE INDEX {} ON {} (({expression}))",
            self.dialect.quote_identifier(&name),
            self.dialect.quote_identifier(table),
        );
        IndexStatement::Expression {
            name,
            table: table.to_string(),
            sql,
        }
    }
}

/// Outcome of the index creation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Create every planned index, treating already existing ones as success.
pub async fn create_indexes<C: SqlClient + ?Sized>(
    client: &C,
    statements: &[IndexStatement],
) -> Result<IndexReport, ClientError> {
    let mut report = IndexReport::default();

    for statement in statements {
        let outcome = match statement {
            IndexStatement::Column {
                name,
                table,
                column,
            } => {
                debug!("Creating index {} on {}({})", name, table, column);
                client.create_index(name, table, column).await?
            }
            IndexStatement::Expression { name, sql, .. } => {
                debug!("Creating index {}: {}", name, sql);
                client.create_index_raw(sql).await?
            }
        };

        match outcome {
            DdlOutcome::Created => report.created.push(statement.name().to_string()),
            DdlOutcome::AlreadyExists => {
                info!("Index {} already exists", statement.name());
                report.existing.push(statement.name().to_string());
            }
        }
    }

    Ok(report)
}
