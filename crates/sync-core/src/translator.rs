//! Loaded catalogs bundled for one target dialect.

use crate::client::TableColumnTypes;
use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::indexes::{IndexCatalog, IndexHints, IndexPlanner, IndexStatement};
use crate::resolver::{TypeResolver, DEFAULT_SYNTAX};
use crate::schema::DirectorySchema;
use crate::tables::{synthesize_tables, TableDefinition};
use crate::transform::EntryTransformer;
use crate::types::TypeCatalog;

/// Owns every catalog the engine needs and hands out borrowing components.
#[derive(Debug, Clone)]
pub struct Translator {
    dialect: Dialect,
    schema: DirectorySchema,
    types: TypeCatalog,
    index_catalog: IndexCatalog,
    index_hints: IndexHints,
}

impl Translator {
    /// Bundle the catalogs, checking that the default syntax is mapped.
    pub fn new(
        dialect: Dialect,
        schema: DirectorySchema,
        types: TypeCatalog,
        index_catalog: IndexCatalog,
        index_hints: IndexHints,
    ) -> Result<Self, SchemaError> {
        if !types.has_syntax(DEFAULT_SYNTAX) {
            return Err(SchemaError::MissingDefaultSyntax(DEFAULT_SYNTAX.to_string()));
        }

        Ok(Self {
            dialect,
            schema,
            types,
            index_catalog,
            index_hints,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn schema(&self) -> &DirectorySchema {
        &self.schema
    }

    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.schema, &self.types, self.dialect)
    }

    pub fn synthesize_tables(&self) -> Result<Vec<TableDefinition>, SchemaError> {
        synthesize_tables(&self.schema, &self.resolver())
    }

    pub fn index_planner(&self) -> IndexPlanner<'_> {
        IndexPlanner::new(self.dialect, &self.index_catalog, &self.index_hints)
    }

    /// Index statements for the given live column types.
    pub fn plan_indexes(&self, live: &TableColumnTypes) -> Vec<IndexStatement> {
        self.index_planner().plan(live)
    }

    pub fn transformer(&self) -> EntryTransformer<'_> {
        EntryTransformer::new(self.resolver())
    }
}
