//! Attribute name to SQL type resolution.

use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::schema::DirectorySchema;
use crate::types::{SqlType, TypeCatalog};

/// Syntax of opaque directory strings, used when nothing else is known.
pub const DEFAULT_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.15";

/// Pseudo-syntax assigned to every multivalued attribute.
pub const STRUCTURED_SYNTAX: &str = "JSON";

/// Longest syntax-derived VARCHAR kept as VARCHAR.
const VARCHAR_CEILING: u32 = 127;

/// Longest syntax-derived VARCHAR stored with the dialect's short text type.
const SHORT_TEXT_CEILING: u32 = 255;

/// Resolves attribute names to syntaxes and physical types for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    schema: &'a DirectorySchema,
    types: &'a TypeCatalog,
    dialect: Dialect,
}

impl<'a> TypeResolver<'a> {
    pub fn new(schema: &'a DirectorySchema, types: &'a TypeCatalog, dialect: Dialect) -> Self {
        Self {
            schema,
            types,
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Syntax of an attribute.
    ///
    /// Multivalued attributes always resolve to [`STRUCTURED_SYNTAX`]. Attributes
    /// unknown to the schema fall back to the legacy syntax table, then to
    /// [`DEFAULT_SYNTAX`]. Never fails.
    pub fn resolve_syntax(&self, attribute: &str) -> &'a str {
        if let Some(definition) = self.schema.attribute(attribute) {
            if definition.multivalued {
                return STRUCTURED_SYNTAX;
            }
            return definition
                .syntax
                .as_deref()
                .filter(|syntax| !syntax.is_empty())
                .unwrap_or(DEFAULT_SYNTAX);
        }

        self.types
            .legacy_syntax(attribute)
            .filter(|syntax| !syntax.is_empty())
            .unwrap_or(DEFAULT_SYNTAX)
    }

    /// Physical column type of an attribute, optionally in the context of a table.
    ///
    /// Explicit overrides win and are used verbatim. Otherwise the attribute's
    /// syntax is mapped, and a mapped VARCHAR longer than 127 characters degrades
    /// to the dialect's short (up to 255) or long text type.
    pub fn resolve_type(&self, attribute: &str, table: Option<&str>) -> Result<SqlType, SchemaError> {
        if let Some(spec) = self.types.override_for(attribute, self.dialect, table)? {
            return Ok(SqlType::from(spec));
        }

        let syntax = self.resolve_syntax(attribute);
        let spec = self
            .types
            .syntax_type(syntax, self.dialect)?
            .ok_or_else(|| SchemaError::UnmappedSyntax {
                attribute: attribute.to_string(),
                syntax: syntax.to_string(),
            })?;

        if !spec.name.eq_ignore_ascii_case("VARCHAR") {
            return Ok(SqlType::new(spec.name.clone()));
        }

        let profile = self.dialect.profile();
        Ok(match spec.size {
            Some(size) if size <= VARCHAR_CEILING => SqlType::sized(spec.name.clone(), size),
            Some(size) if size <= SHORT_TEXT_CEILING => SqlType::new(profile.short_text_type),
            _ => SqlType::new(profile.long_text_type),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const INTEGER_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.27";
    const BOOLEAN_SYNTAX: &str = "1.3.6.1.4.1.1466.115.121.1.7";

    fn fixtures() -> (DirectorySchema, TypeCatalog) {
        let schema = DirectorySchema::from_value(json!({
            "attributeTypes": [
                {"names": ["jansId", "inum"], "syntax": DEFAULT_SYNTAX},
                {"names": ["jansRedirectURI"], "syntax": BOOLEAN_SYNTAX, "multivalued": true},
                {"names": ["jansEnabled"], "syntax": BOOLEAN_SYNTAX},
                {"names": ["jansCount"], "syntax": INTEGER_SYNTAX},
                {"names": ["description"], "syntax": "wide"},
                {"names": ["jansNote"], "syntax": "wider"},
                {"names": ["jansNoSyntax"]},
                {"names": ["jansEmptySyntax"], "syntax": ""},
                {"names": ["jansOrphan"], "syntax": "9.9.9"}
            ]
        }))
        .unwrap();
        let types = TypeCatalog::from_values(
            json!({
                "doc_id": {"mysql": {"type": "VARCHAR", "size": 64}},
                "jansAttrs": {"mysql": {"type": "VARCHAR", "size": 1000,
                              "tables": {"jansClnt": {"type": "JSON"}}}}
            }),
            json!({
                DEFAULT_SYNTAX: {"mysql": {"type": "VARCHAR", "size": 64},
                                 "pgsql": {"type": "VARCHAR", "size": 64}},
                STRUCTURED_SYNTAX: {"mysql": {"type": "JSON"}, "pgsql": {"type": "JSONB"}},
                BOOLEAN_SYNTAX: {"mysql": {"type": "SMALLINT"}, "pgsql": {"type": "BOOLEAN"}},
                INTEGER_SYNTAX: {"mysql": {"type": "INT"}},
                "wide": {"mysql": {"type": "VARCHAR", "size": 255}},
                "wider": {"mysql": {"type": "VARCHAR", "size": 2048}}
            }),
            json!({"jansLegacy": INTEGER_SYNTAX, "jansBlankLegacy": ""}),
        )
        .unwrap();
        (schema, types)
    }

    #[test]
    fn test_unknown_attribute_gets_default_syntax() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        for name in ["", "nope", "JANSID", "objectClass"] {
            assert_eq!(resolver.resolve_syntax(name), DEFAULT_SYNTAX);
        }
    }

    #[test]
    fn test_alias_and_legacy_syntax() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        assert_eq!(resolver.resolve_syntax("inum"), DEFAULT_SYNTAX);
        assert_eq!(resolver.resolve_syntax("jansLegacy"), INTEGER_SYNTAX);
        assert_eq!(resolver.resolve_syntax("jansNoSyntax"), DEFAULT_SYNTAX);
    }

    #[test]
    fn test_empty_syntax_falls_back_to_default() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        assert_eq!(resolver.resolve_syntax("jansEmptySyntax"), DEFAULT_SYNTAX);
        assert_eq!(resolver.resolve_syntax("jansBlankLegacy"), DEFAULT_SYNTAX);
        assert_eq!(
            resolver.resolve_type("jansEmptySyntax", None).unwrap().to_string(),
            "VARCHAR(64)"
        );
    }

    #[test]
    fn test_multivalued_is_always_structured() {
        let (schema, types) = fixtures();
        for dialect in [Dialect::MySql, Dialect::PostgreSql] {
            let resolver = TypeResolver::new(&schema, &types, dialect);
            assert_eq!(resolver.resolve_syntax("jansRedirectURI"), STRUCTURED_SYNTAX);
            assert!(resolver
                .resolve_type("jansRedirectURI", None)
                .unwrap()
                .is_structured());
        }
    }

    #[test]
    fn test_varchar_ceiling() {
        let (schema, types) = fixtures();
        let mysql = TypeResolver::new(&schema, &types, Dialect::MySql);
        assert_eq!(mysql.resolve_type("jansId", None).unwrap().to_string(), "VARCHAR(64)");
        assert_eq!(mysql.resolve_type("description", None).unwrap().to_string(), "TINYTEXT");
        assert_eq!(mysql.resolve_type("jansNote", None).unwrap().to_string(), "TEXT");

        let pgsql = TypeResolver::new(&schema, &types, Dialect::PostgreSql);
        assert_eq!(pgsql.resolve_type("description", None).unwrap().to_string(), "TEXT");
    }

    #[test]
    fn test_overrides_win_and_skip_ceiling() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        assert_eq!(resolver.resolve_type("doc_id", None).unwrap().to_string(), "VARCHAR(64)");
        assert_eq!(
            resolver.resolve_type("jansAttrs", None).unwrap().to_string(),
            "VARCHAR(1000)"
        );
        assert_eq!(
            resolver.resolve_type("jansAttrs", Some("jansClnt")).unwrap().to_string(),
            "JSON"
        );
    }

    #[test]
    fn test_dialect_fallback_for_syntax() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::PostgreSql);
        assert_eq!(resolver.resolve_type("jansCount", None).unwrap().to_string(), "INT");
        assert_eq!(resolver.resolve_type("jansEnabled", None).unwrap().to_string(), "BOOLEAN");
    }

    #[test]
    fn test_unmapped_syntax_is_reported() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        let err = resolver.resolve_type("jansOrphan", None).unwrap_err();
        assert!(matches!(err, SchemaError::UnmappedSyntax { ref syntax, .. } if syntax == "9.9.9"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let (schema, types) = fixtures();
        let resolver = TypeResolver::new(&schema, &types, Dialect::MySql);
        let first = resolver.resolve_type("description", Some("t")).unwrap();
        let second = resolver.resolve_type("description", Some("t")).unwrap();
        assert_eq!(first, second);
    }
}
