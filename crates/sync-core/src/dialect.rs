//! Supported SQL dialects.
//!
//! Every dialect-dependent decision in the engine goes through [`Dialect::profile`],
//! a single static table per variant, instead of comparing dialect names ad hoc.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target SQL dialect family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// MySQL and compatible servers (MariaDB, Aurora MySQL)
    #[default]
    #[serde(rename = "mysql")]
    MySql,
    /// PostgreSQL and compatible servers
    #[serde(rename = "pgsql")]
    PostgreSql,
}

/// Fixed per-dialect properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    /// Key used for this dialect inside type mapping catalogs
    pub catalog_key: &'static str,
    /// Character wrapped around quoted identifiers
    pub quote: char,
    /// Text type used for syntax-derived VARCHARs of 128..=255 characters
    pub short_text_type: &'static str,
    /// Text type used for syntax-derived VARCHARs above 255 characters
    pub long_text_type: &'static str,
    /// File name of the index catalog for this dialect
    pub index_catalog_file: &'static str,
}

const MYSQL: DialectProfile = DialectProfile {
    catalog_key: "mysql",
    quote: '`',
    short_text_type: "TINYTEXT",
    long_text_type: "TEXT",
    index_catalog_file: "mysql_index.json",
};

const POSTGRESQL: DialectProfile = DialectProfile {
    catalog_key: "pgsql",
    quote: '"',
    short_text_type: "TEXT",
    long_text_type: "TEXT",
    index_catalog_file: "postgresql_index.json",
};

impl Dialect {
    /// Dialect whose catalog entries are used when the requested one is absent.
    pub const FALLBACK: Dialect = Dialect::MySql;

    /// Static properties of this dialect.
    pub fn profile(self) -> &'static DialectProfile {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::PostgreSql => &POSTGRESQL,
        }
    }

    /// Key used inside type mapping catalogs (`mysql` / `pgsql`).
    pub fn catalog_key(self) -> &'static str {
        self.profile().catalog_key
    }

    /// Quote an identifier (table, column or index name).
    ///
    /// ```
    /// use sync_core::Dialect;
    ///
    /// assert_eq!(Dialect::MySql.quote_identifier("jansClnt"), "`jansClnt`");
    /// assert_eq!(Dialect::PostgreSql.quote_identifier("jans\"Clnt"), "\"jans\"\"Clnt\"");
    /// ```
    pub fn quote_identifier(self, name: &str) -> String {
        let quote = self.profile().quote;
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_key())
    }
}

/// Error returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported SQL dialect '{0}' (expected 'mysql' or 'pgsql')")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "pgsql" | "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect_aliases() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("PGSQL".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!(" postgres ".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert!("sqlite".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_quote_identifier_escapes_quote_char() {
        assert_eq!(Dialect::MySql.quote_identifier("a`b"), "`a``b`");
        assert_eq!(Dialect::PostgreSql.quote_identifier("doc_id"), "\"doc_id\"");
    }

    #[test]
    fn test_text_degradation_types() {
        assert_eq!(Dialect::MySql.profile().short_text_type, "TINYTEXT");
        assert_eq!(Dialect::PostgreSql.profile().short_text_type, "TEXT");
        assert_eq!(Dialect::MySql.profile().long_text_type, "TEXT");
    }

    #[test]
    fn test_display_matches_catalog_key() {
        assert_eq!(Dialect::PostgreSql.to_string(), "pgsql");
        assert_eq!(Dialect::FALLBACK, Dialect::MySql);
    }
}
