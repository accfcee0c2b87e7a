//! Directory entry to relational row conversion.

use crate::entry::DirectoryEntry;
use crate::error::TransformError;
use crate::resolver::TypeResolver;
use crate::tables::{DN_COLUMN, OBJECT_CLASS_COLUMN, PRIMARY_KEY_COLUMN};
use crate::types::ColumnKind;
use crate::values::{Row, SqlValue};
use serde_json::json;
use tracing::debug;

/// Object class every entry carries; never a table.
const BASE_OBJECT_CLASS: &str = "top";

/// Object classes of pure containers, compared case-insensitively.
const CONTAINER_CLASSES: [&str; 2] = ["organizationalunit", "organization"];

/// Tokens read as true by boolean and flag columns, compared case-insensitively.
const TRUE_TOKENS: [&str; 5] = ["1", "on", "true", "yes", "ok"];

/// Converts directory entries into rows typed for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct EntryTransformer<'a> {
    resolver: TypeResolver<'a>,
}

impl<'a> EntryTransformer<'a> {
    pub fn new(resolver: TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Convert one entry.
    ///
    /// Returns `Ok(None)` for container entries (organizational units and
    /// organizations), which are not stored as rows.
    pub fn transform_entry(&self, entry: &DirectoryEntry) -> Result<Option<Row>, TransformError> {
        let rdn = entry.dn.first().ok_or(TransformError::EmptyDn)?;

        let classes: Vec<&str> = entry
            .get_ignore_case(OBJECT_CLASS_COLUMN)
            .map(|(_, values)| values)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(|class| !class.eq_ignore_ascii_case(BASE_OBJECT_CLASS))
            .collect();

        if let [only] = classes.as_slice() {
            if CONTAINER_CLASSES.contains(&only.to_ascii_lowercase().as_str()) {
                debug!("Skipping container entry {}", entry.dn.as_str());
                return Ok(None);
            }
        }

        let table = *classes
            .last()
            .ok_or_else(|| TransformError::MissingObjectClass {
                dn: entry.dn.as_str().to_string(),
            })?;

        let mut row = Row::new(table);
        row.insert(PRIMARY_KEY_COLUMN, SqlValue::Text(rdn.value.clone()));
        row.insert(OBJECT_CLASS_COLUMN, SqlValue::Text(table.to_string()));
        row.insert(DN_COLUMN, SqlValue::Text(entry.dn.as_str().to_string()));

        for (attribute, values) in entry.attributes() {
            if attribute.eq_ignore_ascii_case(OBJECT_CLASS_COLUMN) {
                continue;
            }
            let value = self.transform_value(Some(table), attribute, values)?;
            row.insert(attribute.as_str(), value);
        }

        Ok(Some(row))
    }

    /// Coerce an attribute's values into the representation its column needs.
    ///
    /// Structured columns keep every value as `{"v": [...]}`; all other
    /// columns use the first value only.
    pub fn transform_value(
        &self,
        table: Option<&str>,
        attribute: &str,
        values: &[String],
    ) -> Result<SqlValue, TransformError> {
        let first = values.first().ok_or_else(|| TransformError::EmptyValue {
            attribute: attribute.to_string(),
        })?;
        let sql_type = self.resolver.resolve_type(attribute, table)?;

        let value = match sql_type.kind() {
            ColumnKind::Boolean => SqlValue::Bool(is_true(first)),
            ColumnKind::SmallInt => SqlValue::SmallInt(i16::from(is_true(first))),
            ColumnKind::Integer => SqlValue::Int(parse_int(attribute, first)?),
            ColumnKind::BigInteger => SqlValue::BigInt(parse_int(attribute, first)?),
            ColumnKind::Timestamp => SqlValue::Timestamp(format_timestamp(first)),
            ColumnKind::Structured => SqlValue::Json(json!({ "v": values })),
            ColumnKind::Text => SqlValue::Text(first.clone()),
        };
        Ok(value)
    }
}

fn is_true(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    TRUE_TOKENS.contains(&value.as_str())
}

fn parse_int<T>(attribute: &str, value: &str) -> Result<T, TransformError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| TransformError::ValueCoercion {
            attribute: attribute.to_string(),
            value: value.to_string(),
            source,
        })
}

/// Reformat a generalized time (`YYYYMMDDHHMMSS[.fff][Z]`) as
/// `YYYY-MM-DD HH:MM:SS[.fff]` by fixed offsets.
///
/// The input is not validated: short or non-numeric input yields a short or
/// odd string, never a panic.
pub fn format_timestamp(value: &str) -> String {
    let chars: Vec<char> = value.trim_matches('Z').chars().collect();
    let part = |start: usize, end: usize| -> String {
        chars
            .get(start.min(chars.len())..end.min(chars.len()))
            .map(|slice| slice.iter().collect())
            .unwrap_or_default()
    };

    let mut out = format!(
        "{}-{}-{} {}:{}:{}",
        part(0, 4),
        part(4, 6),
        part(6, 8),
        part(8, 10),
        part(10, 12),
        part(12, 14)
    );

    let fraction = part(14, 18);
    match fraction.strip_prefix(&['.', ','][..]) {
        Some(digits) if !digits.is_empty() => {
            out.push('.');
            out.push_str(digits);
        }
        Some(_) => {}
        None if !fraction.is_empty() => {
            out.push('.');
            out.push_str(&part(14, 17));
        }
        None => {}
    }
    out
}
