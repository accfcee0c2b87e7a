//! Distinguished name parsing.
//!
//! RDNs are separated by unescaped `,` (or the legacy `;`). For multi-valued
//! RDNs (`cn=a+uid=b`) only the first attribute/value pair is kept. Escaped
//! specials (`\,` `\+` `\"` `\\` `\<` `\>` `\;` `\=` `\#` `\ `) and hex pairs
//! (`\2C`) are decoded; unescaped whitespace around types and values is
//! trimmed.

use crate::error::DnError;
use sync_core::{DistinguishedName, Rdn};

const ESCAPABLE: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '=', '#', ' '];

/// Parse a DN string. An empty (or blank) string yields a DN without RDNs.
pub fn parse_dn(dn: &str) -> Result<DistinguishedName, DnError> {
    if dn.trim().is_empty() {
        return Ok(DistinguishedName::new(dn, Vec::new()));
    }

    let rdns = split_unescaped(dn, &[',', ';'])
        .into_iter()
        .map(parse_rdn)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DistinguishedName::new(dn, rdns))
}

fn parse_rdn(component: &str) -> Result<Rdn, DnError> {
    let first = split_unescaped(component, &['+'])
        .into_iter()
        .next()
        .unwrap_or(component);

    let (attribute, value) = split_unescaped(first, &['='])
        .split_first()
        .and_then(|(attribute, rest)| {
            // the value starts right after the first unescaped '='
            let offset = attribute.len() + 1;
            (!rest.is_empty()).then(|| (*attribute, &first[offset..]))
        })
        .ok_or_else(|| DnError::MissingEquals(component.trim().to_string()))?;

    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(DnError::EmptyType);
    }

    Ok(Rdn::new(attribute, unescape(trim_unescaped(value))?))
}

/// Split on separator characters that are not preceded by a backslash escape.
fn split_unescaped<'a>(s: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if separators.contains(&c) {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Trim surrounding whitespace, keeping a trailing space that is escaped.
fn trim_unescaped(s: &str) -> &str {
    let s = s.trim_start();
    let trimmed = s.trim_end();
    if trimmed.len() < s.len() {
        let backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if backslashes % 2 == 1 {
            return &s[..trimmed.len() + 1];
        }
    }
    trimmed
}

fn unescape(value: &str) -> Result<String, DnError> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let next = chars.next().ok_or(DnError::DanglingEscape)?;
        if let (Some(high), Some(low)) = (next.to_digit(16), chars.peek().and_then(|c| c.to_digit(16))) {
            chars.next();
            bytes.push((high * 16 + low) as u8);
        } else if ESCAPABLE.contains(&next) {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
        } else {
            return Err(DnError::InvalidEscape(next));
        }
    }

    String::from_utf8(bytes).map_err(|_| DnError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(dn: &str) -> Vec<(String, String)> {
        parse_dn(dn)
            .unwrap()
            .rdns()
            .iter()
            .map(|rdn| (rdn.attribute.clone(), rdn.value.clone()))
            .collect()
    }

    #[test]
    fn test_simple_dn() {
        let dn = parse_dn("inum=1800.5,ou=clients,o=jans").unwrap();
        assert_eq!(dn.as_str(), "inum=1800.5,ou=clients,o=jans");
        assert_eq!(dn.first().unwrap().value, "1800.5");
        assert_eq!(dn.rdns().len(), 3);
    }

    #[test]
    fn test_whitespace_and_semicolons() {
        assert_eq!(
            values(" cn = Jane Doe ; ou = people"),
            vec![
                ("cn".to_string(), "Jane Doe".to_string()),
                ("ou".to_string(), "people".to_string())
            ]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(values(r"cn=Doe\, Jane,o=jans")[0].1, "Doe, Jane");
        assert_eq!(values(r"cn=a\2Cb")[0].1, "a,b");
        assert_eq!(values(r"cn=\#hash\=x")[0].1, "#hash=x");
        assert_eq!(values(r"cn=caf\C3\A9")[0].1, "café");
        assert_eq!(values(r"cn=trailing\ ")[0].1, "trailing ");
    }

    #[test]
    fn test_multivalued_rdn_keeps_first() {
        assert_eq!(
            values("cn=a+uid=b,o=jans")[0],
            ("cn".to_string(), "a".to_string())
        );
    }

    #[test]
    fn test_value_may_contain_equals_after_escape() {
        assert_eq!(values("jansId=a=b")[0].1, "a=b");
    }

    #[test]
    fn test_empty_dn() {
        assert!(parse_dn("").unwrap().rdns().is_empty());
    }

    #[test]
    fn test_invalid_dns() {
        assert_eq!(parse_dn("o=jans,people"), Err(DnError::MissingEquals("people".into())));
        assert_eq!(parse_dn("=x"), Err(DnError::EmptyType));
        assert_eq!(parse_dn(r"cn=x\"), Err(DnError::DanglingEscape));
        assert_eq!(parse_dn(r"cn=\q"), Err(DnError::InvalidEscape('q')));
        assert_eq!(parse_dn(r"cn=\FF"), Err(DnError::InvalidUtf8));
    }
}
