//! LDIF content record parser.
//!
//! Supports what directory bulk-load files use:
//!
//! - an optional `version:` line before the first record
//! - `#` comment lines
//! - folded lines (a physical line starting with one space continues the previous one)
//! - `attr: value` and `attr:: base64`
//! - records separated by blank lines, each starting with `dn:`
//!
//! `attr:< url` values are rejected.

use crate::dn::parse_dn;
use crate::error::LdifError;
use base64::Engine;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use sync_core::DirectoryEntry;

enum LogicalLine {
    Blank,
    Text { number: usize, text: String },
}

/// Streaming reader yielding one [`DirectoryEntry`] per record.
pub struct LdifReader<R> {
    lines: Lines<R>,
    line_number: usize,
    lookahead: Option<(usize, String)>,
    started: bool,
    done: bool,
}

impl LdifReader<BufReader<File>> {
    /// Open an LDIF file for streaming.
    pub fn open(path: &Path) -> Result<Self, LdifError> {
        let file = File::open(path).map_err(|e| LdifError::io(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LdifReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            lookahead: None,
            started: false,
            done: false,
        }
    }

    fn next_physical(&mut self) -> Result<Option<(usize, String)>, LdifError> {
        if let Some(line) = self.lookahead.take() {
            return Ok(Some(line));
        }
        match self.lines.next() {
            None => Ok(None),
            Some(Err(source)) => Err(LdifError::Read {
                line: self.line_number + 1,
                source,
            }),
            Some(Ok(line)) => {
                self.line_number += 1;
                let line = line.strip_suffix('\r').map(str::to_string).unwrap_or(line);
                Ok(Some((self.line_number, line)))
            }
        }
    }

    fn next_logical(&mut self) -> Result<Option<LogicalLine>, LdifError> {
        let Some((number, mut text)) = self.next_physical()? else {
            return Ok(None);
        };
        if text.is_empty() {
            return Ok(Some(LogicalLine::Blank));
        }
        if text.starts_with(' ') {
            return Err(LdifError::Syntax {
                line: number,
                message: "continuation line without a preceding line".to_string(),
            });
        }

        while let Some((next_number, next)) = self.next_physical()? {
            match next.strip_prefix(' ') {
                Some(continuation) => text.push_str(continuation),
                None => {
                    self.lookahead = Some((next_number, next));
                    break;
                }
            }
        }

        Ok(Some(LogicalLine::Text { number, text }))
    }

    fn read_record(&mut self) -> Result<Option<DirectoryEntry>, LdifError> {
        let mut entry: Option<DirectoryEntry> = None;

        while let Some(line) = self.next_logical()? {
            let (number, text) = match line {
                LogicalLine::Blank if entry.is_some() => break,
                LogicalLine::Blank => continue,
                LogicalLine::Text { number, text } => (number, text),
            };
            if text.starts_with('#') {
                continue;
            }

            let (attribute, value) = parse_line(number, &text)?;

            if let Some(entry) = entry.as_mut() {
                entry.push_value(attribute, value);
                continue;
            }
            if !self.started && attribute.eq_ignore_ascii_case("version") {
                self.started = true;
                continue;
            }
            if !attribute.eq_ignore_ascii_case("dn") {
                return Err(LdifError::MissingDn { line: number });
            }

            self.started = true;
            let dn = parse_dn(&value).map_err(|source| LdifError::Dn {
                line: number,
                dn: value.clone(),
                source,
            })?;
            entry = Some(DirectoryEntry::new(dn));
        }

        Ok(entry)
    }
}

impl<R: BufRead> Iterator for LdifReader<R> {
    type Item = Result<DirectoryEntry, LdifError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Split a logical line into attribute name and decoded value.
fn parse_line(number: usize, text: &str) -> Result<(String, String), LdifError> {
    let (attribute, rest) = text.split_once(':').ok_or_else(|| LdifError::Syntax {
        line: number,
        message: format!("expected 'attribute: value', got '{text}'"),
    })?;

    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(LdifError::Syntax {
            line: number,
            message: "empty attribute name".to_string(),
        });
    }

    if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|source| LdifError::Base64 {
                line: number,
                attribute: attribute.to_string(),
                source,
            })?;
        let value = String::from_utf8(bytes).map_err(|_| LdifError::Utf8 {
            line: number,
            attribute: attribute.to_string(),
        })?;
        return Ok((attribute.to_string(), value));
    }

    if rest.starts_with('<') {
        return Err(LdifError::UrlValue {
            line: number,
            attribute: attribute.to_string(),
        });
    }

    Ok((attribute.to_string(), rest.trim_start_matches(' ').to_string()))
}

/// Parse every record of an in-memory LDIF document.
pub fn parse_str(content: &str) -> Result<Vec<DirectoryEntry>, LdifError> {
    LdifReader::new(content.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "version: 1
# clients
dn: inum=1800.5,ou=clients,o=jans
objectClass: top
objectClass: jansClnt
displayName: Jans Config
 Api Client
jansRedirectURI: https://a
jansRedirectURI: https://b


dn: ou=people,o=jans\r
objectclass: top\r
objectclass: organizationalUnit\r
description:: 4pyTIGRvbmU=
";

    #[test]
    fn test_parse_sample() {
        let entries = parse_str(SAMPLE).unwrap();
        assert_eq!(entries.len(), 2);

        let client = &entries[0];
        assert_eq!(client.dn.first().unwrap().value, "1800.5");
        assert_eq!(client.get("objectClass").unwrap(), ["top", "jansClnt"]);
        assert_eq!(client.get("displayName").unwrap(), ["Jans ConfigApi Client"]);
        assert_eq!(client.get("jansRedirectURI").unwrap(), ["https://a", "https://b"]);

        let ou = &entries[1];
        assert_eq!(ou.dn.as_str(), "ou=people,o=jans");
        assert_eq!(ou.get("objectclass").unwrap(), ["top", "organizationalUnit"]);
        assert_eq!(ou.get("description").unwrap(), ["✓ done"]);
    }

    #[test]
    fn test_record_must_start_with_dn() {
        let err = parse_str("objectClass: top\n").unwrap_err();
        assert!(matches!(err, LdifError::MissingDn { line: 1 }));

        // version is only accepted before the first record
        let err = parse_str("dn: o=jans\nobjectClass: top\n\nversion: 1\n").unwrap_err();
        assert!(matches!(err, LdifError::MissingDn { line: 4 }));
    }

    #[test]
    fn test_rejected_lines() {
        assert!(matches!(
            parse_str("dn: o=jans\njpegPhoto:< file:///tmp/x\n"),
            Err(LdifError::UrlValue { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("dn: o=jans\nnot a pair\n"),
            Err(LdifError::Syntax { line: 2, .. })
        ));
        assert!(matches!(
            parse_str(" leading\n"),
            Err(LdifError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("dn: o=jans\ncn:: !!!\n"),
            Err(LdifError::Base64 { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("dn: cn=\\q\n"),
            Err(LdifError::Dn { line: 1, .. })
        ));
    }

    #[test]
    fn test_base64_dn_and_empty_value() {
        let entries = parse_str("dn:: aW51bT0xLG89amFucw==\njansDescription:\n").unwrap();
        assert_eq!(entries[0].dn.as_str(), "inum=1,o=jans");
        assert_eq!(entries[0].get("jansDescription").unwrap(), [""]);
    }

    #[test]
    fn test_comment_continuations_are_ignored() {
        let entries = parse_str("# long\n comment\ndn: o=jans\nobjectClass: top\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attributes().len(), 1);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut reader = LdifReader::new("cn: x\n\ndn: o=jans\n".as_bytes());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
