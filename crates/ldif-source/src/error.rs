//! Error types for LDIF parsing and data file handling.

use std::path::PathBuf;

/// Error in a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnError {
    /// RDN component without a `type=value` separator
    #[error("RDN '{0}' has no '='")]
    MissingEquals(String),

    /// RDN component with an empty attribute type
    #[error("RDN has an empty attribute type")]
    EmptyType,

    /// Backslash at the end of a component
    #[error("Dangling escape at end of value")]
    DanglingEscape,

    /// Backslash followed by a character that cannot be escaped
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    /// Hex escapes that do not form valid UTF-8
    #[error("Escaped bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Error type for LDIF and data file operations.
#[derive(Debug, thiserror::Error)]
pub enum LdifError {
    /// Error reading or writing a file
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading a line from a stream
    #[error("Read error at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// Malformed line
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Record whose first line is not `dn:`
    #[error("Line {line}: record does not start with a dn")]
    MissingDn { line: usize },

    /// Invalid `attr:: base64` value
    #[error("Line {line}: invalid base64 value for '{attribute}': {source}")]
    Base64 {
        line: usize,
        attribute: String,
        #[source]
        source: base64::DecodeError,
    },

    /// Decoded base64 value that is not UTF-8 text
    #[error("Line {line}: value of '{attribute}' is not valid UTF-8")]
    Utf8 { line: usize, attribute: String },

    /// `attr:< url` values are not supported
    #[error("Line {line}: URL value of '{attribute}' is not supported")]
    UrlValue { line: usize, attribute: String },

    /// Invalid distinguished name
    #[error("Line {line}: invalid DN '{dn}': {source}")]
    Dn {
        line: usize,
        dn: String,
        #[source]
        source: DnError,
    },

    /// Invalid data mapping document
    #[error("Failed to parse data mapping {path}: {source}")]
    Mapping {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LdifError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LdifError::Io {
            path: path.into(),
            source,
        }
    }
}
