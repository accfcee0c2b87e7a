//! LDIF data source for ldap-sql-sync
//!
//! This crate reads directory bulk-load data: it renders LDIF templates with a
//! substitution context, parses the rendered files into
//! [`sync_core::DirectoryEntry`] values and parses distinguished names.

pub mod dn;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod render;

pub use dn::parse_dn;
pub use error::{DnError, LdifError};
pub use mapping::DataMapping;
pub use parser::{parse_str, LdifReader};
pub use render::{render_file, render_files, render_str, TemplateContext};
