//! Data file groups.
//!
//! A data mapping is a JSON object from group name to a list of
//! template-relative LDIF file names. Group order and file order are kept as
//! written, since later files may reference entries created by earlier ones.

use crate::error::LdifError;
use serde_json::{Map, Value};
use std::path::Path;

/// Ordered data file groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataMapping {
    groups: Vec<(String, Vec<String>)>,
}

impl DataMapping {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self { groups }
    }

    pub fn from_file(path: &Path) -> Result<Self, LdifError> {
        let content = std::fs::read_to_string(path).map_err(|e| LdifError::io(path, e))?;
        let value: Value = serde_json::from_str(&content).map_err(|source| LdifError::Mapping {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value).map_err(|source| LdifError::Mapping {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_value(value)?;
        let groups = object
            .into_iter()
            .map(|(group, files)| Ok((group, serde_json::from_value(files)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    /// Files of the selected groups in mapping order; all groups when
    /// `selected` is empty.
    pub fn files<S: AsRef<str>>(&self, selected: &[S]) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(group, _)| {
                selected.is_empty() || selected.iter().any(|s| s.as_ref() == group.as_str())
            })
            .flat_map(|(_, files)| files.iter().map(String::as_str))
            .collect()
    }

    /// Selected group names that the mapping does not define.
    pub fn unknown_groups<'s, S: AsRef<str>>(&self, selected: &'s [S]) -> Vec<&'s str> {
        selected
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !self.groups.iter().any(|(group, _)| group == *s))
            .collect()
    }
}
