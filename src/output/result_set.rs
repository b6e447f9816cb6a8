//! Validated records and their JSON persistence

use crate::schema::{Record, SchemaValidationError};
use crate::ExtractError;
use std::fs;
use std::path::{Path, PathBuf};

/// A candidate that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Position of the candidate in the raw sequence
    pub index: usize,
    pub error: SchemaValidationError,
}

/// Validated records of one run, in original relative order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<Record>,
    rejections: Vec<Rejection>,
}

impl ResultSet {
    pub fn new(records: Vec<Record>, rejections: Vec<Rejection>) -> Self {
        Self {
            records,
            rejections,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Serializes the records as a pretty-printed JSON array
    pub fn to_json(&self) -> Result<String, ExtractError> {
        let mut json = serde_json::to_string_pretty(&self.records)?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the records to `path`, replacing any existing file
    ///
    /// The JSON goes to a sibling temporary file first and is renamed into
    /// place, so readers never observe a half-written file.
    pub fn write_json(&self, path: &Path) -> Result<(), ExtractError> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = temporary_path(path);
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Reads records previously written with [`write_json`](Self::write_json)
    pub fn load(path: &Path) -> Result<Vec<Record>, ExtractError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".tmp");
    path.with_file_name(name)
}
