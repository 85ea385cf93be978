//! Capture-platform project read from exported JSON files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use redsync_core::{BoxError, ProjectSource};
use redsync_model::{FieldMeta, Record};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{IoError, Result};

/// Data dictionary plus records of one project.
///
/// The metadata file is the platform's dictionary export: an array of
/// objects with `field_name`, `form_name`, `field_type` and
/// `select_choices_or_calculations`. The records file is the flat record
/// export: an array of objects keyed by variable name.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    fields: Vec<FieldMeta>,
    records: Vec<Record>,
    primary_key: String,
}

impl ProjectSnapshot {
    /// Build a snapshot; the primary key defaults to the first field.
    pub fn new(
        fields: Vec<FieldMeta>,
        records: Vec<Record>,
        primary_key: Option<&str>,
    ) -> Result<Self> {
        let first = fields.first().ok_or(IoError::EmptyMetadata)?;
        let primary_key = match primary_key {
            None => first.field_name().to_string(),
            Some(name) if fields.iter().any(|field| field.field_name() == name) => {
                name.to_string()
            }
            Some(name) => {
                return Err(IoError::UnknownPrimaryKey {
                    name: name.to_string(),
                });
            }
        };
        Ok(Self {
            fields,
            records,
            primary_key,
        })
    }

    pub fn load(metadata: &Path, records: &Path, primary_key: Option<&str>) -> Result<Self> {
        let fields: Vec<FieldMeta> = read_json(metadata)?;
        let records: Vec<Record> = read_json(records)?;
        let snapshot = Self::new(fields, records, primary_key)?;
        info!(
            fields = snapshot.fields.len(),
            records = snapshot.records.len(),
            primary_key = %snapshot.primary_key,
            "project snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    /// Distinct form names in dictionary order.
    pub fn form_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.fields
            .iter()
            .map(FieldMeta::form_name)
            .filter(|form| seen.insert(*form))
            .map(str::to_string)
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| IoError::read(path, source))?;
    serde_json::from_str(&text).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl ProjectSource for ProjectSnapshot {
    fn metadata(&self) -> std::result::Result<Vec<FieldMeta>, BoxError> {
        Ok(self.fields.clone())
    }

    fn primary_key(&self) -> std::result::Result<String, BoxError> {
        Ok(self.primary_key.clone())
    }

    fn forms(&self) -> std::result::Result<Vec<String>, BoxError> {
        Ok(self.form_names())
    }

    fn export_records(&self) -> std::result::Result<Vec<Record>, BoxError> {
        Ok(self.records.clone())
    }
}
