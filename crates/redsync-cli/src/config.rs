//! Project and database profiles read from `redsync.toml`.
//!
//! ```toml
//! [projects.demo]
//! metadata = "demo/metadata.json"
//! records = "demo/records.json"
//! primary_key = "study_id"
//! import_dir = "demo/import"
//!
//! [databases.warehouse]
//! kind = "csv"
//! path = "warehouse"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "redsync.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown project '{name}' (configured: {available})")]
    UnknownProject { name: String, available: String },

    #[error("unknown database '{name}' (configured: {available})")]
    UnknownDatabase { name: String, available: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    projects: BTreeMap<String, ProjectProfile>,
    #[serde(default)]
    databases: BTreeMap<String, DatabaseProfile>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectProfile {
    pub metadata: PathBuf,
    pub records: PathBuf,
    /// Record identifier; the first dictionary field when absent.
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default = "default_import_dir")]
    pub import_dir: PathBuf,
}

fn default_import_dir() -> PathBuf {
    PathBuf::from("import")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseKind {
    /// Directory of `<table>.csv` files.
    Csv,
    /// Append-only MySQL script.
    SqlScript,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseProfile {
    pub kind: DatabaseKind,
    pub path: PathBuf,
    /// Tables a script destination already holds.
    #[serde(default)]
    pub existing_tables: Vec<String>,
}

impl Config {
    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse `text` as if it had been read from `origin`.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.base_dir = origin
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn project_names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn database_names(&self) -> Vec<&str> {
        self.databases.keys().map(String::as_str).collect()
    }

    /// The named project with its paths resolved.
    pub fn project(&self, name: &str) -> Result<ProjectProfile, ConfigError> {
        let profile = self
            .projects
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProject {
                name: name.to_string(),
                available: available(&self.project_names()),
            })?;
        Ok(ProjectProfile {
            metadata: self.resolve(&profile.metadata),
            records: self.resolve(&profile.records),
            primary_key: profile.primary_key.clone(),
            import_dir: self.resolve(&profile.import_dir),
        })
    }

    /// The named database with its path resolved.
    pub fn database(&self, name: &str) -> Result<DatabaseProfile, ConfigError> {
        let profile = self
            .databases
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDatabase {
                name: name.to_string(),
                available: available(&self.database_names()),
            })?;
        Ok(DatabaseProfile {
            kind: profile.kind,
            path: self.resolve(&profile.path),
            existing_tables: profile.existing_tables.clone(),
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn available(names: &[&str]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
