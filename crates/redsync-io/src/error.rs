use std::path::PathBuf;

use redsync_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("project metadata has no fields")]
    EmptyMetadata,

    #[error("primary key '{name}' is not a field of the project")]
    UnknownPrimaryKey { name: String },
}

impl IoError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

impl From<IoError> for StoreError {
    fn from(error: IoError) -> Self {
        StoreError::Other(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
