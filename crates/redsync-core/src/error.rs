//! Error taxonomy for a transfer invocation.
//!
//! Everything in [`TransferError`] is fatal for the invocation. Row-local
//! problems are reported through [`ColumnCountError`] and never escape the
//! engine.

use redsync_model::ModelError;
use thiserror::Error;

/// Error type for collaborator failures that the core does not interpret.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("schema error: {message}")]
    Schema { message: String },

    #[error(
        "column count mismatch: form has {expected} variables but table has {observed} columns"
    )]
    CountMismatch { expected: usize, observed: usize },

    #[error("proposed column renames were rejected ({count} mismatched)")]
    RenameRejected { count: usize },

    #[error("transfer aborted by operator")]
    Aborted,

    #[error("integrity violation on table '{table}': {message}\n  statement: {statement}")]
    IntegrityViolation {
        table: String,
        statement: String,
        message: String,
    },

    #[error("invalid metadata: {0}")]
    Model(#[from] ModelError),

    #[error("relational store error: {0}")]
    Store(#[from] StoreError),

    #[error("project source error: {0}")]
    Source(#[source] BoxError),

    #[error("project sink error: {0}")]
    Sink(#[source] BoxError),
}

impl TransferError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

/// Errors surfaced by a [`RelationalStore`](crate::ports::RelationalStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The destination refused a row, e.g. a duplicate primary key.
    #[error("integrity constraint violated: {0}")]
    Integrity(String),

    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(BoxError),
}

/// A single row whose value count disagrees with the column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("column length: {expected}, value length: {actual}")]
pub struct ColumnCountError {
    pub expected: usize,
    pub actual: usize,
}

pub type Result<T> = std::result::Result<T, TransferError>;
