//! File-backed collaborators for the transfer engine.
//!
//! A project snapshot stands in for the capture platform, a directory of CSV
//! files or an append-only SQL script stands in for the relational database,
//! and import files stand in for the platform's import call.

#![deny(unsafe_code)]

pub mod csv_store;
pub mod error;
mod keys;
pub mod script_store;
pub mod sink;
pub mod snapshot;

pub use csv_store::CsvTableStore;
pub use error::{IoError, Result};
pub use script_store::SqlScriptStore;
pub use sink::ImportFileSink;
pub use snapshot::ProjectSnapshot;
