//! Relational store that records statements as a MySQL script.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use redsync_core::{RelationalStore, ResultSet, Statement, StoreError};
use tracing::debug;

use crate::error::{IoError, Result};
use crate::keys::KeyLedger;

/// Appends every executed statement, rendered with inline literals and
/// terminated by `;`, to a script file. Each commit appends `COMMIT;`.
///
/// The script cannot be queried, so the set of existing tables is whatever
/// the caller declares plus the tables created through this store.
#[derive(Debug)]
pub struct SqlScriptStore {
    path: PathBuf,
    out: BufWriter<File>,
    tables: BTreeSet<String>,
    keys: KeyLedger,
    statements: usize,
}

impl SqlScriptStore {
    pub fn open<I, S>(path: impl Into<PathBuf>, existing_tables: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.into();
        if let Some(parent) = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|source| IoError::write(parent, source))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| IoError::write(&path, source))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            tables: existing_tables.into_iter().map(Into::into).collect(),
            keys: KeyLedger::default(),
            statements: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statements written so far, commits excluded.
    pub fn statements(&self) -> usize {
        self.statements
    }

    fn write_line(&mut self, line: &str) -> std::result::Result<(), StoreError> {
        writeln!(self.out, "{line};").map_err(|source| IoError::write(&self.path, source))?;
        Ok(())
    }
}

impl RelationalStore for SqlScriptStore {
    fn table_names(&mut self) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.tables.iter().cloned().collect())
    }

    fn execute(&mut self, statement: &Statement) -> std::result::Result<(), StoreError> {
        match statement {
            Statement::DropTable { table } => {
                if !self.tables.remove(table) {
                    return Err(StoreError::UnknownTable(table.clone()));
                }
                self.keys.forget(table);
            }
            Statement::CreateTable(schema) => {
                self.tables.insert(schema.name.clone());
                self.keys.track(&schema.name, &schema.primary_key);
            }
            Statement::Insert {
                table,
                columns,
                values,
            } => {
                if !self.tables.contains(table) {
                    return Err(StoreError::UnknownTable(table.clone()));
                }
                self.keys.claim(table, columns, values)?;
            }
        }
        self.write_line(&statement.render())?;
        self.statements += 1;
        Ok(())
    }

    fn commit(&mut self) -> std::result::Result<(), StoreError> {
        self.write_line("COMMIT")?;
        self.out
            .flush()
            .map_err(|source| IoError::write(&self.path, source))?;
        Ok(())
    }

    fn scan(&mut self, table: &str) -> std::result::Result<ResultSet, StoreError> {
        debug!(table = %table, path = %self.path.display(), "scan requested on script store");
        Err(StoreError::Unsupported(format!(
            "cannot read table '{table}' back from a SQL script"
        )))
    }
}
