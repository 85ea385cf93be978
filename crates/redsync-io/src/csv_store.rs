//! Relational store backed by a directory of CSV files, one per table.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer, WriterBuilder};
use redsync_core::{RelationalStore, ResultSet, Statement, StoreError};
use redsync_model::SqlValue;
use tracing::debug;

use crate::error::{IoError, Result};
use crate::keys::KeyLedger;

/// Each `<table>.csv` under `root` is a table: a header row of column names
/// followed by one line per row. Empty cells read back as NULL.
#[derive(Debug)]
pub struct CsvTableStore {
    root: PathBuf,
    writers: BTreeMap<String, Writer<File>>,
    keys: KeyLedger,
}

impl CsvTableStore {
    /// Open (creating if needed) the table directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| IoError::write(&root, source))?;
        Ok(Self {
            root,
            writers: BTreeMap::new(),
            keys: KeyLedger::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        table_file(&self.root, table)
    }

    fn writer(&mut self, table: &str) -> std::result::Result<&mut Writer<File>, StoreError> {
        let path = table_file(&self.root, table);
        match self.writers.entry(table.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                if !path.is_file() {
                    return Err(StoreError::UnknownTable(table.to_string()));
                }
                let file = OpenOptions::new()
                    .append(true)
                    .open(&path)
                    .map_err(|source| IoError::write(&path, source))?;
                Ok(entry.insert(WriterBuilder::new().from_writer(file)))
            }
        }
    }

    fn drop_table(&mut self, table: &str) -> std::result::Result<(), StoreError> {
        self.writers.remove(table);
        self.keys.forget(table);
        let path = table_file(&self.root, table);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::UnknownTable(table.to_string()))
            }
            Err(source) => Err(IoError::write(&path, source).into()),
        }
    }

    fn create_table(
        &mut self,
        table: &str,
        columns: Vec<String>,
        primary_key: &str,
    ) -> std::result::Result<(), StoreError> {
        let path = table_file(&self.root, table);
        let file = File::create(&path).map_err(|source| IoError::write(&path, source))?;
        let mut writer = WriterBuilder::new().from_writer(file);
        writer
            .write_record(&columns)
            .map_err(|source| IoError::csv(&path, source))?;
        self.writers.insert(table.to_string(), writer);
        self.keys.track(table, primary_key);
        debug!(
            table = %table,
            path = %path.display(),
            columns = columns.len(),
            "table file created"
        );
        Ok(())
    }
}

fn table_file(root: &Path, table: &str) -> PathBuf {
    root.join(format!("{table}.csv"))
}

fn cell_text(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Int(value) => value.to_string(),
        SqlValue::Float(value) => value.to_string(),
        SqlValue::Text(text) => text.clone(),
        SqlValue::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl RelationalStore for CsvTableStore {
    fn table_names(&mut self) -> std::result::Result<Vec<String>, StoreError> {
        let entries =
            fs::read_dir(&self.root).map_err(|source| IoError::read(&self.root, source))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| IoError::read(&self.root, source))?
                .path();
            if path.extension().is_some_and(|ext| ext == "csv")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn execute(&mut self, statement: &Statement) -> std::result::Result<(), StoreError> {
        match statement {
            Statement::DropTable { table } => self.drop_table(table),
            Statement::CreateTable(schema) => {
                self.create_table(&schema.name, schema.column_names(), &schema.primary_key)
            }
            Statement::Insert {
                table,
                columns,
                values,
            } => {
                self.keys.claim(table, columns, values)?;
                let path = table_file(&self.root, table);
                let writer = self.writer(table)?;
                writer
                    .write_record(values.iter().map(cell_text))
                    .map_err(|source| IoError::csv(&path, source))?;
                Ok(())
            }
        }
    }

    fn commit(&mut self) -> std::result::Result<(), StoreError> {
        for (table, writer) in &mut self.writers {
            let path = table_file(&self.root, table);
            writer
                .flush()
                .map_err(|source| IoError::write(&path, source))?;
        }
        Ok(())
    }

    fn scan(&mut self, table: &str) -> std::result::Result<ResultSet, StoreError> {
        let path = table_file(&self.root, table);
        if let Some(writer) = self.writers.get_mut(table) {
            writer
                .flush()
                .map_err(|source| IoError::write(&path, source))?;
        }
        if !path.is_file() {
            return Err(StoreError::UnknownTable(table.to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
            .map_err(|source| IoError::csv(&path, source))?;
        let columns: Vec<String> = reader
            .headers()
            .map_err(|source| IoError::csv(&path, source))?
            .iter()
            .map(|header| header.trim_matches('\u{feff}').to_string())
            .collect();

        let mut rows: Vec<Vec<SqlValue>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| IoError::csv(&path, source))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            SqlValue::Null
                        } else {
                            SqlValue::from(cell)
                        }
                    })
                    .collect(),
            );
        }
        debug!(table = %table, rows = rows.len(), "table scanned");
        Ok(ResultSet { columns, rows })
    }
}
