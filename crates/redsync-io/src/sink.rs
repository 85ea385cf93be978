//! Import files in the capture platform's flat record format.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use redsync_core::{BoxError, ProjectSink};
use redsync_model::Record;
use tracing::info;

use crate::error::{IoError, Result};

/// Writes each form's records to `<dir>/<form>.json`.
///
/// Records imported into the same form more than once in a run accumulate in
/// one file.
#[derive(Debug)]
pub struct ImportFileSink {
    dir: PathBuf,
    written: BTreeMap<String, Vec<Record>>,
}

impl ImportFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: BTreeMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn form_path(&self, form: &str) -> PathBuf {
        self.dir.join(format!("{form}.json"))
    }

    fn write_form(&mut self, form: &str, records: &[Record]) -> Result<PathBuf> {
        let path = self.form_path(form);
        fs::create_dir_all(&self.dir).map_err(|source| IoError::write(&self.dir, source))?;

        let all = self.written.entry(form.to_string()).or_default();
        all.extend_from_slice(records);

        let file = File::create(&path).map_err(|source| IoError::write(&path, source))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &*all).map_err(|source| IoError::Json {
            path: path.clone(),
            source,
        })?;
        out.flush().map_err(|source| IoError::write(&path, source))?;
        Ok(path)
    }
}

impl ProjectSink for ImportFileSink {
    fn import_records(
        &mut self,
        form: &str,
        records: &[Record],
    ) -> std::result::Result<usize, BoxError> {
        let path = self.write_form(form, records)?;
        info!(
            form = %form,
            records = records.len(),
            path = %path.display(),
            "import file written"
        );
        Ok(records.len())
    }
}
