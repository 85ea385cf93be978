use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{error, info, info_span};

use redsync_core::{
    AutoApprove, FieldCatalog, ImportRequest, Operator, RelationalStore, Statement, TableSchema,
    TransferEngine, TransferError, TransferSummary,
};
use redsync_io::{CsvTableStore, ImportFileSink, ProjectSnapshot, SqlScriptStore};

use crate::cli::{DdlArgs, ExportArgs, ImportArgs, ProjectArgs};
use crate::config::{Config, DEFAULT_CONFIG_FILE, DatabaseKind, DatabaseProfile};
use crate::logging::redact_value;
use crate::operator::PromptOperator;
use crate::progress::BarProgress;
use crate::summary::listing_table;

/// Load the configuration from `path`, or `redsync.toml` in the working
/// directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    Config::load(&path).context("load configuration")
}

pub fn run_forms(config: &Config, args: &ProjectArgs) -> Result<()> {
    let snapshot = open_project(config, &args.project)?;
    let catalog = catalog_of(&snapshot);
    let mut rows = Vec::new();
    for form in catalog.forms() {
        let order = catalog.variable_order(&form)?;
        let schema = TableSchema::from_catalog(&catalog, &form)?;
        rows.push(vec![
            form,
            order.len().to_string(),
            order.as_slice().join(", "),
            schema.omitted.join(", "),
        ]);
    }
    let table = listing_table(&["Form", "Variables", "Order", "Omitted"], rows);
    println!("{table}");
    Ok(())
}

pub fn run_ddl(config: &Config, args: &DdlArgs) -> Result<()> {
    let snapshot = open_project(config, &args.project.project)?;
    let catalog = catalog_of(&snapshot);
    let forms = match &args.form {
        Some(form) => vec![form.clone()],
        None => catalog.forms(),
    };
    for form in forms {
        let schema = TableSchema::from_catalog(&catalog, &form)?;
        println!("{};", Statement::CreateTable(schema).render());
    }
    Ok(())
}

pub fn run_export(config: &Config, args: &ExportArgs) -> Result<TransferSummary> {
    let span = info_span!("command", name = "export", project = %args.project.project);
    let _guard = span.enter();

    let snapshot = open_project(config, &args.project.project)?;
    let database = config.database(&args.database)?;
    let mut store = open_store(&database)?;
    let mut operator = operator_for(args.yes, args.overwrite);
    let mut progress = BarProgress::new(io::stderr().is_terminal());

    let result = TransferEngine::new(store.as_mut(), operator.as_mut(), &mut progress)
        .export_project(&snapshot);
    if let Err(TransferError::IntegrityViolation {
        table, statement, ..
    }) = &result
    {
        // The log may be a file kept after the run. The returned error still
        // shows the statement to the operator.
        error!(table = %table, statement = redact_value(statement), "export stopped");
    }
    let summary = result.with_context(|| format!("export to '{}' failed", args.database))?;
    info!(
        tables = summary.tables.len(),
        rows = summary.rows_written(),
        "export finished"
    );
    Ok(summary)
}

pub fn run_import(config: &Config, args: &ImportArgs) -> Result<TransferSummary> {
    let span = info_span!("command", name = "import", project = %args.project.project);
    let _guard = span.enter();

    let requests = pair_requests(&args.tables, &args.forms)?;
    let profile = config.project(&args.project.project)?;
    let snapshot = open_project(config, &args.project.project)?;
    let database = config.database(&args.database)?;
    let mut store = open_store(&database)?;
    let mut operator = operator_for(args.yes, false);
    let mut progress = BarProgress::new(io::stderr().is_terminal());
    let mut sink = ImportFileSink::new(&profile.import_dir);

    let summary = TransferEngine::new(store.as_mut(), operator.as_mut(), &mut progress)
        .import_tables(&snapshot, &mut sink, &requests)
        .with_context(|| format!("import from '{}' failed", args.database))?;
    info!(
        tables = summary.tables.len(),
        rows = summary.rows_written(),
        import_dir = %sink.dir().display(),
        "import finished"
    );
    Ok(summary)
}

/// Pair each `--table` with the `--form` at the same position.
pub fn pair_requests(tables: &[String], forms: &[String]) -> Result<Vec<ImportRequest>> {
    if tables.len() != forms.len() {
        bail!(
            "each --table needs a matching --form ({} tables, {} forms)",
            tables.len(),
            forms.len()
        );
    }
    Ok(tables
        .iter()
        .zip(forms)
        .map(|(table, form)| ImportRequest {
            table: table.clone(),
            form: form.clone(),
        })
        .collect())
}

fn open_project(config: &Config, name: &str) -> Result<ProjectSnapshot> {
    let profile = config.project(name)?;
    ProjectSnapshot::load(
        &profile.metadata,
        &profile.records,
        profile.primary_key.as_deref(),
    )
    .with_context(|| format!("load project '{name}'"))
}

fn open_store(database: &DatabaseProfile) -> Result<Box<dyn RelationalStore>> {
    let store: Box<dyn RelationalStore> = match database.kind {
        DatabaseKind::Csv => Box::new(CsvTableStore::open(&database.path)?),
        DatabaseKind::SqlScript => Box::new(SqlScriptStore::open(
            &database.path,
            database.existing_tables.iter().cloned(),
        )?),
    };
    Ok(store)
}

fn operator_for(yes: bool, overwrite: bool) -> Box<dyn Operator> {
    if yes {
        Box::new(AutoApprove { overwrite })
    } else {
        Box::new(PromptOperator::new(io::stdin().lock(), io::stderr()))
    }
}

fn catalog_of(snapshot: &ProjectSnapshot) -> FieldCatalog {
    FieldCatalog::new(snapshot.fields().to_vec(), snapshot.primary_key_name())
}
