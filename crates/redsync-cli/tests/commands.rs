//! Configuration handling and command runs against a temporary workspace.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use redsync_cli::cli::{DdlArgs, ExportArgs, ImportArgs, ProjectArgs};
use redsync_cli::commands::{load_config, run_ddl, run_export, run_forms, run_import};
use redsync_cli::config::{Config, ConfigError, DatabaseKind};
use redsync_cli::logging::REDACTED_VALUE;
use redsync_cli::summary::summary_table;

const CONFIG: &str = r#"
[projects.demo]
metadata = "project/metadata.json"
records = "project/records.json"
import_dir = "project/import"

[databases.warehouse]
kind = "csv"
path = "warehouse"

[databases.script]
kind = "sql-script"
path = "out/export.sql"
existing_tables = ["visit"]
"#;

const METADATA: &str = r#"[
  {"field_name": "study_id", "form_name": "demo", "field_type": "text"},
  {"field_name": "consent", "form_name": "demo", "field_type": "checkbox",
   "select_choices_or_calculations": "1, Verbal | 2, Written"},
  {"field_name": "scan", "form_name": "demo", "field_type": "file"},
  {"field_name": "pain", "form_name": "visit", "field_type": "slider"}
]"#;

const RECORDS: &str = r#"[
  {"study_id": "1", "consent___1": "1", "consent___2": "0", "pain": "2"},
  {"study_id": "2", "consent___1": "0", "consent___2": "0", "pain": "9"},
  {"study_id": "3", "consent___1": "1", "consent___2": "1", "pain": ""}
]"#;

const DUPLICATE_RECORDS: &str = r#"[
  {"study_id": "1", "consent___1": "1", "consent___2": "0", "pain": "2"},
  {"study_id": "1", "consent___1": "0", "consent___2": "1", "pain": "4"}
]"#;

/// Log output collected in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn workspace(root: &Path) -> Config {
    fs::create_dir_all(root.join("project")).unwrap();
    fs::write(root.join("project/metadata.json"), METADATA).unwrap();
    fs::write(root.join("project/records.json"), RECORDS).unwrap();
    let config_path = root.join("redsync.toml");
    fs::write(&config_path, CONFIG).unwrap();
    load_config(Some(config_path.as_path())).unwrap()
}

fn project() -> ProjectArgs {
    ProjectArgs {
        project: "demo".to_string(),
    }
}

#[test]
fn relative_paths_resolve_against_config_dir() {
    let config = Config::parse(CONFIG, Path::new("/srv/redsync/redsync.toml")).unwrap();
    let project = config.project("demo").unwrap();
    assert_eq!(
        project.metadata,
        Path::new("/srv/redsync/project/metadata.json")
    );
    assert_eq!(project.primary_key, None);

    let script = config.database("script").unwrap();
    assert_eq!(script.kind, DatabaseKind::SqlScript);
    assert_eq!(script.path, Path::new("/srv/redsync/out/export.sql"));
    assert_eq!(script.existing_tables, vec!["visit"]);
}

#[test]
fn unknown_profiles_list_what_is_configured() {
    let config = Config::parse(CONFIG, Path::new("redsync.toml")).unwrap();
    let err = config.project("trial").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProject { .. }));
    assert_eq!(
        err.to_string(),
        "unknown project 'trial' (configured: demo)"
    );

    let err = config.database("prod").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown database 'prod' (configured: script, warehouse)"
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let text = "[projects.demo]\nmetadata = \"m\"\nrecords = \"r\"\nurl = \"x\"\n";
    let err = Config::parse(text, Path::new("redsync.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = load_config(Some(missing.as_path())).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn export_then_import_through_csv_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());

    run_forms(&config, &project()).unwrap();
    run_ddl(
        &config,
        &DdlArgs {
            project: project(),
            form: Some("demo".to_string()),
        },
    )
    .unwrap();

    let exported = run_export(
        &config,
        &ExportArgs {
            project: project(),
            database: "warehouse".to_string(),
            yes: true,
            overwrite: false,
        },
    )
    .unwrap();
    assert_eq!(exported.rows_written(), 6);
    assert_eq!(exported.tables[0].omitted_columns, vec!["scan"]);
    let visit = fs::read_to_string(dir.path().join("warehouse/visit.csv")).unwrap();
    assert_eq!(visit, "study_id,pain\n1,2\n2,9\n3,\n");

    let imported = run_import(
        &config,
        &ImportArgs {
            project: project(),
            database: "warehouse".to_string(),
            tables: vec!["visit".to_string(), "demo".to_string()],
            forms: vec!["visit".to_string(), "demo".to_string()],
            yes: true,
        },
    )
    .unwrap();
    assert_eq!(imported.rows_written(), 6);
    assert_eq!(imported.tables[1].omitted_columns, vec!["scan"]);
    let import_file = fs::read_to_string(dir.path().join("project/import/visit.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&import_file).unwrap();
    assert_eq!(records[2]["pain"], "");
    assert_eq!(records[0]["study_id"], "1");
    let demo_file = fs::read_to_string(dir.path().join("project/import/demo.json")).unwrap();
    let demo: serde_json::Value = serde_json::from_str(&demo_file).unwrap();
    assert_eq!(demo[2]["consent___2"], "Checked (1)");
    assert!(demo[0].get("scan").is_none());

    let rendered = {
        let mut table = summary_table(&exported);
        table.force_no_tty();
        table.to_string()
    };
    assert!(rendered.contains("created"));
    assert!(rendered.contains("TOTAL"));
}

#[test]
fn export_to_script_overwrites_declared_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());

    let summary = run_export(
        &config,
        &ExportArgs {
            project: project(),
            database: "script".to_string(),
            yes: true,
            overwrite: true,
        },
    )
    .unwrap();
    assert_eq!(summary.tables.len(), 2);
    assert!(summary.untouched.is_empty());

    let script = fs::read_to_string(dir.path().join("out/export.sql")).unwrap();
    assert!(script.contains("DROP TABLE `visit`;\nCREATE TABLE `visit`"));
    assert!(script.contains(
        "INSERT INTO `demo` (`study_id`, `consent___1`, `consent___2`) \
         VALUES (3, 'Checked (1)', 'Checked (1)');"
    ));
}

#[test]
fn export_without_overwrite_keeps_declared_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());

    let summary = run_export(
        &config,
        &ExportArgs {
            project: project(),
            database: "script".to_string(),
            yes: true,
            overwrite: false,
        },
    )
    .unwrap();
    assert_eq!(summary.tables.len(), 1);
    assert_eq!(summary.untouched, vec!["visit"]);
}

#[test]
fn rejected_insert_is_logged_without_row_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());
    fs::write(dir.path().join("project/records.json"), DUPLICATE_RECORDS).unwrap();

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let err = tracing::subscriber::with_default(subscriber, || {
        run_export(
            &config,
            &ExportArgs {
                project: project(),
                database: "warehouse".to_string(),
                yes: true,
                overwrite: false,
            },
        )
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("statement: INSERT INTO `demo`"));

    let logged = log.contents();
    assert!(logged.contains("export stopped"));
    assert!(logged.contains(REDACTED_VALUE));
    assert!(!logged.contains("INSERT INTO"));
}
