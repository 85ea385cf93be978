//! CLI argument definitions for redsync.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "redsync",
    version,
    about = "Move records between capture-platform projects and relational tables",
    long_about = "Move records between capture-platform projects and relational tables.\n\n\
                  Exports write one table per form, deriving column types from the data\n\
                  dictionary. Imports align a table's columns to a form by position and\n\
                  produce a platform import file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Configuration file with project and database profiles.
    #[arg(
        long = "config",
        value_name = "PATH",
        env = "REDSYNC_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List a project's forms with their column layout.
    Forms(ProjectArgs),

    /// Print the CREATE TABLE statements an export would issue.
    Ddl(DdlArgs),

    /// Write every form of a project into its own table.
    Export(ExportArgs),

    /// Read tables back into forms and write platform import files.
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Project profile name from the configuration file.
    #[arg(long = "project", value_name = "NAME")]
    pub project: String,
}

#[derive(Args)]
pub struct DdlArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Only print the statement for this form.
    #[arg(long = "form", value_name = "FORM")]
    pub form: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Database profile name from the configuration file.
    #[arg(long = "database", value_name = "NAME")]
    pub database: String,

    /// Answer every prompt without asking.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// With --yes, also drop and recreate tables that already exist.
    #[arg(long = "overwrite", requires = "yes")]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Database profile name from the configuration file.
    #[arg(long = "database", value_name = "NAME")]
    pub database: String,

    /// Source table; repeat together with --form, paired in order.
    #[arg(long = "table", value_name = "TABLE", required = true)]
    pub tables: Vec<String>,

    /// Target form for the --table at the same position.
    #[arg(long = "form", value_name = "FORM", required = true)]
    pub forms: Vec<String>,

    /// Accept proposed column renames without asking.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
