//! CLI argument definitions for the model populator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "model-populator",
    version,
    about = "Populate dataset metadata models from tabular sources",
    long_about = "Assemble metadata records for a dataset catalog model from\n\
                  heterogeneous tabular sources (TSV, CSV, JSON), guided by a\n\
                  JSON-Schema template and a declarative mapping configuration."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Populate a model with records assembled from dataset sources.
    Populate(PopulateArgs),

    /// Derive a starter mapping configuration from a template schema.
    GenerateConfig(GenerateConfigArgs),

    /// List the fields of a template schema.
    Fields(FieldsArgs),
}

#[derive(Parser)]
pub struct PopulateArgs {
    /// Dataset directories to populate.
    #[arg(value_name = "DATASET_DIR", required = true)]
    pub datasets: Vec<PathBuf>,

    /// Path to the population configuration file.
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Directory holding template schemas as <template_id>.json
    /// (default: the configuration file's directory).
    #[arg(long = "templates-dir", value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Write record payloads here instead of <DATASET_DIR>/output.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Assemble and report without creating models or records.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Reload every source even when its rows were already loaded
    /// for an earlier dataset in the same run.
    #[arg(long = "force-reload")]
    pub force_reload: bool,
}

#[derive(Parser)]
pub struct GenerateConfigArgs {
    /// Path to the template schema JSON document.
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: PathBuf,

    /// Organization id to embed in the configuration.
    #[arg(long = "org-id", value_name = "ID")]
    pub org_id: String,

    /// Template id to embed in the configuration.
    #[arg(long = "template-id", value_name = "ID")]
    pub template_id: String,

    /// Write the configuration here instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Path to the template schema JSON document.
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: PathBuf,
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
