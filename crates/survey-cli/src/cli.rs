//! CLI argument definitions for the survey exporter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use survey_report::OutputFormat;

#[derive(Parser)]
#[command(
    name = "survey-export",
    version,
    about = "Export campaign survey responses as JSON or CSV",
    long_about = "Reconstruct survey instances from stored prompt responses and render them.\n\n\
                  Supports row documents, column documents (JSON) and delimited text (CSV)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

    /// Allow participant response values in trace output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the responses of one campaign.
    Render(RenderArgs),

    /// List the column tokens a request may name.
    Columns,
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Campaign definition (JSON).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: PathBuf,

    /// Response rows, a JSON array or a CSV file with a header line.
    #[arg(long = "rows", value_name = "PATH")]
    pub rows: PathBuf,

    /// Export profile (TOML). Flags given here override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Requested column tokens, comma separated (default: special:all).
    #[arg(long = "columns", value_name = "TOKENS", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Write the document here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Omit metadata and framing from the document.
    #[arg(long = "suppress-metadata")]
    pub suppress_metadata: bool,

    /// Indent JSON documents.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Include the storage key of each survey response in row documents.
    #[arg(long = "return-id")]
    pub return_id: bool,

    /// Skip the summary table.
    #[arg(long = "quiet-summary")]
    pub quiet_summary: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    JsonRows,
    JsonColumns,
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::JsonRows => OutputFormat::JsonRows,
            OutputFormatArg::JsonColumns => OutputFormat::JsonColumns,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
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
