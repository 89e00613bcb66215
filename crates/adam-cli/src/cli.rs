//! CLI argument definitions for `adtte`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "adtte",
    version,
    about = "Derive ADaM time-to-event (ADTTE) datasets",
    long_about = "Derive ADaM time-to-event (ADTTE) datasets from subject-level and \
                  event tables.\n\n\
                  Each parameter takes, per subject, the earliest qualifying event or \
                  censoring date across its configured sources."
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

    /// Allow subject identifiers in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the study tables, derive ADTTE and write it as CSV.
    Derive(DeriveArgs),

    /// Validate a configuration and list its parameters and sources.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct DeriveArgs {
    /// Path to the JSON study configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output directory (default: <CONFIG directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name (default: adtte.csv).
    #[arg(long = "output-name", value_name = "NAME")]
    pub output_name: Option<String>,

    /// Evaluate subjects in parallel. Output is identical either way.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Derive and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the JSON study configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
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
