pub mod config;
pub mod convert;
pub mod inspect;
pub mod lines;
pub mod preview;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::document::StatementFile;
use crate::export::OutputFormat;

#[derive(Parser)]
#[command(
    name = "passbook",
    version,
    about = "Turn bank statements into a reconciled, chronological ledger."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/passbook/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a statement into a ledger file.
    Convert {
        /// Statement: PDF, layout dump (.json), CSV, spreadsheet or text
        file: PathBuf,
        /// Output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Print the reconciled ledger with totals.
    Preview {
        file: PathBuf,
    },
    /// Show the winning extraction strategy, column roles and first rows.
    Inspect {
        file: PathBuf,
        /// Number of extracted rows to show
        #[arg(long, default_value = "10")]
        rows: usize,
    },
    /// Dump every text line as Page #, Line #, Content.
    Lines {
        file: PathBuf,
        /// Output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Set one key and save.
    Set {
        /// tolerance, day_first, line_bucket, min_rows or sample_rows
        key: String,
        value: String,
    },
    /// Print the settings file location.
    Path,
}

/// Statement on disk, refusing paths that are not files before any
/// strategy gets to try them.
pub(crate) fn statement(file: &Path) -> anyhow::Result<StatementFile> {
    if !file.is_file() {
        anyhow::bail!("{} is not a file", file.display());
    }
    Ok(StatementFile::new(file))
}
