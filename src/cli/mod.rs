//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loader/engine code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::RawFilter;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about = "Sales Data Dashboard")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print KPIs, charts, and transactions for a filtered dataset.
    Summary(SummaryArgs),
    /// Write the filtered rows to a CSV file.
    Export(ExportArgs),
    /// Print a previously saved view JSON.
    Show(ShowArgs),
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
    /// Generate a synthetic sales CSV.
    Sample(SampleArgs),
}

/// Where the dataset comes from.
#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// Sales CSV (falls back to SALESDASH_DATA, then an interactive picker).
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: Option<PathBuf>,
}

/// Filter constraints; every one is optional.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// Inclusive start date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Inclusive end date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Exact category.
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Exact region.
    #[arg(short = 'r', long)]
    pub region: Option<String>,
}

impl FilterArgs {
    pub fn to_raw(&self) -> RawFilter {
        RawFilter {
            start_date: self.start.clone(),
            end_date: self.end.clone(),
            category: self.category.clone(),
            region: self.region.clone(),
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Number of transactions to print (0 hides the table).
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Disable the sales-over-time plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the filtered rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full view (filter, KPIs, series, rows) to JSON.
    #[arg(long = "export-view", value_name = "JSON")]
    pub export_view: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// View JSON produced by `salesdash summary --export-view`.
    #[arg(long, value_name = "JSON")]
    pub view: PathBuf,

    /// Number of transactions to print.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Initial filter (editable inside the dashboard).
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date in the generated range (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: String,

    /// Number of days covered.
    #[arg(long, default_value_t = 365)]
    pub days: u64,

    /// Probability of blank product/category/region cells.
    #[arg(long, default_value_t = 0.02)]
    pub blank_prob: f64,

    /// Probability of an unparseable date.
    #[arg(long, default_value_t = 0.01)]
    pub bad_date_prob: f64,
}
