//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env`
//! - installs logging
//! - loads the dataset and applies filters
//! - prints reports/plots or launches the TUI
//! - writes optional exports

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Command, DataArgs, ExportArgs, SampleArgs, ShowArgs, SummaryArgs, TuiArgs};
use crate::data::SampleConfig;
use crate::domain::{DashboardConfig, parse_date};
use crate::error::{AppError, EXIT_INPUT};

pub mod pipeline;

/// Environment variable naming the default dataset.
pub const DATA_ENV: &str = "SALESDASH_DATA";

/// Entry point for the `salesdash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `salesdash` and `salesdash -d sales.csv` to behave like `salesdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_summary(&config)?;
    let source = run.session.source.display().to_string();

    println!(
        "{}",
        crate::report::format_run_summary(&source, &run.session.loaded, &config.filter)
    );

    if config.plot {
        println!("Sales Over Time:");
        println!(
            "{}",
            crate::plot::render_sales_over_time(&run.view.sales_by_date, config.plot_width, config.plot_height)
        );
    }

    println!(
        "{}",
        crate::report::format_view(&run.view, bar_width(config.plot_width), config.table_rows)
    );

    // Optional exports.
    if let Some(path) = &config.export_rows {
        crate::io::export::write_rows_csv(path, &run.view.rows)?;
        info!(path = %path.display(), rows = run.view.rows.len(), "exported rows");
    }
    if let Some(path) = &config.export_view {
        crate::io::view::write_view_json(path, &run.view, &config.data_path)?;
        info!(path = %path.display(), "exported view");
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let data_path = resolve_data_path(&args.data)?;
    let filter = args.filter.to_raw().resolve()?;

    let session = pipeline::Session::open(&data_path)?;
    let view = session.view(&filter);
    crate::io::export::write_rows_csv(&args.out, &view.rows)?;

    println!("Wrote {} row(s) to {}", view.rows.len(), args.out.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let snapshot = crate::io::view::read_view_json(&args.view)?;
    let view = &snapshot.view;

    println!("=== salesdash - saved view ===");
    println!("Source: {} (generated {})", snapshot.source, snapshot.generated_at);
    println!("Filter: {}\n", crate::report::describe_filter(&view.filter));
    println!("Sales Over Time:");
    println!(
        "{}",
        crate::plot::render_sales_over_time(&view.sales_by_date, args.width, args.height)
    );
    println!("{}", crate::report::format_view(view, bar_width(args.width), args.rows));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let data_path = resolve_data_path(&args.data)?;
    let session = pipeline::Session::open(&data_path)?;
    crate::tui::run(session, args.filter.to_raw())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let start_date = parse_date(&args.start)
        .ok_or_else(|| AppError::new(EXIT_INPUT, format!("Invalid --start '{}': expected YYYY-MM-DD.", args.start)))?;
    let config = sample_config_from_args(&args, start_date);

    let written = crate::data::write_sample_csv(&args.out, &config)?;
    println!("Wrote {written} sample row(s) to {}", args.out.display());
    Ok(())
}

pub fn config_from_args(args: &SummaryArgs) -> Result<DashboardConfig, AppError> {
    Ok(DashboardConfig {
        data_path: resolve_data_path(&args.data)?,
        filter: args.filter.to_raw().resolve()?,
        table_rows: args.rows,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_rows: args.export.clone(),
        export_view: args.export_view.clone(),
    })
}

fn sample_config_from_args(args: &SampleArgs, start_date: NaiveDate) -> SampleConfig {
    SampleConfig {
        rows: args.rows,
        seed: args.seed,
        start_date,
        days: args.days,
        blank_prob: args.blank_prob,
        bad_date_prob: args.bad_date_prob,
    }
}

/// `--data`, else `SALESDASH_DATA` (from the environment or `.env`), else ask.
fn resolve_data_path(args: &DataArgs) -> Result<PathBuf, AppError> {
    let from_env = std::env::var(DATA_ENV).ok().filter(|v| !v.trim().is_empty());
    match choose_data_source(args.data.as_deref(), from_env.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "using dataset");
            Ok(path)
        }
        None => crate::cli::picker::prompt_for_dataset(),
    }
}

fn choose_data_source(flag: Option<&Path>, env: Option<&str>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env.map(|v| PathBuf::from(v.trim())))
}

// Category bars share the plot's horizontal budget minus the label columns.
fn bar_width(plot_width: usize) -> usize {
    plot_width.saturating_sub(45).clamp(10, 60)
}

/// Rewrite argv so `salesdash` defaults to `salesdash tui`.
///
/// Rules (a leading `-v`/`--verbose` is skipped over):
/// - `salesdash`                      -> `salesdash tui`
/// - `salesdash -d sales.csv ...`     -> `salesdash tui -d sales.csv ...`
/// - `salesdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let pos = argv
        .iter()
        .skip(1)
        .position(|a| !matches!(a.as_str(), "-v" | "--verbose"))
        .map(|p| p + 1);

    let Some(pos) = pos else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        argv[pos].as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if argv[pos].starts_with('-') {
        argv.insert(pos, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["salesdash"])), argv(&["salesdash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["salesdash", "-d", "s.csv"])),
            argv(&["salesdash", "tui", "-d", "s.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["salesdash", "--help"])), argv(&["salesdash", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["salesdash", "summary", "-d", "s.csv"])),
            argv(&["salesdash", "summary", "-d", "s.csv"])
        );
        assert_eq!(
            rewrite_args(argv(&["salesdash", "-v", "summary"])),
            argv(&["salesdash", "-v", "summary"])
        );
        assert_eq!(
            rewrite_args(argv(&["salesdash", "-v", "-d", "s.csv"])),
            argv(&["salesdash", "-v", "tui", "-d", "s.csv"])
        );
        assert_eq!(rewrite_args(argv(&["salesdash", "-v"])), argv(&["salesdash", "-v", "tui"]));
    }

    #[test]
    fn flag_beats_environment() {
        assert_eq!(
            choose_data_source(Some(Path::new("a.csv")), Some("b.csv")),
            Some(PathBuf::from("a.csv"))
        );
        assert_eq!(choose_data_source(None, Some(" b.csv ")), Some(PathBuf::from("b.csv")));
        assert_eq!(choose_data_source(None, None), None);
    }

    #[test]
    fn summary_config_resolves_filters() {
        let cli = crate::cli::Cli::try_parse_from([
            "salesdash", "summary", "-d", "s.csv", "--end", "2024-02-01", "--no-plot",
        ])
        .unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.data_path, PathBuf::from("s.csv"));
        assert_eq!(config.filter.end_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert!(!config.plot);
    }

    #[test]
    fn summary_config_rejects_bad_dates() {
        let cli = crate::cli::Cli::try_parse_from(["salesdash", "summary", "-d", "s.csv", "--start", "soon"]).unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
