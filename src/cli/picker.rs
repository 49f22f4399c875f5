//! Interactive dataset picker.
//!
//! Used when neither `--data` nor `SALESDASH_DATA` names a dataset: list the
//! `*.csv` files under the working directory and let the user choose one.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, EXIT_INPUT};

/// How deep below the working directory to look for CSV files.
const SEARCH_DEPTH: usize = 3;

/// Prompt on stdin/stdout for a dataset path.
pub fn prompt_for_dataset() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."), SEARCH_DEPTH);
    if files.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            "No .csv files found. Pass one with `--data <file.csv>` or set SALESDASH_DATA.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, display_path(path));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Dataset number (1-{}) or path, q to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write prompt: {e}")))?;

        let Some(line) = lines.next() else {
            return Err(AppError::new(EXIT_INPUT, "No dataset selected (end of input)."));
        };
        let line = line.map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read input: {e}")))?;

        match resolve_choice(line.trim(), &files) {
            Choice::Quit => return Err(AppError::new(EXIT_INPUT, "Canceled.")),
            Choice::Path(path) => match validate_csv_path(&path) {
                Ok(path) => return Ok(path),
                Err(err) => println!("{err}"),
            },
            Choice::OutOfRange(n) => println!("No entry {n}; pick 1-{}.", files.len()),
            Choice::Empty => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Quit,
    Empty,
    OutOfRange(usize),
    Path(PathBuf),
}

fn resolve_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.is_empty() {
        return Choice::Empty;
    }
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=files.len()).contains(&n) => Choice::Path(files[n - 1].clone()),
        Ok(n) => Choice::OutOfRange(n),
        Err(_) => Choice::Path(PathBuf::from(input)),
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(EXIT_INPUT, format!("CSV file not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(AppError::new(EXIT_INPUT, format!("Not a file: {}", path.display())));
    }
    if !is_csv(path) {
        return Err(AppError::new(EXIT_INPUT, format!("Expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files below `root`, sorted by display path.
pub fn discover_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if depth < max_depth && !is_ignored_dir(&path) {
                    pending.push((path, depth + 1));
                }
            } else if file_type.is_file() && is_csv(&path) {
                found.push(path);
            }
        }
    }

    found.sort_by_key(|p| display_path(p));
    found
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn is_ignored_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
