//! Error types.
//!
//! Library operations return typed errors (`LoadError`, `InvalidFilterError`);
//! the binary flattens everything into an `AppError` carrying a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for bad input: unreadable dataset, invalid filters, bad flags.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for runtime failures (terminal, rendering).
pub const EXIT_RUNTIME: u8 = 4;

/// The dataset source could not be turned into a `Dataset`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: `{0}`")]
    MissingColumn(&'static str),
}

/// A filter value could not be interpreted against the dataset's fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} '{value}': expected a date like YYYY-MM-DD")]
pub struct InvalidFilterError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

impl From<InvalidFilterError> for AppError {
    fn from(err: InvalidFilterError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid filter: {err}"))
    }
}
