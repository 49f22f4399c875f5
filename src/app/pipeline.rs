//! Shared "load -> filter -> aggregate" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow; the CLI and
//! the TUI can then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use crate::domain::{DashboardConfig, DerivedView, FilterSpec};
use crate::engine;
use crate::error::AppError;
use crate::io::ingest::{self, LoadedDataset};

/// A loaded dataset plus where it came from. Immutable once built.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: PathBuf,
    pub loaded: LoadedDataset,
}

impl Session {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let loaded = ingest::load(path)?;
        Ok(Self {
            source: path.to_path_buf(),
            loaded,
        })
    }

    pub fn view(&self, filter: &FilterSpec) -> DerivedView {
        engine::apply(&self.loaded.dataset, filter)
    }
}

/// All computed outputs of a single `salesdash summary` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub session: Session,
    pub view: DerivedView,
}

/// Load the configured dataset and compute the view for its filter.
pub fn run_summary(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let session = Session::open(&config.data_path)?;
    let view = session.view(&config.filter);
    Ok(RunOutput { session, view })
}
