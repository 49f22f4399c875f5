//! Reporting utilities: formatted terminal output for a derived view.

pub mod format;

pub use format::*;
