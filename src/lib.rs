//! `salesdash` library crate.
//!
//! The binary (`salesdash`) is a thin wrapper around this library so that:
//!
//! - the loader and the filter/aggregate engine are testable without a terminal
//! - the CLI and the TUI share one load -> filter -> aggregate pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
