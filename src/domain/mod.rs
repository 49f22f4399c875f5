//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the base table (`SalesRecord`, `Dataset`)
//! - filter inputs (`RawFilter`, `FilterSpec`)
//! - engine outputs (`DerivedView`, `Kpis`, grouped totals)

pub mod types;

pub use types::*;
