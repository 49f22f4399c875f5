//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - filtered-row CSV export (`export`)
//! - derived-view JSON read/write (`view`)

pub mod export;
pub mod ingest;
pub mod view;

pub use export::*;
pub use ingest::*;
pub use view::*;
