//! Export filtered rows to CSV.
//!
//! The export uses the same six columns as the input so it can be loaded back
//! with `salesdash summary --data <export.csv>`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SalesRecord;
use crate::error::{AppError, EXIT_INPUT};
use crate::io::ingest::REQUIRED_COLUMNS;

/// Write rows to a CSV file.
pub fn write_rows_csv(path: &Path, rows: &[SalesRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_rows(file, rows)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write rows as CSV to any writer. Missing values become empty cells.
pub fn write_rows<W: Write>(writer: W, rows: &[SalesRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(REQUIRED_COLUMNS)?;

    for r in rows {
        let date = r.date.format("%Y-%m-%d").to_string();
        let quantity = r.quantity.map(|q| q.to_string()).unwrap_or_default();
        let total_price = r.total_price.map(|p| p.to_string()).unwrap_or_default();
        out.write_record([
            date.as_str(),
            r.product.as_str(),
            r.category.as_str(),
            r.region.as_deref().unwrap_or(""),
            quantity.as_str(),
            total_price.as_str(),
        ])?;
    }

    out.flush()?;
    Ok(())
}
