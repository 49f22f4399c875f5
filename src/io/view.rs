//! Read/write derived-view JSON files.
//!
//! A view file is the portable snapshot of one dashboard state:
//! - the filter that produced it
//! - KPIs and the three grouped series
//! - the filtered rows
//!
//! The schema is defined by `domain::ViewFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::domain::{DerivedView, ViewFile};
use crate::error::{AppError, EXIT_INPUT};

/// Write a view JSON file.
pub fn write_view_json(path: &Path, view: &DerivedView, source: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create view JSON '{}': {e}", path.display())))?;

    let snapshot = ViewFile {
        tool: "salesdash".to_string(),
        source: source.display().to_string(),
        generated_at: Local::now().to_rfc3339(),
        view: view.clone(),
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write view JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write view JSON: {e}")))?;

    Ok(())
}

/// Read a view JSON file.
pub fn read_view_json(path: &Path) -> Result<ViewFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open view JSON '{}': {e}", path.display())))?;
    let snapshot: ViewFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid view JSON: {e}")))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterSpec;
    use crate::engine::apply;
    use crate::io::ingest::load_from_reader;

    #[test]
    fn view_survives_a_json_round_trip() {
        let csv = concat!(
            "Date,Product,Category,Region,Quantity,Total Price\n",
            "2024-01-01,Widget,A,East,2,20.0\n",
            "2024-01-02,Gadget,B,,1,15.25\n",
        );
        let ds = load_from_reader(csv.as_bytes()).unwrap().dataset;
        let view = apply(&ds, &FilterSpec::default());

        let path = std::env::temp_dir().join(format!("salesdash_view_{}.json", std::process::id()));
        write_view_json(&path, &view, Path::new("sales.csv")).unwrap();
        let back = read_view_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, "salesdash");
        assert_eq!(back.source, "sales.csv");
        assert_eq!(back.view.kpis, view.kpis);
        assert_eq!(back.view.rows, view.rows);
        assert_eq!(back.view.sales_by_region[1].region, None);
    }
}
