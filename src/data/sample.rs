//! Synthetic sales dataset generation.
//!
//! Produces a CSV in the loader's input schema, including the imperfections
//! the loader is built to repair: blank products/categories/regions and
//! unparseable dates. Output is fully determined by the config (seeded RNG).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::error::{AppError, EXIT_INPUT, EXIT_RUNTIME};
use crate::io::ingest::REQUIRED_COLUMNS;

/// `(product, category, list price)`.
const CATALOG: [(&str, &str, f64); 10] = [
    ("Laptop", "Electronics", 899.0),
    ("Headphones", "Electronics", 129.0),
    ("Smartphone", "Electronics", 649.0),
    ("Desk Chair", "Furniture", 189.0),
    ("Bookshelf", "Furniture", 119.0),
    ("Standing Desk", "Furniture", 349.0),
    ("Notebook", "Office Supplies", 4.5),
    ("Pen Set", "Office Supplies", 12.0),
    ("Coffee Maker", "Appliances", 79.0),
    ("Blender", "Appliances", 59.0),
];

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    /// Dates are drawn uniformly from `[start_date, start_date + days)`.
    pub days: u64,
    /// Probability that each of product/category/region is left blank.
    pub blank_prob: f64,
    /// Probability that a row's date is written as unparseable text.
    pub bad_date_prob: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 365,
            blank_prob: 0.02,
            bad_date_prob: 0.01,
        }
    }
}

/// Generate sample rows as CSV cells (in `REQUIRED_COLUMNS` order).
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<[String; 6]>, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(EXIT_INPUT, "Sample row count must be > 0."));
    }
    if config.days == 0 {
        return Err(AppError::new(EXIT_INPUT, "Sample date span must be > 0 days."));
    }
    for (name, p) in [("blank", config.blank_prob), ("bad-date", config.bad_date_prob)] {
        if !(0.0..=1.0).contains(&p) {
            return Err(AppError::new(EXIT_INPUT, format!("Invalid {name} probability {p} (expected 0..=1).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    // Multiplicative price noise around the list price.
    let noise = Normal::new(1.0, 0.08)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.rows);
    for _ in 0..config.rows {
        let (product, category, list_price) = CATALOG[rng.gen_range(0..CATALOG.len())];
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];
        let quantity: u32 = rng.gen_range(1..=10);

        let unit_price = (list_price * noise.sample(&mut rng)).max(0.01);
        let total_price = (unit_price * quantity as f64 * 100.0).round() / 100.0;

        let offset = rng.gen_range(0..config.days);
        let date = if rng.gen_bool(config.bad_date_prob) {
            "not-a-date".to_string()
        } else {
            config
                .start_date
                .checked_add_days(Days::new(offset))
                .unwrap_or(config.start_date)
                .format("%Y-%m-%d")
                .to_string()
        };

        let mut blank = |value: &str| {
            if rng.gen_bool(config.blank_prob) {
                String::new()
            } else {
                value.to_string()
            }
        };
        let product = blank(product);
        let category = blank(category);
        let region = blank(region);

        rows.push([
            date,
            product,
            category,
            region,
            quantity.to_string(),
            format!("{total_price:.2}"),
        ]);
    }

    Ok(rows)
}

/// Generate a sample and write it as CSV.
pub fn write_sample_csv(path: &Path, config: &SampleConfig) -> Result<usize, AppError> {
    let rows = generate_sample(config)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    write_sample(file, &rows)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write sample CSV '{}': {e}", path.display())))?;
    debug!(path = %path.display(), rows = rows.len(), seed = config.seed, "wrote sample dataset");
    Ok(rows.len())
}

fn write_sample<W: Write>(writer: W, rows: &[[String; 6]]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(REQUIRED_COLUMNS)?;
    for row in rows {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}
