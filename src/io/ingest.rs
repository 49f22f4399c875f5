//! CSV ingest and normalization.
//!
//! This module is responsible for turning a sales export into the clean,
//! immutable base table the engine works on.
//!
//! Design goals:
//! - **Strict schema** for the six required columns (clear errors + exit code 2)
//! - **Row-level validation** (drop rows without a usable date, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no filtering or aggregation here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::domain::{Dataset, SalesRecord, UNKNOWN_CATEGORY, UNKNOWN_PRODUCT, parse_date};
use crate::error::LoadError;

pub const COL_DATE: &str = "Date";
pub const COL_PRODUCT: &str = "Product";
pub const COL_CATEGORY: &str = "Category";
pub const COL_REGION: &str = "Region";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_TOTAL_PRICE: &str = "Total Price";

/// Column names in source order; also used as the export header.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_PRODUCT,
    COL_CATEGORY,
    COL_REGION,
    COL_QUANTITY,
    COL_TOTAL_PRICE,
];

/// A row-level note produced during ingest.
///
/// Issues either drop the row (bad date, malformed record) or null out a
/// single numeric cell; `dropped` tells which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub dropped: bool,
    pub message: String,
}

/// Ingest output: the base table plus what happened while building it.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub row_issues: Vec<RowIssue>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl LoadedDataset {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Load and normalize a sales CSV from disk.
pub fn load(path: &Path) -> Result<LoadedDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = load_from_reader(file)?;
    debug!(
        path = %path.display(),
        rows_read = loaded.rows_read,
        rows_used = loaded.rows_used,
        "loaded dataset"
    );
    Ok(loaded)
}

/// Load and normalize a sales CSV from any reader.
pub fn load_from_reader<R: Read>(reader: R) -> Result<LoadedDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut row_issues = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let raw = match result {
            Ok(r) => r,
            Err(e) => {
                row_issues.push(RowIssue {
                    line,
                    dropped: true,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match normalize_row(&raw, &columns, line, &mut row_issues) {
            Some(record) => records.push(record),
            None => debug!(line, "dropped row without a valid date"),
        }
    }

    if !row_issues.is_empty() {
        warn!(count = row_issues.len(), "dataset rows had issues during ingest");
    }

    let rows_used = records.len();
    Ok(LoadedDataset {
        dataset: Dataset::new(records),
        row_issues,
        rows_read,
        rows_used,
    })
}

/// Header positions for the required columns.
struct Columns {
    date: usize,
    product: usize,
    category: usize,
    region: usize,
    quantity: usize,
    total_price: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let header_map = build_header_map(headers);
        let find = |name: &'static str| {
            header_map
                .get(&normalize_header_name(name))
                .copied()
                .ok_or(LoadError::MissingColumn(name))
        };
        Ok(Self {
            date: find(COL_DATE)?,
            product: find(COL_PRODUCT)?,
            category: find(COL_CATEGORY)?,
            region: find(COL_REGION)?,
            quantity: find(COL_QUANTITY)?,
            total_price: find(COL_TOTAL_PRICE)?,
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "\u{feff}Date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn normalize_row(
    raw: &StringRecord,
    columns: &Columns,
    line: usize,
    issues: &mut Vec<RowIssue>,
) -> Option<SalesRecord> {
    let date_text = cell(raw, columns.date);
    let Some(date) = date_text.and_then(parse_date) else {
        issues.push(RowIssue {
            line,
            dropped: true,
            message: match date_text {
                Some(s) => format!("Invalid `Date` '{s}'."),
                None => "Missing `Date`.".to_string(),
            },
        });
        return None;
    };

    let product = cell(raw, columns.product).unwrap_or(UNKNOWN_PRODUCT).to_string();
    let category = cell(raw, columns.category).unwrap_or(UNKNOWN_CATEGORY).to_string();
    let region = cell(raw, columns.region).map(str::to_string);

    let quantity = cell(raw, columns.quantity).and_then(|s| {
        let parsed = parse_quantity(s);
        if parsed.is_none() {
            issues.push(RowIssue {
                line,
                dropped: false,
                message: format!("Invalid `Quantity` '{s}' treated as missing."),
            });
        }
        parsed
    });

    let total_price = cell(raw, columns.total_price).and_then(|s| {
        let parsed = parse_amount(s);
        if parsed.is_none() {
            issues.push(RowIssue {
                line,
                dropped: false,
                message: format!("Invalid `Total Price` '{s}' treated as missing."),
            });
        }
        parsed
    });

    Some(SalesRecord {
        date,
        product,
        category,
        region,
        quantity,
        total_price,
    })
}

fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Non-negative integer count. Whole-number floats (`"3.0"`) are accepted since
/// spreadsheet tools often write integer columns that way.
fn parse_quantity(s: &str) -> Option<u64> {
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let d = parse_amount(s)?;
    if d.fract().is_zero() {
        d.to_u64()
    } else {
        None
    }
}

/// Non-negative decimal amount.
fn parse_amount(s: &str) -> Option<Decimal> {
    let d = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()?;
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }
    Some(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Date,Product,Category,Region,Quantity,Total Price\n";

    fn load_str(body: &str) -> LoadedDataset {
        load_from_reader(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    #[test]
    fn drops_rows_with_unparseable_dates() {
        let loaded = load_str(concat!(
            "2024-01-01,Widget,A,East,2,20.0\n",
            "2024-01-02,Gadget,B,West,1,15.0\n",
            "invalid-date,Gizmo,A,East,3,30.0\n",
        ));
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_used, 2);
        assert_eq!(loaded.rows_dropped(), 1);
        assert_eq!(loaded.dataset.len(), 2);
        assert_eq!(loaded.row_issues.len(), 1);
        assert_eq!(loaded.row_issues[0].line, 4);
        assert!(loaded.row_issues[0].dropped);

        let first = &loaded.dataset.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.product, "Widget");
        assert_eq!(first.region.as_deref(), Some("East"));
        assert_eq!(first.quantity, Some(2));
        assert_eq!(first.total_price, Some(Decimal::new(20, 0)));
    }

    #[test]
    fn drops_rows_with_missing_dates() {
        let loaded = load_str(",Widget,A,East,2,20.0\n2024-01-01,Widget,A,East,2,20.0\n");
        assert_eq!(loaded.dataset.len(), 1);
        assert_eq!(loaded.row_issues[0].message, "Missing `Date`.");
    }

    #[test]
    fn fills_missing_product_and_category_but_not_region() {
        let loaded = load_str("2024-01-01,,  ,,2,20.0\n");
        let r = &loaded.dataset.records()[0];
        assert_eq!(r.product, UNKNOWN_PRODUCT);
        assert_eq!(r.category, UNKNOWN_CATEGORY);
        assert_eq!(r.region, None);
    }

    #[test]
    fn short_rows_are_treated_as_missing_trailing_cells() {
        let loaded = load_str("2024-01-01,Widget\n");
        let r = &loaded.dataset.records()[0];
        assert_eq!(r.category, UNKNOWN_CATEGORY);
        assert_eq!(r.quantity, None);
        assert_eq!(r.total_price, None);
        assert!(loaded.row_issues.is_empty());
    }

    #[test]
    fn bad_numbers_become_missing_and_keep_the_row() {
        let loaded = load_str("2024-01-01,Widget,A,East,two,-5\n2024-01-02,Widget,A,East,3.0,1e2\n");
        assert_eq!(loaded.dataset.len(), 2);

        let first = &loaded.dataset.records()[0];
        assert_eq!(first.quantity, None);
        assert_eq!(first.total_price, None);
        assert_eq!(loaded.row_issues.len(), 2);
        assert!(loaded.row_issues.iter().all(|i| !i.dropped));

        let second = &loaded.dataset.records()[1];
        assert_eq!(second.quantity, Some(3));
        assert_eq!(second.total_price, Some(Decimal::new(100, 0)));
    }

    #[test]
    fn header_matching_ignores_case_whitespace_and_bom() {
        let csv = "\u{feff}date, PRODUCT ,category,Region,quantity,total price,Extra\n2024-01-01,W,A,East,1,2.5,x\n";
        let loaded = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded.dataset.len(), 1);
        assert_eq!(loaded.dataset.records()[0].total_price, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let csv = "Total Price,Quantity,Region,Category,Product,Date\n9.5,4,North,C,Thing,2024-05-06\n";
        let loaded = load_from_reader(csv.as_bytes()).unwrap();
        let r = &loaded.dataset.records()[0];
        assert_eq!(r.product, "Thing");
        assert_eq!(r.quantity, Some(4));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "Date,Product,Category,Quantity,Total Price\n2024-01-01,W,A,1,2\n";
        let err = load_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Region")));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let err = load(Path::new("/definitely/not/here/sales.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn undecodable_records_are_dropped_and_reported() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"2024-01-01,Widget,A,East,2,20.0\n");
        bytes.extend_from_slice(b"2024-01-02,Gad\xffget,B,West,1,15.0\n");
        bytes.extend_from_slice(b"2024-01-03,Gizmo,A,East,3,30.0\n");

        let loaded = load_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_used, 2);
        assert_eq!(loaded.rows_dropped(), 1);

        assert_eq!(loaded.row_issues.len(), 1);
        let issue = &loaded.row_issues[0];
        assert_eq!(issue.line, 3);
        assert!(issue.dropped);
        assert!(issue.message.starts_with("CSV parse error"));

        let products: Vec<&str> = loaded.dataset.records().iter().map(|r| r.product.as_str()).collect();
        assert_eq!(products, vec!["Widget", "Gizmo"]);
    }

    #[test]
    fn header_only_source_loads_an_empty_dataset() {
        let loaded = load_str("");
        assert!(loaded.dataset.is_empty());
        assert_eq!(loaded.rows_read, 0);
    }
}
