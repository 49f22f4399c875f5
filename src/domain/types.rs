//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory for the lifetime of the process (`Dataset`)
//! - rebuilt on every filter change (`FilterSpec`, `DerivedView`)
//! - exported to JSON/CSV

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvalidFilterError;

/// Substituted when a row has no `Product`.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
/// Substituted when a row has no `Category`.
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// One row of the base table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub category: String,
    /// Passed through as-is; there is no fill rule for missing regions.
    pub region: Option<String>,
    /// `None` when the source cell was empty or unparseable.
    pub quantity: Option<u64>,
    /// `None` when the source cell was empty or unparseable.
    pub total_price: Option<Decimal>,
}

/// The immutable base table.
///
/// Built once by the loader; nothing hands out mutable access afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<SalesRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categories in first-seen order (filter choices).
    pub fn categories(&self) -> Vec<&str> {
        let set: IndexSet<&str> = self.records.iter().map(|r| r.category.as_str()).collect();
        set.into_iter().collect()
    }

    /// Distinct non-missing regions in first-seen order (filter choices).
    pub fn regions(&self) -> Vec<&str> {
        let set: IndexSet<&str> = self.records.iter().filter_map(|r| r.region.as_deref()).collect();
        set.into_iter().collect()
    }

    /// Earliest and latest record date, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

/// User-chosen constraints. Every field is optional; `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end_date: Option<NaiveDate>,
    /// Exact, case-sensitive match.
    pub category: Option<String>,
    /// Exact, case-sensitive match.
    pub region: Option<String>,
}

impl FilterSpec {
    pub fn is_unconstrained(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.category.is_none()
            && self.region.is_none()
    }
}

/// Filter values as typed by a user (CLI flags, TUI fields).
///
/// Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
}

impl RawFilter {
    pub fn resolve(&self) -> Result<FilterSpec, InvalidFilterError> {
        Ok(FilterSpec {
            start_date: resolve_date("start date", self.start_date.as_deref())?,
            end_date: resolve_date("end date", self.end_date.as_deref())?,
            category: non_blank(self.category.as_deref()),
            region: non_blank(self.region.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn resolve_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, InvalidFilterError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    parse_date(&value)
        .or_else(|| parse_datetime_date(&value))
        .map(Some)
        .ok_or(InvalidFilterError { field, value })
}

/// Parse a calendar date in one of the accepted layouts.
///
/// ISO (`YYYY-MM-DD`) is canonical, but spreadsheet exports frequently use
/// `DD/MM/YYYY` or `DD-MM-YYYY`, so a small fixed set is tried in order.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    let s = s.trim();
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// Date pickers send bounds as midnight datetimes (`2024-01-01T00:00:00`).
fn parse_datetime_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    FMTS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// The scalar indicators shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    /// Sum of known `total_price` values (zero when there are none).
    pub total_sales: Decimal,
    /// Mean of known `total_price` values; `None` means "no data".
    pub avg_sales: Option<Decimal>,
    /// Sum of known quantities (zero when there are none).
    pub total_quantity: u64,
    /// Number of rows in the filtered subsequence.
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// A region's sales and its share of the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShare {
    /// `None` groups the records that have no region.
    pub region: Option<String>,
    pub total: Decimal,
    /// `total / total_sales`; `None` when the filtered total is zero.
    pub share: Option<f64>,
}

impl RegionShare {
    pub fn label(&self) -> &str {
        self.region.as_deref().unwrap_or("(none)")
    }
}

/// Everything the dashboard displays for one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedView {
    pub filter: FilterSpec,
    pub kpis: Kpis,
    /// Ascending by date.
    pub sales_by_date: Vec<DateTotal>,
    /// First-seen category order.
    pub sales_by_category: Vec<CategoryTotal>,
    /// First-seen region order.
    pub sales_by_region: Vec<RegionShare>,
    pub rows: Vec<SalesRecord>,
}

/// A saved view file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewFile {
    pub tool: String,
    /// Dataset path the view was computed from.
    pub source: String,
    pub generated_at: String,
    pub view: DerivedView,
}

/// A full run's configuration as understood by the front-ends.
///
/// This is derived from CLI flags, `.env`, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub filter: FilterSpec,

    /// How many filtered rows to print in `summary`.
    pub table_rows: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_rows: Option<PathBuf>,
    pub export_view: Option<PathBuf>,
}
