//! Filter/aggregate engine.
//!
//! `apply` is a pure function of `(dataset, filter)`: every call starts from the
//! immutable base table and allocates fresh outputs, so identical inputs always
//! produce identical views and concurrent callers need no coordination.

pub mod aggregate;
pub mod filter;

use tracing::trace;

use crate::domain::{Dataset, DerivedView, FilterSpec, RawFilter};
use crate::error::InvalidFilterError;

/// Narrow the dataset with `spec` and recompute every dashboard output.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> DerivedView {
    let rows = filter::select(dataset.records(), spec);
    let kpis = aggregate::compute_kpis(&rows);
    let sales_by_date = aggregate::sales_by_date(&rows);
    let sales_by_category = aggregate::sales_by_category(&rows);
    let sales_by_region = aggregate::sales_by_region(&rows, kpis.total_sales);

    trace!(
        base = dataset.len(),
        selected = rows.len(),
        dates = sales_by_date.len(),
        "applied filter"
    );

    DerivedView {
        filter: spec.clone(),
        kpis,
        sales_by_date,
        sales_by_category,
        sales_by_region,
        rows,
    }
}

/// Resolve user-entered filter text, then `apply` it.
pub fn apply_raw(dataset: &Dataset, raw: &RawFilter) -> Result<DerivedView, InvalidFilterError> {
    let spec = raw.resolve()?;
    Ok(apply(dataset, &spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use crate::domain::SalesRecord;
    use crate::io::ingest::load_from_reader;

    fn example_dataset() -> Dataset {
        let csv = concat!(
            "Date,Product,Category,Region,Quantity,Total Price\n",
            "2024-01-01,Widget,A,East,2,20.0\n",
            "2024-01-02,Gadget,B,West,1,15.0\n",
            "invalid-date,Gizmo,A,East,3,30.0\n",
        );
        load_from_reader(csv.as_bytes()).unwrap().dataset
    }

    #[test]
    fn worked_example() {
        let ds = example_dataset();
        assert_eq!(ds.len(), 2);

        let spec = FilterSpec {
            category: Some("A".to_string()),
            ..FilterSpec::default()
        };
        let view = apply(&ds, &spec);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.kpis.total_sales, Decimal::new(20, 0));
        assert_eq!(view.kpis.total_quantity, 2);
        assert_eq!(view.kpis.avg_sales, Some(Decimal::new(20, 0)));
    }

    #[test]
    fn no_constraints_returns_everything() {
        let ds = example_dataset();
        let view = apply(&ds, &FilterSpec::default());
        assert_eq!(view.rows.as_slice(), ds.records());
        assert_eq!(view.kpis.total_sales, Decimal::new(35, 0));
        assert_eq!(view.kpis.avg_sales, Some(Decimal::new(175, 1)));
        assert_eq!(view.kpis.total_quantity, 3);
    }

    #[test]
    fn empty_selection_is_a_valid_view() {
        let ds = example_dataset();
        let spec = FilterSpec {
            region: Some("Nowhere".to_string()),
            ..FilterSpec::default()
        };
        let view = apply(&ds, &spec);
        assert!(view.rows.is_empty());
        assert_eq!(view.kpis.total_sales, Decimal::ZERO);
        assert_eq!(view.kpis.avg_sales, None);
        assert!(view.sales_by_date.is_empty());
        assert!(view.sales_by_category.is_empty());
        assert!(view.sales_by_region.is_empty());
    }

    #[test]
    fn oversized_totals_do_not_panic() {
        let csv = concat!(
            "Date,Product,Category,Region,Quantity,Total Price\n",
            "2024-01-01,Yacht,A,East,1,50000000000000000000000000000\n",
            "2024-01-01,Yacht,A,East,1,50000000000000000000000000000\n",
        );
        let ds = load_from_reader(csv.as_bytes()).unwrap().dataset;
        let view = apply(&ds, &FilterSpec::default());
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.kpis.total_sales, Decimal::MAX);
        assert_eq!(view.sales_by_date[0].total, Decimal::MAX);
    }

    #[test]
    fn apply_raw_rejects_bad_dates() {
        let ds = example_dataset();
        let raw = RawFilter {
            start_date: Some("13/13/2024".to_string()),
            ..RawFilter::default()
        };
        let err = apply_raw(&ds, &raw).unwrap_err();
        assert_eq!(err.field, "start date");
    }

    #[test]
    fn apply_raw_matches_apply() {
        let ds = example_dataset();
        let raw = RawFilter {
            start_date: Some("2024-01-02".to_string()),
            ..RawFilter::default()
        };
        let view = apply_raw(&ds, &raw).unwrap();
        assert_eq!(view, apply(&ds, &raw.resolve().unwrap()));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].product, "Gadget");
    }

    const CATEGORIES: [&str; 3] = ["A", "B", "Unknown Category"];
    const REGIONS: [&str; 3] = ["East", "West", "North"];

    fn arb_record() -> impl Strategy<Value = SalesRecord> {
        (
            0u32..60,
            0usize..CATEGORIES.len(),
            proptest::option::weighted(0.9, 0usize..REGIONS.len()),
            proptest::option::weighted(0.9, 0u64..50),
            proptest::option::weighted(0.9, 0i64..1_000_000),
        )
            .prop_map(|(offset, cat, region, quantity, cents)| SalesRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset as u64),
                product: format!("P{offset}"),
                category: CATEGORIES[cat].to_string(),
                region: region.map(|i| REGIONS[i].to_string()),
                quantity,
                total_price: cents.map(|c| Decimal::new(c, 2)),
            })
    }

    fn arb_spec() -> impl Strategy<Value = FilterSpec> {
        (
            proptest::option::of(0u64..60),
            proptest::option::of(0u64..60),
            proptest::option::of(0usize..CATEGORIES.len()),
            proptest::option::of(0usize..REGIONS.len()),
        )
            .prop_map(|(start, end, cat, region)| {
                let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
                FilterSpec {
                    start_date: start.map(|d| base + chrono::Days::new(d)),
                    end_date: end.map(|d| base + chrono::Days::new(d)),
                    category: cat.map(|i| CATEGORIES[i].to_string()),
                    region: region.map(|i| REGIONS[i].to_string()),
                }
            })
    }

    proptest! {
        #[test]
        fn selection_is_an_ordered_subset(records in prop::collection::vec(arb_record(), 0..80), spec in arb_spec()) {
            let ds = Dataset::new(records);
            let view = apply(&ds, &spec);

            let mut it = ds.records().iter();
            for row in &view.rows {
                prop_assert!(filter::matches(&spec, row));
                prop_assert!(it.any(|r| r == row));
            }
            let expected = ds.records().iter().filter(|r| filter::matches(&spec, r)).count();
            prop_assert_eq!(view.rows.len(), expected);
        }

        #[test]
        fn totals_are_exact_sums(records in prop::collection::vec(arb_record(), 0..80), spec in arb_spec()) {
            let ds = Dataset::new(records);
            let view = apply(&ds, &spec);

            let sales: Decimal = view.rows.iter().filter_map(|r| r.total_price).sum();
            let quantity: u64 = view.rows.iter().filter_map(|r| r.quantity).sum();
            prop_assert_eq!(view.kpis.total_sales, sales);
            prop_assert_eq!(view.kpis.total_quantity, quantity);

            let by_date: Decimal = view.sales_by_date.iter().map(|d| d.total).sum();
            let by_category: Decimal = view.sales_by_category.iter().map(|c| c.total).sum();
            let by_region: Decimal = view.sales_by_region.iter().map(|r| r.total).sum();
            prop_assert_eq!(by_date, sales);
            prop_assert_eq!(by_category, sales);
            prop_assert_eq!(by_region, sales);

            prop_assert!(view.sales_by_date.windows(2).all(|w| w[0].date < w[1].date));
        }

        #[test]
        fn region_shares_sum_to_one(records in prop::collection::vec(arb_record(), 1..80)) {
            let ds = Dataset::new(records);
            let view = apply(&ds, &FilterSpec::default());
            if !view.kpis.total_sales.is_zero() {
                let shares: f64 = view.sales_by_region.iter().filter_map(|r| r.share).sum();
                assert_relative_eq!(shares, 1.0, epsilon = 1e-9);
            }
        }

        #[test]
        fn inverted_date_bounds_are_empty(records in prop::collection::vec(arb_record(), 0..80), a in 0u64..60, gap in 1u64..10) {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let spec = FilterSpec {
                start_date: Some(base + chrono::Days::new(a + gap)),
                end_date: Some(base + chrono::Days::new(a)),
                ..FilterSpec::default()
            };
            let view = apply(&Dataset::new(records), &spec);
            prop_assert!(view.rows.is_empty());
            prop_assert_eq!(view.kpis.total_sales, Decimal::ZERO);
        }

        #[test]
        fn apply_is_idempotent(records in prop::collection::vec(arb_record(), 0..80), spec in arb_spec()) {
            let ds = Dataset::new(records);
            prop_assert_eq!(apply(&ds, &spec), apply(&ds, &spec));
        }
    }
}
