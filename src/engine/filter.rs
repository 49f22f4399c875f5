//! Row selection.

use crate::domain::{FilterSpec, SalesRecord};

/// Whether a record satisfies every present constraint.
///
/// Date bounds are inclusive and independent; category and region are exact,
/// case-sensitive matches. A record without a region never matches a region
/// constraint.
pub fn matches(spec: &FilterSpec, record: &SalesRecord) -> bool {
    if let Some(start) = spec.start_date {
        if record.date < start {
            return false;
        }
    }
    if let Some(end) = spec.end_date {
        if record.date > end {
            return false;
        }
    }
    if let Some(category) = spec.category.as_deref() {
        if record.category != category {
            return false;
        }
    }
    if let Some(region) = spec.region.as_deref() {
        if record.region.as_deref() != Some(region) {
            return false;
        }
    }
    true
}

/// Copy out the matching records, preserving dataset order.
pub fn select(records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
    if spec.is_unconstrained() {
        return records.to_vec();
    }
    records.iter().filter(|r| matches(spec, r)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn rec(day: u32, category: &str, region: Option<&str>) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            product: "P".to_string(),
            category: category.to_string(),
            region: region.map(str::to_string),
            quantity: Some(1),
            total_price: Some(Decimal::ONE),
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, d)
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let records = vec![rec(1, "A", None), rec(2, "A", None), rec(3, "A", None)];
        let spec = FilterSpec {
            start_date: day(2),
            end_date: day(3),
            ..FilterSpec::default()
        };
        let out = select(&records, &spec);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, day(2).unwrap());
    }

    #[test]
    fn inverted_bounds_select_nothing() {
        let records = vec![rec(1, "A", None), rec(2, "A", None), rec(3, "A", None)];
        let spec = FilterSpec {
            start_date: day(3),
            end_date: day(1),
            ..FilterSpec::default()
        };
        assert!(select(&records, &spec).is_empty());
    }

    #[test]
    fn category_match_is_exact_and_case_sensitive() {
        let records = vec![rec(1, "Toys", None), rec(2, "toys", None), rec(3, "Toys & Games", None)];
        let spec = FilterSpec {
            category: Some("Toys".to_string()),
            ..FilterSpec::default()
        };
        let out = select(&records, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, day(1).unwrap());
    }

    #[test]
    fn missing_region_never_matches_a_region_filter() {
        let records = vec![rec(1, "A", Some("East")), rec(2, "A", None)];
        let spec = FilterSpec {
            region: Some("East".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(select(&records, &spec).len(), 1);
        assert_eq!(select(&records, &FilterSpec::default()).len(), 2);
    }
}
