//! KPI and grouped-total computation over a filtered subsequence.
//!
//! Missing amounts are skipped by every sum and by the mean, so a row with an
//! empty `Total Price` still counts as an order but contributes no sales.
//!
//! Money sums clamp at `Decimal::MAX` (with a warning) rather than overflow.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

use crate::domain::{CategoryTotal, DateTotal, Kpis, RegionShare, SalesRecord};

pub fn compute_kpis(rows: &[SalesRecord]) -> Kpis {
    let prices: Vec<Decimal> = rows.iter().filter_map(|r| r.total_price).collect();
    let total_sales = prices.iter().copied().fold(Decimal::ZERO, add_money);

    // Mean over known prices only; an empty set is "no data", not zero.
    let avg_sales = if prices.is_empty() {
        None
    } else {
        total_sales.checked_div(Decimal::from(prices.len()))
    };

    let total_quantity = rows
        .iter()
        .filter_map(|r| r.quantity)
        .fold(0u64, u64::saturating_add);

    Kpis {
        total_sales,
        avg_sales,
        total_quantity,
        order_count: rows.len(),
    }
}

/// Sales per distinct date, ascending.
pub fn sales_by_date(rows: &[SalesRecord]) -> Vec<DateTotal> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for r in rows {
        let total = by_date.entry(r.date).or_default();
        *total = add_money(*total, r.total_price.unwrap_or_default());
    }
    by_date
        .into_iter()
        .map(|(date, total)| DateTotal { date, total })
        .collect()
}

/// Sales per distinct category, in first-seen order.
pub fn sales_by_category(rows: &[SalesRecord]) -> Vec<CategoryTotal> {
    let mut by_category: IndexMap<&str, Decimal> = IndexMap::new();
    for r in rows {
        let total = by_category.entry(r.category.as_str()).or_default();
        *total = add_money(*total, r.total_price.unwrap_or_default());
    }
    by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// Sales per distinct region (records without a region grouped together),
/// in first-seen order, with each group's share of `grand_total`.
pub fn sales_by_region(rows: &[SalesRecord], grand_total: Decimal) -> Vec<RegionShare> {
    let mut by_region: IndexMap<Option<&str>, Decimal> = IndexMap::new();
    for r in rows {
        let total = by_region.entry(r.region.as_deref()).or_default();
        *total = add_money(*total, r.total_price.unwrap_or_default());
    }
    by_region
        .into_iter()
        .map(|(region, total)| RegionShare {
            region: region.map(str::to_string),
            total,
            share: share_of(total, grand_total),
        })
        .collect()
}

fn add_money(acc: Decimal, amount: Decimal) -> Decimal {
    acc.checked_add(amount).unwrap_or_else(|| {
        warn!(%acc, %amount, "sales total overflowed; clamping");
        if amount.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
    })
}

fn share_of(part: Decimal, whole: Decimal) -> Option<f64> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole).and_then(|r| r.to_f64())
}
