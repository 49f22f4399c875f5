//! Formatted terminal output: run header, KPI cards, grouped totals, row table.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized (the TUI reuses the same number formatting)

use rust_decimal::Decimal;

use crate::domain::{CategoryTotal, DerivedView, FilterSpec, Kpis, RegionShare, SalesRecord};
use crate::io::ingest::LoadedDataset;

/// Format the run header (source + load stats + active filter).
pub fn format_run_summary(source: &str, loaded: &LoadedDataset, filter: &FilterSpec) -> String {
    let mut out = String::new();

    out.push_str("=== salesdash - Sales Data Dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={}\n",
        loaded.rows_read,
        loaded.rows_used,
        loaded.rows_dropped()
    ));
    if let Some((min, max)) = loaded.dataset.date_range() {
        out.push_str(&format!("Dates: [{min}, {max}]\n"));
    }
    out.push_str(&format!("Filter: {}\n", describe_filter(filter)));

    let issues = loaded.row_issues.len();
    if issues > 0 {
        out.push_str(&format!("Row issues: {issues}\n"));
        for issue in loaded.row_issues.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", issue.line, issue.message));
        }
        if issues > 5 {
            out.push_str(&format!("  ... and {} more\n", issues - 5));
        }
    }

    out
}

/// One-line description of the active constraints (`*` = unconstrained).
pub fn describe_filter(filter: &FilterSpec) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "*".to_string());
    format!(
        "date=[{}, {}] category={} region={}",
        date(filter.start_date),
        date(filter.end_date),
        filter.category.as_deref().unwrap_or("*"),
        filter.region.as_deref().unwrap_or("*"),
    )
}

/// Format the three KPI cards as aligned lines.
pub fn format_kpis(kpis: &Kpis) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24} {:>14}\n", "Total Sales", fmt_money(kpis.total_sales)));
    out.push_str(&format!("{:<24} {:>14}\n", "Average Sales per Order", fmt_avg(kpis.avg_sales)));
    out.push_str(&format!("{:<24} {:>14}\n", "Total Quantity Sold", kpis.total_quantity));
    out.push_str(&format!("{:<24} {:>14}\n", "Orders", kpis.order_count));
    out
}

/// Format every section of a view for `summary`.
pub fn format_view(view: &DerivedView, bar_width: usize, table_rows: usize) -> String {
    let mut out = String::new();

    out.push_str("\nKPIs:\n");
    out.push_str(&format_kpis(&view.kpis));

    out.push_str("\nSales by Category:\n");
    out.push_str(&format_category_bars(&view.sales_by_category, bar_width));

    out.push_str("\nSales Proportion by Region:\n");
    out.push_str(&format_region_shares(&view.sales_by_region, bar_width));

    if table_rows > 0 {
        out.push_str(&format!(
            "\nSales Transactions (showing {} of {}):\n",
            table_rows.min(view.rows.len()),
            view.rows.len()
        ));
        out.push_str(&format_rows_table(&view.rows, table_rows));
    }

    out
}

/// Horizontal bars scaled to the largest category total.
pub fn format_category_bars(categories: &[CategoryTotal], width: usize) -> String {
    if categories.is_empty() {
        return "  (no data)\n".to_string();
    }
    let max = categories.iter().map(|c| c.total).max().unwrap_or_default();

    let mut out = String::new();
    for c in categories {
        let bar = bar(ratio(c.total, max), width);
        out.push_str(
            format!("{:<20} {:>14} {bar}\n", truncate(&c.category, 20), fmt_money(c.total)).trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Horizontal bars scaled to 100% of the filtered total.
pub fn format_region_shares(regions: &[RegionShare], width: usize) -> String {
    if regions.is_empty() {
        return "  (no data)\n".to_string();
    }

    let mut out = String::new();
    for r in regions {
        let share = r.share.unwrap_or(0.0);
        out.push_str(
            format!(
                "{:<20} {:>14} {:>7} {}\n",
                truncate(r.label(), 20),
                fmt_money(r.total),
                fmt_share(r.share),
                bar(share, width)
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// The raw-data table (first `limit` rows).
pub fn format_rows_table(rows: &[SalesRecord], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:<20} {:<16} {:<10} {:>8} {:>12}\n",
            "date", "product", "category", "region", "qty", "total"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<10} {:-<20} {:-<16} {:-<10} {:->8} {:->12}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows.iter().take(limit) {
        out.push_str(
            format!(
                "{:<10} {:<20} {:<16} {:<10} {:>8} {:>12}\n",
                r.date,
                truncate(&r.product, 20),
                truncate(&r.category, 16),
                truncate(r.region.as_deref().unwrap_or(""), 10),
                r.quantity.map(|q| q.to_string()).unwrap_or_default(),
                r.total_price.map(fmt_money).unwrap_or_default(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

pub fn fmt_money(v: Decimal) -> String {
    format!("{:.2}", v.round_dp(2))
}

/// Average card text; "no data" stands in for the mean of nothing.
pub fn fmt_avg(v: Option<Decimal>) -> String {
    v.map(fmt_money).unwrap_or_else(|| "no data".to_string())
}

pub fn fmt_share(v: Option<f64>) -> String {
    match v {
        Some(s) if s.is_finite() => format!("{:.1}%", s * 100.0),
        _ => "-".to_string(),
    }
}

fn ratio(part: Decimal, whole: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    (part / whole).to_f64().unwrap_or(0.0)
}

fn bar(fraction: f64, width: usize) -> String {
    let cells = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    "#".repeat(cells)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apply;
    use crate::io::ingest::load_from_reader;

    fn loaded() -> LoadedDataset {
        let csv = concat!(
            "Date,Product,Category,Region,Quantity,Total Price\n",
            "2024-01-01,Widget,A,East,2,30.0\n",
            "2024-01-02,Gadget,B,West,1,10.0\n",
            "invalid-date,Gizmo,A,East,3,30.0\n",
        );
        load_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn kpis_render_no_data_for_empty_average() {
        let kpis = Kpis {
            total_sales: Decimal::ZERO,
            avg_sales: None,
            total_quantity: 0,
            order_count: 0,
        };
        let txt = format_kpis(&kpis);
        assert!(txt.starts_with(&format!("{:<24} {:>14}\n", "Total Sales", "0.00")));
        assert!(txt.contains("no data"));
    }

    #[test]
    fn run_summary_lists_dropped_rows() {
        let loaded = loaded();
        let txt = format_run_summary("sales.csv", &loaded, &FilterSpec::default());
        assert!(txt.contains("Rows: read=3 | used=2 | dropped=1\n"));
        assert!(txt.contains("Dates: [2024-01-01, 2024-01-02]\n"));
        assert!(txt.contains("line 4: Invalid `Date` 'invalid-date'."));
        assert!(txt.contains("Filter: date=[*, *] category=* region=*\n"));
    }

    #[test]
    fn category_and_region_bars() {
        let loaded = loaded();
        let view = apply(&loaded.dataset, &FilterSpec::default());

        let cats = format_category_bars(&view.sales_by_category, 4);
        assert_eq!(
            cats,
            concat!(
                "A                             30.00 ####\n",
                "B                             10.00 #\n",
            )
        );

        let regions = format_region_shares(&view.sales_by_region, 4);
        assert_eq!(
            regions,
            concat!(
                "East                          30.00   75.0% ###\n",
                "West                          10.00   25.0% #\n",
            )
        );
    }

    #[test]
    fn empty_groups_say_no_data() {
        assert_eq!(format_category_bars(&[], 10), "  (no data)\n");
        assert_eq!(format_region_shares(&[], 10), "  (no data)\n");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Electronics", 6), "Elect.");
        assert_eq!(truncate("Toys", 6), "Toys");
    }
}
