//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily sales totals: `o`
//! - connecting line: `-`

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::DateTotal;

/// Render the sales-over-time series as a line plot.
pub fn render_sales_over_time(series: &[DateTotal], width: usize, height: usize) -> String {
    let Some(first) = series.first() else {
        return "Plot: (no data)\n".to_string();
    };
    let origin = first.date;
    let last = series.last().map(|d| d.date).unwrap_or(origin);

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|d| (day_offset(origin, d.date), d.total.to_f64().unwrap_or(0.0)))
        .collect();

    let x_axis = Axis::new(0.0, day_offset(origin, last), 0.0);
    let y_axis = Axis::spanning(points.iter().map(|p| p.1), 0.05);

    let mut canvas = Canvas::new(width.max(10), height.max(5));
    let cells: Vec<(usize, usize)> = points
        .iter()
        .map(|&(x, y)| canvas.cell(&x_axis, &y_axis, x, y))
        .collect();

    // Line first so the points overlay it.
    for pair in cells.windows(2) {
        canvas.line(pair[0], pair[1], '-');
    }
    for &cell in &cells {
        canvas.set(cell, 'o');
    }

    format!(
        "Plot: date=[{origin}, {last}] | sales=[{:.2}, {:.2}]\n{}",
        y_axis.min,
        y_axis.max,
        canvas.render()
    )
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// A value range mapped onto grid cells. Never empty.
struct Axis {
    min: f64,
    max: f64,
}

impl Axis {
    /// `[min, max]` widened by one unit when degenerate, then padded by
    /// `pad` of its span on each side.
    fn new(min: f64, max: f64, pad: f64) -> Self {
        let (min, max) = if max > min { (min, max) } else { (min - 1.0, max + 1.0) };
        let pad = if pad > 0.0 { ((max - min) * pad).max(1e-12) } else { 0.0 };
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    fn spanning(values: impl Iterator<Item = f64>, pad: f64) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min.is_finite() && max.is_finite() {
            Self::new(min, max, pad)
        } else {
            Self::new(0.0, 1.0, pad)
        }
    }

    /// Position of `v` in `0..=1`.
    fn unit(&self, v: f64) -> f64 {
        ((v - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

struct Canvas {
    width: usize,
    rows: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![' '; width]; height],
        }
    }

    /// Grid cell `(col, row)` for a data point; row 0 is the top (max y).
    fn cell(&self, x_axis: &Axis, y_axis: &Axis, x: f64, y: f64) -> (usize, usize) {
        let last_col = (self.width - 1) as f64;
        let last_row = (self.rows.len() - 1) as f64;
        let col = (x_axis.unit(x) * last_col).round() as usize;
        let row = (last_row - y_axis.unit(y) * last_row).round() as usize;
        (col, row)
    }

    fn set(&mut self, (col, row): (usize, usize), ch: char) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = ch;
        }
    }

    /// Bresenham line that only fills blank cells.
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let (mut x, mut y) = (from.0 as isize, from.1 as isize);
        let (x1, y1) = (to.0 as isize, to.1 as isize);

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let step_x = if x < x1 { 1 } else { -1 };
        let step_y = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            let blank = self
                .rows
                .get(y as usize)
                .and_then(|r| r.get(x as usize))
                .is_some_and(|&c| c == ' ');
            if x >= 0 && y >= 0 && blank {
                self.set((x as usize, y as usize), ch);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.rows.len() * (self.width + 1));
        for row in &self.rows {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn point(day: u32, total: i64) -> DateTotal {
        DateTotal {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            total: Decimal::new(total, 0),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![point(1, 100), point(10, 110)];
        let txt = render_sales_over_time(&series, 10, 5);
        let expected = concat!(
            "Plot: date=[2024-01-01, 2024-01-10] | sales=[99.50, 110.50]\n",
            "        -o\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_day_is_centered() {
        let txt = render_sales_over_time(&[point(5, 42)], 11, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Plot: date=[2024-01-05, 2024-01-05] | sales=[40.90, 43.10]");
        assert_eq!(lines[3], "     o     ");
    }

    #[test]
    fn empty_series_has_no_plot() {
        assert_eq!(render_sales_over_time(&[], 20, 5), "Plot: (no data)\n");
    }
}
