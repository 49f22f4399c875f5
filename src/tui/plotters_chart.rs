//! Plotters-powered sales-over-time widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// Series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct SalesPlottersChart<'a> {
    /// Daily totals as `(days since origin, total)`.
    pub series: &'a [(f64, f64)],
    /// Date of x = 0.
    pub origin: NaiveDate,
    /// X bounds (days since origin).
    pub x_bounds: [f64; 2],
    /// Y bounds (sales).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for SalesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let origin = self.origin;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc("sales")
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day(origin, *v))
                .y_label_formatter(&|v| fmt_sales(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            chart.draw_series(LineSeries::new(self.series.iter().copied(), &line_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a pixel reads fine.
            chart.draw_series(self.series.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Date label for a day offset from `origin`.
pub fn fmt_day(origin: NaiveDate, days: f64) -> String {
    origin
        .checked_add_signed(chrono::Duration::days(days.round() as i64))
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

pub fn fmt_sales(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}
