//! Ratatui-based terminal UI.
//!
//! The TUI provides a filter panel (date range, category, region), then renders
//! KPI cards, the sales-over-time chart, category and region breakdowns, and the
//! filtered transactions.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Terminal,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::app::pipeline::Session;
use crate::domain::{DateTotal, RawFilter};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::report::{fmt_avg, fmt_money, truncate};

mod plotters_chart;
mod state;

use plotters_chart::SalesPlottersChart;
use state::{DashboardState, KeyOutcome, FIELD_LABELS};

/// Start the TUI on an already-loaded dataset.
pub fn run(session: Session, initial: RawFilter) -> Result<(), AppError> {
    let mut app = App {
        state: DashboardState::new(session, initial),
    };

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    state: DashboardState,
}

impl App {
    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.state.handle_key(key.code) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Export => self.export_rows(),
                        KeyOutcome::Continue => {}
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn export_rows(&mut self) {
        let path = export_path();
        let rows = &self.state.view.rows;
        match crate::io::export::write_rows_csv(&path, rows) {
            Ok(()) => {
                info!(path = %path.display(), rows = rows.len(), "exported rows");
                self.state.status = format!("Exported {} row(s) to {}", rows.len(), path.display());
            }
            Err(err) => {
                self.state.status = format!("Export failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(12),
                Constraint::Length(10),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        self.draw_filters(frame, top[0]);
        self.draw_kpis(frame, top[1]);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        self.draw_chart(frame, charts[0]);
        self.draw_breakdowns(frame, charts[1]);

        self.draw_table(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let loaded = &self.state.session.loaded;
        let line = Line::from(vec![
            Span::styled("salesdash", Style::default().fg(Color::Cyan)),
            Span::raw(" - Sales Data Dashboard | "),
            Span::styled(
                format!(
                    "{} | {} row(s) loaded, {} dropped",
                    self.state.session.source.display(),
                    loaded.rows_used,
                    loaded.rows_dropped()
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_filters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let values = self.state.field_values();
        let items: Vec<ListItem> = FIELD_LABELS
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (label, value))| {
                let cursor = if i == self.state.selected && self.state.is_editing() { "_" } else { "" };
                ListItem::new(format!("{label:<11} {value}{cursor}"))
            })
            .collect();

        let title = if self.state.pending { "Filters (pending: a to apply)" } else { "Filters" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut list_state = ratatui::widgets::ListState::default();
        list_state.select(Some(self.state.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_kpis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let kpis = &self.state.view.kpis;
        let cards = [
            ("Total Sales", fmt_money(kpis.total_sales)),
            ("Average Sales per Order", fmt_avg(kpis.avg_sales)),
            ("Total Quantity Sold", kpis.total_quantity.to_string()),
        ];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);

        for ((title, value), rect) in cards.into_iter().zip(cols.iter()) {
            let text = Text::from(vec![
                Line::from(""),
                Line::from(Span::styled(value, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
            ]);
            let card = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(card, *rect);
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Sales Over Time").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((origin, series, x_bounds, y_bounds)) = chart_series(&self.state.view.sales_by_date) else {
            let msg = Paragraph::new("No rows match the current filters.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = SalesPlottersChart {
            series: &series,
            origin,
            x_bounds,
            y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_breakdowns(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.state.view;
        let region_height = (view.sales_by_region.len().max(1) as u16).saturating_add(2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(region_height)])
            .split(area);

        // ratatui bars carry integer values; whole currency units are enough here.
        let labels: Vec<String> = view.sales_by_category.iter().map(|c| truncate(&c.category, 10)).collect();
        let data: Vec<(&str, u64)> = labels
            .iter()
            .zip(&view.sales_by_category)
            .map(|(label, c)| (label.as_str(), c.total.round().to_u64().unwrap_or(0)))
            .collect();

        let n = data.len().max(1) as u16;
        let bar_width = (chunks[0].width.saturating_sub(2) / n).saturating_sub(1).clamp(3, 12);
        let bars = BarChart::default()
            .block(Block::default().title("Sales by Category").borders(Borders::ALL))
            .data(data.as_slice())
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(bars, chunks[0]);

        let bar_cells = (chunks[1].width as usize).saturating_sub(47).max(1);
        let regions = Paragraph::new(crate::report::format_region_shares(&view.sales_by_region, bar_cells))
            .block(Block::default().title("Sales by Region").borders(Borders::ALL));
        frame.render_widget(regions, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.state.view;
        let visible = area.height.saturating_sub(3) as usize;
        let rows: Vec<Row> = view
            .rows
            .iter()
            .skip(self.state.table_offset)
            .take(visible)
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.date.to_string()),
                    Cell::from(r.product.clone()),
                    Cell::from(r.category.clone()),
                    Cell::from(r.region.clone().unwrap_or_default()),
                    Cell::from(r.quantity.map(|q| q.to_string()).unwrap_or_default()),
                    Cell::from(r.total_price.map(fmt_money).unwrap_or_default()),
                ])
            })
            .collect();

        let header = Row::new(vec!["Date", "Product", "Category", "Region", "Quantity", "Total Price"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
        ];

        let shown_from = if view.rows.is_empty() { 0 } else { self.state.table_offset + 1 };
        let shown_to = (self.state.table_offset + visible).min(view.rows.len());
        let title = format!("Transactions {shown_from}-{shown_to} of {}", view.rows.len());
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.state.is_editing() {
            "type date  Backspace delete  Enter keep  Esc cancel"
        } else {
            "↑/↓ select  ←/→ cycle  Enter edit/apply  a apply  c clear  e export  PgUp/PgDn scroll  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.state.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn export_path() -> PathBuf {
    PathBuf::from(format!("salesdash_export_{}.csv", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}

/// Build the chart series: `(origin, points, x_bounds, y_bounds)`.
fn chart_series(totals: &[DateTotal]) -> Option<(chrono::NaiveDate, Vec<(f64, f64)>, [f64; 2], [f64; 2])> {
    let origin = totals.first()?.date;
    let series: Vec<(f64, f64)> = totals
        .iter()
        .map(|d| ((d.date - origin).num_days() as f64, d.total.to_f64().unwrap_or(0.0)))
        .collect();

    let x_max = series.last().map(|p| p.0).unwrap_or(0.0);
    let x_bounds = if x_max > 0.0 { [0.0, x_max] } else { [-1.0, 1.0] };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &series {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some((origin, series, x_bounds, [y_min - pad, y_max + pad]))
}
