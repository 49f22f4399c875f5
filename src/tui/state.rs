//! Dashboard state and key handling, independent of the terminal.
//!
//! The filter panel holds *pending* inputs; nothing is recomputed until the
//! user applies them, at which point a fresh view is built from the session's
//! base table.

use crossterm::event::KeyCode;

use crate::app::pipeline::Session;
use crate::domain::{DerivedView, FilterSpec, RawFilter};
use crate::engine;

pub const ALL: &str = "All";

/// Filter panel rows, top to bottom.
pub const FIELD_LABELS: [&str; 4] = ["Start date", "End date", "Category", "Region"];

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_CATEGORY: usize = 2;
const FIELD_REGION: usize = 3;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
    Export,
}

pub struct DashboardState {
    pub session: Session,
    categories: Vec<String>,
    regions: Vec<String>,
    default_start: String,
    default_end: String,

    start_input: String,
    end_input: String,
    /// 0 = all, otherwise 1-based into `categories`.
    category_idx: usize,
    /// 0 = all, otherwise 1-based into `regions`.
    region_idx: usize,

    pub selected: usize,
    /// Text of the field being edited before editing began (for Esc).
    editing: Option<String>,
    pub pending: bool,

    pub view: DerivedView,
    pub table_offset: usize,
    pub status: String,
}

impl DashboardState {
    pub fn new(session: Session, initial: RawFilter) -> Self {
        let dataset = &session.loaded.dataset;
        let mut categories: Vec<String> = dataset.categories().into_iter().map(str::to_string).collect();
        let mut regions: Vec<String> = dataset.regions().into_iter().map(str::to_string).collect();
        let (default_start, default_end) = dataset
            .date_range()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .unwrap_or_default();

        let category_idx = choice_index(&mut categories, initial.category.as_deref());
        let region_idx = choice_index(&mut regions, initial.region.as_deref());

        let view = engine::apply(dataset, &FilterSpec::default());
        let mut state = Self {
            session,
            categories,
            regions,
            start_input: initial.start_date.unwrap_or_else(|| default_start.clone()),
            end_input: initial.end_date.unwrap_or_else(|| default_end.clone()),
            default_start,
            default_end,
            category_idx,
            region_idx,
            selected: 0,
            editing: None,
            pending: false,
            view,
            table_offset: 0,
            status: String::new(),
        };
        state.apply();
        state
    }

    pub fn raw_filter(&self) -> RawFilter {
        RawFilter {
            start_date: Some(self.start_input.clone()),
            end_date: Some(self.end_input.clone()),
            category: self.category().map(str::to_string),
            region: self.region().map(str::to_string),
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category_idx
            .checked_sub(1)
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
    }

    pub fn region(&self) -> Option<&str> {
        self.region_idx
            .checked_sub(1)
            .and_then(|i| self.regions.get(i))
            .map(String::as_str)
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Display value for each filter panel row.
    pub fn field_values(&self) -> [String; 4] {
        [
            blank_as_any(&self.start_input),
            blank_as_any(&self.end_input),
            self.category().unwrap_or(ALL).to_string(),
            self.region().unwrap_or(ALL).to_string(),
        ]
    }

    /// Recompute the view from the pending inputs. On invalid input the previous
    /// view stays and the error goes to the status line.
    pub fn apply(&mut self) -> bool {
        match engine::apply_raw(&self.session.loaded.dataset, &self.raw_filter()) {
            Ok(view) => {
                self.status = format!("{} of {} row(s) match.", view.rows.len(), self.session.loaded.dataset.len());
                self.view = view;
                self.table_offset = 0;
                self.pending = false;
                true
            }
            Err(err) => {
                self.status = format!("Filter not applied: {err}");
                false
            }
        }
    }

    /// Reset every input to its default and apply.
    pub fn clear(&mut self) {
        self.start_input = self.default_start.clone();
        self.end_input = self.default_end.clone();
        self.category_idx = 0;
        self.region_idx = 0;
        self.editing = None;
        self.apply();
    }

    pub fn handle_key(&mut self, code: KeyCode) -> KeyOutcome {
        if self.editing.is_some() {
            self.handle_edit_key(code);
            return KeyOutcome::Continue;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Char('e') => return KeyOutcome::Export,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(FIELD_LABELS.len() - 1),
            KeyCode::Left => self.cycle(false),
            KeyCode::Right => self.cycle(true),
            KeyCode::Enter if matches!(self.selected, FIELD_START | FIELD_END) => {
                self.editing = Some(self.date_input_mut().clone());
                self.status = "Editing date (YYYY-MM-DD). Enter to keep, Esc to cancel.".to_string();
            }
            KeyCode::Enter | KeyCode::Char('a') => {
                self.apply();
            }
            KeyCode::Char('c') => self.clear(),
            KeyCode::PageDown | KeyCode::Char('j') => self.scroll(10),
            KeyCode::PageUp | KeyCode::Char('k') => self.table_offset = self.table_offset.saturating_sub(10),
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                if let Some(before) = self.editing.take() {
                    *self.date_input_mut() = before;
                }
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                self.pending = true;
                self.status = "Press a to apply filters.".to_string();
            }
            KeyCode::Backspace => {
                self.date_input_mut().pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == '/' => {
                self.date_input_mut().push(c);
            }
            _ => {}
        }
    }

    fn date_input_mut(&mut self) -> &mut String {
        if self.selected == FIELD_END {
            &mut self.end_input
        } else {
            &mut self.start_input
        }
    }

    fn cycle(&mut self, forward: bool) {
        let (idx, len) = match self.selected {
            FIELD_CATEGORY => (&mut self.category_idx, self.categories.len()),
            FIELD_REGION => (&mut self.region_idx, self.regions.len()),
            _ => return,
        };
        // Choices are "All" plus every known value.
        let n = len + 1;
        *idx = if forward { (*idx + 1) % n } else { (*idx + n - 1) % n };
        self.pending = true;
    }

    fn scroll(&mut self, by: usize) {
        let max = self.view.rows.len().saturating_sub(1);
        self.table_offset = (self.table_offset + by).min(max);
    }
}

/// 1-based index of `wanted` in `choices`, adding it if absent; 0 for none.
fn choice_index(choices: &mut Vec<String>, wanted: Option<&str>) -> usize {
    let Some(wanted) = wanted.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    match choices.iter().position(|c| c == wanted) {
        Some(i) => i + 1,
        None => {
            choices.push(wanted.to_string());
            choices.len()
        }
    }
}

fn blank_as_any(s: &str) -> String {
    if s.trim().is_empty() { "any".to_string() } else { s.to_string() }
}
