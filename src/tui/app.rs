//! Application state for the TUI.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use crate::chart::{ChartSpec, build_chart};
use crate::display::{SortColumn, filter_quotes, sort_quotes};
use crate::models::ticker::Quote;
use crate::store::ViewState;

use super::input::TextInput;

/// How long a local error message stays in the status bar.
const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Central application state container.
///
/// Market data lives in [`ViewState`] snapshots received from the sync
/// loop; everything else here is local UI state.
pub struct App {
    // -- Synced State --
    /// Latest snapshot published by the sync loop.
    pub view: ViewState,
    /// Chart derived from `view`, rebuilt whenever a new snapshot arrives.
    pub chart: ChartSpec,
    /// Moving-average windows drawn on the chart.
    pub ma_windows: Vec<usize>,

    // -- UI State --
    /// Panel receiving navigation keys.
    pub focus: Focus,
    /// Current input mode.
    pub mode: Mode,
    /// Quote search box.
    pub search: TextInput,
    /// Highlighted row in the filtered, sorted quote list.
    pub list_index: usize,
    /// Quote list sort column.
    pub sort: SortColumn,
    /// Candle index under the chart cursor; `None` follows the newest.
    pub chart_cursor: Option<usize>,
    /// Local error message (clears after timeout).
    pub error_message: Option<ErrorDisplay>,

    // -- Internal --
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates the app around the sync loop's initial snapshot.
    pub fn new(view: ViewState, ma_windows: Vec<usize>) -> Self {
        let chart = chart_for(&view, &ma_windows);
        Self {
            view,
            chart,
            ma_windows,
            focus: Focus::default(),
            mode: Mode::default(),
            search: TextInput::new(),
            list_index: 0,
            sort: SortColumn::default(),
            chart_cursor: None,
            error_message: None,
            should_quit: false,
        }
    }

    /// Replaces the snapshot and rebuilds the chart.
    pub fn apply_view(&mut self, view: ViewState) {
        let selection_changed = view.selection.key() != self.view.selection.key();
        self.view = view;
        self.chart = chart_for(&self.view, &self.ma_windows);

        if selection_changed {
            self.chart_cursor = None;
        }
        self.clamp_list_index();
        self.clamp_chart_cursor();
    }

    /// Quotes after search filtering and sorting.
    pub fn visible_quotes(&self) -> Cow<'_, [Quote]> {
        let quotes = self.view.quotes.data().map_or(&[][..], Vec::as_slice);
        sort_quotes(filter_quotes(quotes, self.search.as_str()), self.sort)
    }

    /// The highlighted quote, if the list is not empty.
    pub fn highlighted_quote(&self) -> Option<Quote> {
        self.visible_quotes().get(self.list_index).cloned()
    }

    /// Moves the list highlight by `delta` rows, clamped to the list.
    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.visible_quotes().len();
        if len == 0 {
            self.list_index = 0;
            return;
        }
        self.list_index = self.list_index.saturating_add_signed(delta).min(len - 1);
    }

    /// Number of candles currently charted.
    pub fn candle_count(&self) -> usize {
        self.view.candles.data().map_or(0, Vec::len)
    }

    /// Candle index the tooltip describes.
    pub fn cursor_index(&self) -> Option<usize> {
        let len = self.candle_count();
        if len == 0 {
            return None;
        }
        Some(self.chart_cursor.unwrap_or(len - 1).min(len - 1))
    }

    /// Moves the chart cursor within the zoom window. Moving past the
    /// newest candle returns to follow mode.
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.candle_count();
        let Some(current) = self.cursor_index() else {
            return;
        };
        let visible = self.chart.zoom.visible_range(len);
        let next = current.saturating_add_signed(delta).max(visible.start);
        self.chart_cursor = if next >= len - 1 { None } else { Some(next) };
    }

    /// Cycles the quote list sort column.
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.list_index = 0;
    }

    /// Shows a local error in the status bar.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(ErrorDisplay {
            message: message.into(),
            timestamp: Instant::now(),
        });
    }

    /// Clears the local error once it has been shown long enough.
    pub fn clear_stale_errors(&mut self) {
        if let Some(ref error) = self.error_message
            && error.timestamp.elapsed() > ERROR_DISPLAY_DURATION
        {
            self.error_message = None;
        }
    }

    fn clamp_list_index(&mut self) {
        let len = self.visible_quotes().len();
        self.list_index = self.list_index.min(len.saturating_sub(1));
    }

    fn clamp_chart_cursor(&mut self) {
        let len = self.candle_count();
        if let Some(cursor) = self.chart_cursor
            && cursor + 1 >= len
        {
            self.chart_cursor = None;
        }
    }
}

fn chart_for(view: &ViewState, windows: &[usize]) -> ChartSpec {
    let candles = view.candles.data().map_or(&[][..], Vec::as_slice);
    build_chart(
        candles,
        view.selection.indicators,
        windows,
        view.selection.period,
    )
}

/// UI focus targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    QuoteList,
    Chart,
}

impl Focus {
    pub fn toggle(&mut self) {
        *self = match self {
            Focus::QuoteList => Focus::Chart,
            Focus::Chart => Focus::QuoteList,
        };
    }
}

/// Input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into the quote search box.
    Search,
}

/// Error message with timestamp for auto-clear.
#[derive(Clone, Debug)]
pub struct ErrorDisplay {
    pub message: String,
    pub timestamp: Instant,
}
