//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::warn;

use crate::models::{Indicator, Period};
use crate::sync::SyncCommand;

use super::app::{App, Focus, Mode};

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),
    /// Request to quit the application.
    Quit,
}

/// Spawns a task that forwards terminal events to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let message = match event {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Message::Input(Event::Key(key))
                }
                Ok(CrosstermEvent::Resize(w, h)) => Message::Input(Event::Resize(w, h)),
                Ok(_) => continue,
                Err(e) => {
                    warn!("Terminal event stream failed: {e}");
                    Message::Quit
                }
            };
            if tx.send(message).is_err() {
                break;
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Actions that must be forwarded to the sync loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectSymbol { symbol: String, name: String },
    SetPeriod(Period),
    ToggleIndicator(Indicator),
    Refresh,
}

impl From<Action> for SyncCommand {
    fn from(action: Action) -> Self {
        match action {
            Action::SelectSymbol { symbol, name } => SyncCommand::SelectSymbol { symbol, name },
            Action::SetPeriod(period) => SyncCommand::SetPeriod(period),
            Action::ToggleIndicator(indicator) => SyncCommand::ToggleIndicator(indicator),
            Action::Refresh => SyncCommand::RefreshNow,
        }
    }
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) -> Option<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::Quit => {
            app.should_quit = true;
            None
        }
    }
}

fn handle_input(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => None,
        Event::Tick => {
            app.clear_stale_errors();
            None
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Search => handle_search_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        KeyCode::Char('/') => {
            app.mode = Mode::Search;
            app.focus = Focus::QuoteList;
            None
        }
        KeyCode::Esc => {
            app.search.clear();
            app.list_index = 0;
            None
        }
        KeyCode::Tab => {
            app.focus.toggle();
            None
        }

        // Quote list
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_highlight(1);
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_highlight(-1);
            None
        }
        KeyCode::Enter => app.highlighted_quote().map(|q| Action::SelectSymbol {
            symbol: q.symbol,
            name: q.name,
        }),
        KeyCode::Char('s') => {
            app.cycle_sort();
            None
        }

        // Chart cursor
        KeyCode::Char('h') | KeyCode::Left => {
            app.move_cursor(-1);
            None
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.move_cursor(1);
            None
        }

        // Period shortcuts
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            Period::ALL.get(index).copied().map(Action::SetPeriod)
        }

        // Indicators
        KeyCode::Char('m') => Some(Action::ToggleIndicator(Indicator::MovingAverage)),
        KeyCode::Char('v') => Some(Action::ToggleIndicator(Indicator::Volume)),

        KeyCode::Char('r') => Some(Action::Refresh),

        _ => None,
    }
}

/// Handles keys while typing a search query. The filter applies live.
fn handle_search_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => {
            app.mode = Mode::Normal;
            None
        }
        KeyCode::Esc => {
            app.search.clear();
            app.mode = Mode::Normal;
            app.list_index = 0;
            None
        }
        KeyCode::Char(c) => {
            app.search.insert(c);
            app.list_index = 0;
            None
        }
        KeyCode::Backspace => {
            app.search.backspace();
            app.list_index = 0;
            None
        }
        KeyCode::Delete => {
            app.search.delete();
            app.list_index = 0;
            None
        }
        KeyCode::Left => {
            app.search.move_left();
            None
        }
        KeyCode::Right => {
            app.search.move_right();
            None
        }
        KeyCode::Home => {
            app.search.move_home();
            None
        }
        KeyCode::End => {
            app.search.move_end();
            None
        }
        KeyCode::Down => {
            app.move_highlight(1);
            None
        }
        KeyCode::Up => {
            app.move_highlight(-1);
            None
        }
        _ => None,
    }
}
