//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::store::LoadState;

use super::app::App;
use super::components::{period_bar, status_bar};
use super::panels::{chart, order_book, quote_list, summary};

const KEY_HELP: &str =
    "[/]search [j/k]move [Enter]select [1-6]period [m]MA [v]VOL [h/l]cursor [s]sort [r]refresh [Tab]focus [q]quit";

/// Renders the entire application UI.
///
/// A full-page placeholder is shown only while nothing at all has loaded;
/// after that, failures surface in the status bar over stale data.
pub fn render(frame: &mut Frame, app: &App) {
    match app.view.load_state() {
        LoadState::NoData | LoadState::Loading => render_placeholder(
            frame,
            app,
            Line::from(Span::styled(
                "正在加载行情数据...",
                Style::default().fg(Color::Yellow),
            )),
        ),
        LoadState::ErrorWithNoData(failure) => render_placeholder(
            frame,
            app,
            Line::from(vec![
                Span::styled(
                    "数据加载失败: ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw(failure.message),
                Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
            ]),
        ),
        LoadState::Ready | LoadState::ReadyWithStaleData(_) => render_dashboard(frame, app),
    }
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Summary header
            Constraint::Length(1), // Period and indicator bar
            Constraint::Min(10),   // Chart | book + quotes
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Keybindings help
        ])
        .split(area);

    summary::render(frame, main_layout[0], app);
    period_bar::render(frame, main_layout[1], app);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_layout[2]);

    chart::render(frame, content[0], app);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(15), Constraint::Min(6)])
        .split(content[1]);

    order_book::render(frame, side[0], app);
    quote_list::render(frame, side[1], app);

    status_bar::render(frame, main_layout[3], app);
    render_keybindings(frame, main_layout[4]);
}

fn render_placeholder(frame: &mut Frame, app: &App, message: Line) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .title(" 行情 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    let para = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(para, centered_row(inner));

    status_bar::render(frame, layout[1], app);
    render_keybindings(frame, layout[2]);
}

/// A one-row strip in the vertical middle of `area`.
fn centered_row(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}

fn render_keybindings(frame: &mut Frame, area: Rect) {
    let para = Paragraph::new(KEY_HELP).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}
