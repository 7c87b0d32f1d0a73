//! Searchable, sortable quote list.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::display::{fixed, format_percent};
use crate::models::ticker::Quote;
use crate::tui::app::{App, Focus, Mode};

use super::{border_style, change_color};

/// Display columns reserved for the name.
const NAME_WIDTH: usize = 10;

/// Renders the search box and the visible quotes.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" 市场 [sort: {}] ", app.sort.label());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::QuoteList));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    render_search(frame, rows[0], app);
    render_rows(frame, rows[1], app);
}

fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let searching = app.mode == Mode::Search;
    let line = if app.search.is_empty() && !searching {
        Line::from(Span::styled(
            "/ 搜索代码或名称",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Cyan)),
            Span::raw(app.search.as_str().to_string()),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);

    if searching {
        frame.set_cursor_position(Position::new(
            area.x + 2 + app.search.cursor_column(),
            area.y,
        ));
    }
}

fn render_rows(frame: &mut Frame, area: Rect, app: &App) {
    let quotes = app.visible_quotes();
    if quotes.is_empty() {
        let text = match app.view.quotes.error() {
            Some(failure) if app.view.quotes.data().is_none() => format!("No quotes: {failure}"),
            _ if app.search.is_empty() => "No quotes".to_string(),
            _ => "No matches".to_string(),
        };
        let para = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
        return;
    }

    let height = area.height as usize;
    // Scroll so the highlighted row stays visible.
    let offset = (app.list_index + 1).saturating_sub(height);
    let selected = &app.view.selection.symbol;

    let lines: Vec<Line> = quotes
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, quote)| quote_line(quote, i == app.list_index, &quote.symbol == selected))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn quote_line<'a>(quote: &Quote, highlighted: bool, selected: bool) -> Line<'a> {
    let marker = if selected { "*" } else { " " };
    let base = if highlighted {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let change = change_color(quote.change_percent);

    Line::from(vec![
        Span::styled(marker, base.fg(Color::Cyan)),
        Span::styled(pad_to_width(&quote.name, NAME_WIDTH), base.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {:<10}", quote.symbol), base.fg(Color::Gray)),
        Span::styled(format!("{:>10}", fixed(quote.price, 2)), base),
        Span::styled(format!("{:>9}", format_percent(quote.change_percent)), base.fg(change)),
    ])
}

/// Truncates or pads `text` to exactly `width` display columns.
fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}
