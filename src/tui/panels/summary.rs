//! Market summary header.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use rust_decimal::Decimal;

use crate::display::{
    fixed, format_cny, format_percent, index_level, last_candle_change, rank_by_change,
};
use crate::tui::app::App;

use super::change_color;

/// Number of gainers listed in the header.
const TOP_MOVERS: usize = 3;

/// Renders market aggregates, the index level, the selected symbol's
/// latest candle and the top gainers.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let view = &app.view;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let missing = || Span::styled("--", Style::default().fg(Color::DarkGray));

    let mut spans = vec![Span::styled(" 总市值 ", label)];
    match view.summary.data() {
        Some(summary) => {
            spans.push(Span::styled(format_cny(summary.total_market_cap), value));
            spans.push(Span::styled("  日交易额 ", label));
            spans.push(Span::styled(format_cny(summary.daily_volume), value));
        }
        None => {
            spans.push(missing());
            spans.push(Span::styled("  日交易额 ", label));
            spans.push(missing());
        }
    }

    spans.push(Span::styled("  上证指数 ", label));
    let quotes = view.quotes.data().map_or(&[][..], Vec::as_slice);
    match index_level(quotes) {
        Some(level) => spans.push(Span::styled(format!("{}点", fixed(level, 2)), value)),
        None => spans.push(missing()),
    }

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("{} ({}) ", view.selection.symbol_name, view.selection.symbol),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let candles = view.candles.data().map_or(&[][..], Vec::as_slice);
    match last_candle_change(candles) {
        Some((close, change)) => {
            let arrow = if change >= Decimal::ZERO { "▲" } else { "▼" };
            spans.push(Span::styled(arrow, Style::default().fg(change_color(change))));
            spans.push(Span::styled(format!(" {} ", fixed(close, 2)), value));
            spans.push(Span::styled(
                format_percent(change),
                Style::default().fg(change_color(change)),
            ));
        }
        None => spans.push(missing()),
    }

    let top = rank_by_change(quotes, TOP_MOVERS);
    if !top.is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("领涨 ", label));
        for quote in top {
            spans.push(Span::raw(format!("{} ", quote.name)));
            spans.push(Span::styled(
                format!("{} ", format_percent(quote.change_percent)),
                Style::default().fg(change_color(quote.change_percent)),
            ));
        }
    }

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
