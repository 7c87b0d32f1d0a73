//! Order book depth panel.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;

use crate::display::{DepthView, depth_view, fixed};
use crate::models::book::BookLevel;
use crate::tui::app::App;

use super::border_style;

/// Width of the longest depth bar.
const BAR_WIDTH: usize = 15;

/// Renders asks above bids with depth bars scaled to the shared maximum.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let slice = &app.view.order_book;
    let is_stale = slice.error().is_some() && slice.data().is_some();
    let title = if is_stale {
        " 盘口 [STALE] "
    } else {
        " 盘口 "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_stale {
            Style::default().fg(Color::Yellow)
        } else {
            border_style(false)
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(book) = slice.data() else {
        let text = match slice.error() {
            Some(failure) => format!("No data: {failure}"),
            None => "No data".to_string(),
        };
        let para = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
        return;
    };

    let view = depth_view(book);
    // Header, spread and column titles take three rows.
    let levels_per_side = (inner.height.saturating_sub(3) as usize / 2).max(1);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("{:>10} {:>10} {:>12}", "价格", "数量", "金额"),
        Style::default().fg(Color::DarkGray),
    )));

    // Lowest ask sits just above the spread.
    for ask in view.asks.iter().take(levels_per_side).rev() {
        lines.push(level_line(ask, &view, Color::Red));
    }

    let spread_text = match (view.bids.first(), view.asks.first()) {
        (Some(bid), Some(ask)) if bid.price > Decimal::ZERO => {
            let spread = ask.price - bid.price;
            let spread_pct = spread / bid.price * Decimal::ONE_HUNDRED;
            format!("─── Spread: {} ({}%) ───", fixed(spread, 2), fixed(spread_pct, 3))
        }
        _ => "───".to_string(),
    };
    lines.push(Line::from(Span::styled(
        spread_text,
        Style::default().fg(Color::DarkGray),
    )));

    for bid in view.bids.iter().take(levels_per_side) {
        lines.push(level_line(bid, &view, Color::Green));
    }

    if view.bids.is_empty() && view.asks.is_empty() {
        lines.push(Line::from(Span::styled(
            "Empty book",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn level_line<'a>(level: &BookLevel, view: &DepthView, color: Color) -> Line<'a> {
    let bar_len = (view.bar_ratio(level.amount) * BAR_WIDTH as f64).round() as usize;
    Line::from(vec![
        Span::styled(
            format!("{:>10} ", fixed(level.price, 2)),
            Style::default().fg(color),
        ),
        Span::raw(format!("{:>10} ", level.amount.normalize().to_string())),
        Span::raw(format!("{:>12} ", fixed(level.total, 2))),
        Span::styled("▒".repeat(bar_len.min(BAR_WIDTH)), Style::default().fg(color)),
    ])
}
