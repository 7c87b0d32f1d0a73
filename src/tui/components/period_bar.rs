//! Period and indicator selector bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::models::{Indicator, Period};
use crate::tui::app::App;

/// Renders `[1]1m [2]5m ... [6]1d   MA VOL`, highlighting the active
/// period and the enabled indicators.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let selection = &app.view.selection;
    let mut spans: Vec<Span> = Vec::new();

    for (i, period) in Period::ALL.iter().enumerate() {
        let style = if *period == selection.period {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, period), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("  "));
    for indicator in [Indicator::MovingAverage, Indicator::Volume] {
        let style = if selection.indicators.contains(indicator) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", indicator.label()), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
