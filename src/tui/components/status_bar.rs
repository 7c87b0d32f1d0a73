//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::store::SyncPhase;
use crate::tui::app::App;

/// Renders sync phase, per-slice failures and refresh age.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let view = &app.view;
    let phase_color = match view.phase {
        SyncPhase::Ready => Color::Green,
        SyncPhase::Loading | SyncPhase::Refreshing => Color::Yellow,
        SyncPhase::Failed => Color::Red,
        SyncPhase::Idle => Color::Gray,
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", view.phase.label()),
            Style::default().fg(phase_color),
        ),
        Span::raw("│"),
    ];

    let refreshed = match view.last_refresh {
        Some(at) => format!(" updated {}s ago ", at.elapsed().as_secs()),
        None => " never updated ".to_string(),
    };
    spans.push(Span::styled(refreshed, Style::default().fg(Color::White)));
    spans.push(Span::raw("│"));

    // Stale slices keep their data; only the marker shows here.
    for (slice, failure) in view.errors() {
        spans.push(Span::styled(
            format!(" {slice}: {failure} "),
            Style::default().fg(Color::Red),
        ));
    }

    if let Some(ref error) = app.error_message {
        spans.push(Span::styled(
            format!(" {} ", error.message),
            Style::default().fg(Color::Red),
        ));
    }

    let used: usize = spans.iter().map(|s| s.width()).sum();
    let cycle_info = format!(" cycle #{} ", view.cycle);
    spans.push(Span::raw(format!(
        "{:>width$}",
        cycle_info,
        width = (area.width as usize).saturating_sub(used)
    )));

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
