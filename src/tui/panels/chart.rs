//! Candlestick, moving-average and volume panel drawn from a [`ChartSpec`].

use std::ops::Range;

use ratatui::{
    Frame,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::chart::{ChartSpec, Direction, Series, VolumeBar, candle_series_name, tooltip_lines};
use crate::display::fixed;
use crate::store::LoadState;
use crate::tui::app::{App, Focus};

use super::{border_style, direction_color};

/// Width of the price label gutter, including the axis line.
const GUTTER: u16 = 12;
/// Width of the tooltip column.
const TOOLTIP_WIDTH: u16 = 22;

const MA_COLORS: [Color; 4] = [Color::Yellow, Color::Magenta, Color::Cyan, Color::Blue];

/// Renders the chart panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let selection = &app.view.selection;
    let title = format!(
        " {} ({}) {} ",
        selection.symbol_name,
        selection.symbol,
        candle_series_name(selection.period)
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Chart));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let spec = &app.chart;
    let Some(points) = candle_points(spec) else {
        return;
    };
    if points.is_empty() {
        let text = match app.view.candles.error() {
            Some(failure) => format!("No candle data: {failure}"),
            None if app.view.load_state() == LoadState::Loading => "Loading...".to_string(),
            None => "No candle data".to_string(),
        };
        let para = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
        return;
    }

    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Min(GUTTER + 4), Constraint::Length(TOOLTIP_WIDTH)])
        .split(inner);
    let grids = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(columns[0]);

    let window = plot_window(spec, points.len(), grids[0].width.saturating_sub(GUTTER));
    if window.is_empty() {
        let para = Paragraph::new("Too narrow for the chart")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
        return;
    }
    let cursor = app.cursor_index();

    render_price_grid(frame, grids[0], spec, points, window.clone(), cursor);
    render_volume_grid(frame, grids[1], spec, window, cursor);
    render_tooltip(frame, columns[1], spec, cursor);
}

fn candle_points(spec: &ChartSpec) -> Option<&[[Decimal; 4]]> {
    spec.series.iter().find_map(|s| match s {
        Series::Candlestick { data, .. } => Some(data.as_slice()),
        _ => None,
    })
}

/// Zoom window narrowed to the newest candles that fit in `width` columns.
fn plot_window(spec: &ChartSpec, len: usize, width: u16) -> Range<usize> {
    let zoom = spec.zoom.visible_range(len);
    let start = zoom.start.max(zoom.end.saturating_sub(width as usize));
    start..zoom.end
}

fn render_price_grid(
    frame: &mut Frame,
    area: Rect,
    spec: &ChartSpec,
    points: &[[Decimal; 4]],
    window: Range<usize>,
    cursor: Option<usize>,
) {
    let height = area.height as usize;
    let visible = &points[window.clone()];
    if height == 0 || visible.is_empty() {
        return;
    }
    let (min_price, max_price) = visible.iter().fold(
        (Decimal::MAX, Decimal::MIN),
        |(min, max), [_, _, low, high]| (min.min(*low), max.max(*high)),
    );
    let range = max_price - min_price;
    if range <= Decimal::ZERO {
        let para = Paragraph::new(format!("Flat at {}", fixed(max_price, 2)))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
        return;
    }

    let lines_series: Vec<&[Option<Decimal>]> = spec
        .series
        .iter()
        .filter_map(|s| match s {
            Series::Line { data, .. } => Some(data.as_slice()),
            _ => None,
        })
        .collect();

    let step = range / Decimal::from(height as u64);
    let mut lines: Vec<Line> = Vec::with_capacity(height);

    for row in 0..height {
        let level = max_price - step * Decimal::from(row as u64);
        let band = (level - step, level);

        let mut cells: Vec<Span> = Vec::with_capacity(window.len() + 1);
        cells.push(Span::raw(format!("{:>10} │", fixed(level, 2))));

        for index in window.clone() {
            let [open, close, low, high] = points[index];
            let direction = if close >= open { Direction::Up } else { Direction::Down };
            let body_top = open.max(close);
            let body_bottom = open.min(close);

            let mut style = Style::default().fg(direction_color(direction));
            let glyph = if level > body_bottom && band.0 < body_top {
                "█"
            } else if level >= low && band.0 < high {
                "│"
            } else if let Some(slot) = lines_series.iter().position(|data| {
                data.get(index)
                    .copied()
                    .flatten()
                    .is_some_and(|v| v > band.0 && v <= band.1)
            }) {
                style = Style::default().fg(MA_COLORS[slot % MA_COLORS.len()]);
                "·"
            } else {
                " "
            };

            if cursor == Some(index) {
                style = style.bg(Color::DarkGray);
            }
            cells.push(Span::styled(glyph, style));
        }
        lines.push(Line::from(cells));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_volume_grid(
    frame: &mut Frame,
    area: Rect,
    spec: &ChartSpec,
    window: Range<usize>,
    cursor: Option<usize>,
) {
    let bars: &[VolumeBar] = spec
        .series
        .iter()
        .find_map(|s| match s {
            Series::Bar { data, .. } => Some(data.as_slice()),
            _ => None,
        })
        .unwrap_or(&[]);

    let height = area.height as usize;
    if bars.is_empty() || height == 0 {
        // Volume switched off: the slot stays, empty.
        let para = Paragraph::new(format!("{:>10} │", "VOL off"))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
        return;
    }

    let visible = window.clone().filter_map(|i| bars.get(i));
    let max_volume = visible.map(|b| b.value).max().unwrap_or(Decimal::ZERO);
    let mut lines: Vec<Line> = Vec::with_capacity(height);

    for row in 0..height {
        let label = if row == 0 {
            format!("{:>10} │", max_volume.normalize().to_string())
        } else {
            format!("{:>10} │", "")
        };
        let mut cells = vec![Span::styled(label, Style::default().fg(Color::DarkGray))];
        let threshold = (height - row) as f64;

        for index in window.clone() {
            let Some(bar) = bars.get(index) else {
                cells.push(Span::raw(" "));
                continue;
            };
            let filled = if max_volume > Decimal::ZERO {
                (bar.value / max_volume).to_f64().unwrap_or(0.0) * height as f64
            } else {
                0.0
            };
            let glyph = if filled.ceil() >= threshold { "▇" } else { " " };
            let mut style = Style::default().fg(direction_color(bar.direction));
            if cursor == Some(index) {
                style = style.bg(Color::DarkGray);
            }
            cells.push(Span::styled(glyph, style));
        }
        lines.push(Line::from(cells));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_tooltip(frame: &mut Frame, area: Rect, spec: &ChartSpec, cursor: Option<usize>) {
    let lines: Vec<Line> = cursor
        .map(|index| tooltip_lines(spec, index))
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if i == 0 {
                Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
            } else {
                Line::from(text)
            }
        })
        .collect();

    let para = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(para, area);
}
