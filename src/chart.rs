//! Declarative chart description built from candles and indicators.
//!
//! [`ChartSpec`] carries everything a surface needs to draw the price
//! and volume grids: axis labels, series, legend state and the initial
//! zoom window. The terminal renders it directly; it also serializes to
//! JSON for any other charting front end.

use std::ops::Range;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::display::fixed;
use crate::indicators::{IndicatorSeries, moving_averages};
use crate::models::candle::Candle;
use crate::models::{IndicatorSet, Period};

/// Rising bar color.
pub const UP_COLOR: &str = "#ef232a";
/// Falling bar color.
pub const DOWN_COLOR: &str = "#14b143";

const ZOOM_START_PERCENT: u8 = 50;
const ZOOM_END_PERCENT: u8 = 100;

/// Name of the volume series.
pub const VOLUME_SERIES: &str = "Volume";

/// Complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub legend: Vec<LegendEntry>,
    /// Price grid axis first, then the volume grid axis.
    pub x_axes: Vec<CategoryAxis>,
    pub series: Vec<Series>,
    pub zoom: ZoomWindow,
}

/// One legend item and whether it is toggled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub selected: bool,
}

/// Grid a series or axis belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grid {
    Price,
    Volume,
}

/// Category x axis labelled from candle timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAxis {
    pub grid: Grid,
    pub labels: Vec<String>,
    pub show_labels: bool,
}

/// Bar direction, decides the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(candle: &Candle) -> Self {
        if candle.is_up() {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Direction::Up => UP_COLOR,
            Direction::Down => DOWN_COLOR,
        }
    }
}

/// A single volume bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeBar {
    pub value: Decimal,
    pub direction: Direction,
}

/// One drawable series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Series {
    /// Points are `[open, close, low, high]`.
    Candlestick { name: String, data: Vec<[Decimal; 4]> },
    /// Moving-average line; `None` is a gap.
    Line {
        name: String,
        window: usize,
        data: Vec<Option<Decimal>>,
    },
    /// Volume bars on the lower grid. Empty when volume is switched off.
    Bar { name: String, data: Vec<VolumeBar> },
}

impl Series {
    pub fn name(&self) -> &str {
        match self {
            Series::Candlestick { name, .. } | Series::Line { name, .. } | Series::Bar { name, .. } => {
                name.as_str()
            }
        }
    }

    pub fn grid(&self) -> Grid {
        match self {
            Series::Bar { .. } => Grid::Volume,
            _ => Grid::Price,
        }
    }
}

/// Initial visible window, in percent of the category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoomWindow {
    pub start_percent: u8,
    pub end_percent: u8,
}

impl Default for ZoomWindow {
    fn default() -> Self {
        Self {
            start_percent: ZOOM_START_PERCENT,
            end_percent: ZOOM_END_PERCENT,
        }
    }
}

impl ZoomWindow {
    /// Maps the window onto indices of an axis with `len` categories.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = len * usize::from(self.start_percent) / 100;
        let end = (len * usize::from(self.end_percent)).div_ceil(100).min(len);
        start.min(end)..end
    }
}

/// Builds the chart for `candles` with the given indicator selection.
///
/// MA legend entries are always present so the legend layout never
/// jumps; switching MA off removes the line series and unselects them.
/// Switching volume off keeps the volume axis and bar series with no data.
pub fn build_chart(
    candles: &[Candle],
    indicators: IndicatorSet,
    windows: &[usize],
    period: Period,
) -> ChartSpec {
    let labels: Vec<String> = candles
        .iter()
        .map(|c| axis_label(&c.timestamp, period))
        .collect();

    let candle_name = candle_series_name(period).to_string();
    let mut legend = vec![LegendEntry {
        name: candle_name.clone(),
        selected: true,
    }];
    legend.extend(windows.iter().map(|w| LegendEntry {
        name: format!("MA{w}"),
        selected: indicators.moving_average,
    }));

    let mut series = vec![Series::Candlestick {
        name: candle_name,
        data: candles
            .iter()
            .map(|c| [c.open, c.close, c.low, c.high])
            .collect(),
    }];

    if indicators.moving_average {
        series.extend(moving_averages(candles, windows).into_iter().map(line_series));
    }

    let bars = if indicators.volume {
        candles
            .iter()
            .map(|c| VolumeBar {
                value: c.volume,
                direction: Direction::of(c),
            })
            .collect()
    } else {
        Vec::new()
    };
    series.push(Series::Bar {
        name: VOLUME_SERIES.to_string(),
        data: bars,
    });

    ChartSpec {
        legend,
        x_axes: vec![
            CategoryAxis {
                grid: Grid::Price,
                labels: labels.clone(),
                show_labels: true,
            },
            CategoryAxis {
                grid: Grid::Volume,
                labels,
                show_labels: false,
            },
        ],
        series,
        zoom: ZoomWindow::default(),
    }
}

fn line_series(ma: IndicatorSeries) -> Series {
    Series::Line {
        name: ma.name(),
        window: ma.window,
        data: ma.values,
    }
}

/// Legend name of the candle series.
pub fn candle_series_name(period: Period) -> &'static str {
    match period {
        Period::M1 => "1分K",
        Period::M5 => "5分K",
        Period::M15 => "15分K",
        Period::H1 => "1小时K",
        Period::H4 => "4小时K",
        Period::D1 => "日K",
    }
}

/// `YYYY-MM-DD` for daily candles, `MM-DD HH:MM` for intraday ones.
pub fn axis_label(timestamp: &str, period: Period) -> String {
    let (date, time) = timestamp
        .split_once(|c: char| c == 'T' || c == ' ')
        .unwrap_or((timestamp, ""));
    if !period.is_intraday() || time.is_empty() {
        return date.to_string();
    }
    let month_day = date.get(5..).unwrap_or(date);
    let hour_minute = time.get(..5).unwrap_or(time);
    format!("{month_day} {hour_minute}")
}

/// Tooltip text for the category at `index`: date, OHLC, every shown MA
/// (`-` for a gap) and volume when shown. Empty when out of range.
pub fn tooltip_lines(spec: &ChartSpec, index: usize) -> Vec<String> {
    let Some(date) = spec.x_axes.first().and_then(|axis| axis.labels.get(index)) else {
        return Vec::new();
    };

    let mut lines = vec![date.clone()];
    for series in &spec.series {
        match series {
            Series::Candlestick { data, .. } => {
                if let Some([open, close, low, high]) = data.get(index) {
                    lines.push(format!("Open  {}", fixed(*open, 2)));
                    lines.push(format!("Close {}", fixed(*close, 2)));
                    lines.push(format!("Low   {}", fixed(*low, 2)));
                    lines.push(format!("High  {}", fixed(*high, 2)));
                }
            }
            Series::Line { name, data, .. } => {
                let value = data
                    .get(index)
                    .copied()
                    .flatten()
                    .map(|v| fixed(v, 2))
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!("{name} {value}"));
            }
            Series::Bar { name, data } => {
                if let Some(bar) = data.get(index) {
                    lines.push(format!("{name} {}", bar.value.normalize()));
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WINDOWS: [usize; 4] = [5, 10, 20, 30];

    fn candle(ts: &str, open: Decimal, close: Decimal, volume: Decimal) -> Candle {
        Candle {
            timestamp: ts.to_string(),
            open,
            high: open.max(close) + dec!(1),
            low: open.min(close) - dec!(1),
            close,
            volume,
        }
    }

    fn sample() -> Vec<Candle> {
        vec![
            candle("2024-03-01T00:00:00", dec!(10), dec!(12), dec!(100)),
            candle("2024-03-04T00:00:00", dec!(12), dec!(11), dec!(80)),
            candle("2024-03-05T00:00:00", dec!(11), dec!(11), dec!(90)),
        ]
    }

    fn line_count(spec: &ChartSpec) -> usize {
        spec.series
            .iter()
            .filter(|s| matches!(s, Series::Line { .. }))
            .count()
    }

    fn volume_bars(spec: &ChartSpec) -> &[VolumeBar] {
        spec.series
            .iter()
            .find_map(|s| match s {
                Series::Bar { data, .. } => Some(data.as_slice()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn full_chart_has_candles_lines_and_volume() {
        let spec = build_chart(&sample(), IndicatorSet::default(), &WINDOWS, Period::D1);

        assert_eq!(spec.series.len(), 1 + WINDOWS.len() + 1);
        assert_eq!(line_count(&spec), 4);
        assert_eq!(volume_bars(&spec).len(), 3);
        assert_eq!(spec.x_axes.len(), 2);
        assert_eq!(spec.x_axes[0].labels, vec!["2024-03-01", "2024-03-04", "2024-03-05"]);

        let Series::Candlestick { name, data } = &spec.series[0] else {
            panic!("first series must be candles");
        };
        assert_eq!(name, "日K");
        assert_eq!(data[0], [dec!(10), dec!(12), dec!(9), dec!(13)]);
    }

    #[test]
    fn ma_off_removes_lines_but_keeps_legend_entries() {
        let indicators = IndicatorSet {
            moving_average: false,
            volume: true,
        };
        let spec = build_chart(&sample(), indicators, &WINDOWS, Period::D1);

        assert_eq!(line_count(&spec), 0);
        let names: Vec<_> = spec.legend.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["日K", "MA5", "MA10", "MA20", "MA30"]);
        assert!(spec.legend[0].selected);
        assert!(spec.legend[1..].iter().all(|e| !e.selected));
    }

    #[test]
    fn volume_off_keeps_axis_with_empty_series() {
        let indicators = IndicatorSet {
            moving_average: true,
            volume: false,
        };
        let spec = build_chart(&sample(), indicators, &WINDOWS, Period::D1);

        assert!(volume_bars(&spec).is_empty());
        let volume_axis = &spec.x_axes[1];
        assert_eq!(volume_axis.grid, Grid::Volume);
        assert_eq!(volume_axis.labels.len(), 3);
    }

    #[test]
    fn volume_colors_follow_close_vs_open() {
        let spec = build_chart(&sample(), IndicatorSet::default(), &WINDOWS, Period::D1);
        let bars = volume_bars(&spec);
        assert_eq!(bars[0].direction, Direction::Up);
        assert_eq!(bars[1].direction, Direction::Down);
        // Flat candles count as up.
        assert_eq!(bars[2].direction.color(), UP_COLOR);
    }

    #[test]
    fn intraday_labels_include_time() {
        assert_eq!(axis_label("2024-03-01T09:35:00", Period::M5), "03-01 09:35");
        assert_eq!(axis_label("2024-03-01 14:00:00", Period::H1), "03-01 14:00");
        assert_eq!(axis_label("2024-03-01T00:00:00", Period::D1), "2024-03-01");
        assert_eq!(axis_label("2024-03-01", Period::M1), "2024-03-01");
    }

    #[test]
    fn zoom_shows_newest_half() {
        let zoom = ZoomWindow::default();
        assert_eq!(zoom.visible_range(100), 50..100);
        assert_eq!(zoom.visible_range(5), 2..5);
        assert_eq!(zoom.visible_range(0), 0..0);
    }

    #[test]
    fn tooltip_lists_values_at_index() {
        let spec = build_chart(&sample(), IndicatorSet::default(), &[2, 5], Period::D1);
        let lines = tooltip_lines(&spec, 1);

        assert_eq!(lines[0], "2024-03-04");
        assert!(lines.contains(&"Close 11.00".to_string()));
        assert!(lines.contains(&"MA2 11.50".to_string()));
        assert!(lines.contains(&"MA5 -".to_string()));
        assert!(lines.contains(&"Volume 80".to_string()));
        assert!(tooltip_lines(&spec, 3).is_empty());
    }

    #[test]
    fn serializes_series_with_type_tags() {
        let spec = build_chart(&sample(), IndicatorSet::default(), &[5], Period::D1);
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["series"][0]["type"], "candlestick");
        assert_eq!(json["series"][1]["type"], "line");
        assert_eq!(json["series"][2]["type"], "bar");
        assert_eq!(json["series"][2]["data"][0]["direction"], "up");
        assert_eq!(json["zoom"]["start_percent"], 50);
    }

    #[test]
    fn empty_candles_give_empty_series() {
        let spec = build_chart(&[], IndicatorSet::default(), &WINDOWS, Period::D1);
        assert!(spec.x_axes[0].labels.is_empty());
        assert!(volume_bars(&spec).is_empty());
        assert!(tooltip_lines(&spec, 0).is_empty());
    }
}
