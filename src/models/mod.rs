//! Market data models consumed from the dashboard HTTP API.
//!
//! Contains the candle, quote, order book and summary payloads plus the
//! small enums (period, indicator) that parameterize a fetch.

pub mod book;
pub mod candle;
pub mod summary;
pub mod ticker;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HangqingError;

/// Candle bucket size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[default]
    #[serde(rename = "1d")]
    D1,
}

impl Period {
    /// Every period in selector order.
    pub const ALL: [Period; 6] = [
        Period::M1,
        Period::M5,
        Period::M15,
        Period::H1,
        Period::H4,
        Period::D1,
    ];

    /// Returns the `interval` query value expected by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::M1 => "1m",
            Period::M5 => "5m",
            Period::M15 => "15m",
            Period::H1 => "1h",
            Period::H4 => "4h",
            Period::D1 => "1d",
        }
    }

    /// Returns `true` for periods shorter than a trading day.
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Period::D1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = HangqingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| HangqingError::Config(format!("unknown period {s:?}")))
    }
}

/// Chart overlays the user can switch on and off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    /// The moving-average line family (all configured windows at once).
    MovingAverage,
    /// Volume bars under the price grid.
    Volume,
}

impl Indicator {
    /// Returns the short label used in the selector.
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::MovingAverage => "MA",
            Indicator::Volume => "VOL",
        }
    }
}

/// Enabled indicators. Both are on by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IndicatorSet {
    pub moving_average: bool,
    pub volume: bool,
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self {
            moving_average: true,
            volume: true,
        }
    }
}

impl IndicatorSet {
    /// Returns whether the indicator is enabled.
    pub fn contains(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::MovingAverage => self.moving_average,
            Indicator::Volume => self.volume,
        }
    }

    /// Flips one indicator.
    pub fn toggle(&mut self, indicator: Indicator) {
        match indicator {
            Indicator::MovingAverage => self.moving_average = !self.moving_average,
            Indicator::Volume => self.volume = !self.volume,
        }
    }
}
