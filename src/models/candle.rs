//! OHLCV candle models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar from the `simple-kline` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// ISO-8601 start of the bucket (wire name: `"time"`).
    #[serde(rename = "time")]
    pub timestamp: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Returns `true` when the bar closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Percentage move from open to close, or zero for a zero open.
    pub fn change_percent(&self) -> Decimal {
        if self.open.is_zero() {
            return Decimal::ZERO;
        }
        (self.close - self.open) / self.open * Decimal::ONE_HUNDRED
    }
}
