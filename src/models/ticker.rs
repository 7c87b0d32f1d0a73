//! Ticker list models.

use rust_decimal::Decimal;
use serde::Deserialize;

/// One row of the `tickers` endpoint as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub last_price: Decimal,
    pub price_change: Decimal,
    pub price_change_percent: Decimal,
    pub volume: Decimal,
}

/// A symbol quote as shown in the market list.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change_absolute: Decimal,
    pub change_percent: Decimal,
    pub volume: Decimal,
}

impl From<TickerEntry> for Quote {
    fn from(entry: TickerEntry) -> Self {
        let name = entry
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| entry.symbol.clone());
        Self {
            symbol: entry.symbol,
            name,
            price: entry.last_price,
            change_absolute: entry.price_change,
            change_percent: entry.price_change_percent,
            volume: entry.volume,
        }
    }
}
