//! Order book snapshot models.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Full order book snapshot from the `simple-orderbook` endpoint.
///
/// Snapshots are atomic: a newer one replaces the previous one entirely.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    /// Returns `true` when neither side has a level.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// A single price level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub amount: Decimal,
    /// Taken as provided by the server, never re-derived.
    pub total: Decimal,
}
