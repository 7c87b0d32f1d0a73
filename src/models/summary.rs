use rust_decimal::Decimal;
use serde::Deserialize;

/// Market-wide aggregates from the `summary` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketSummary {
    pub total_market_cap: Decimal,
    pub daily_volume: Decimal,
    pub btc_dominance: Decimal,
}
