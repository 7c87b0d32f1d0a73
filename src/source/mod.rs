//! Market data sources.
//!
//! [`MarketSource`] is the seam between the sync loop and the network:
//! four independent calls, each returning a typed result or a
//! [`HangqingError`](crate::HangqingError). Sources never retry; the sync
//! loop's next cycle is the retry.
//!
//! - [`http`] - the dashboard REST API over reqwest

mod http;

use std::future::Future;
use std::time::Duration;

pub use http::HttpSource;

use crate::models::Period;
use crate::models::book::OrderBookSnapshot;
use crate::models::candle::Candle;
use crate::models::summary::MarketSummary;
use crate::models::ticker::Quote;
use crate::{HangqingError, Result};

/// Endpoint names used in errors and log fields.
pub const SUMMARY: &str = "summary";
pub const TICKERS: &str = "tickers";
pub const KLINE: &str = "kline";
pub const ORDER_BOOK: &str = "orderbook";

/// A remote provider of the four market data slices.
pub trait MarketSource: Send + Sync + 'static {
    /// Fetches market-wide aggregates.
    fn fetch_summary(&self) -> impl Future<Output = Result<MarketSummary>> + Send;

    /// Fetches up to `limit` symbol quotes in display order.
    fn fetch_symbol_list(&self, limit: usize) -> impl Future<Output = Result<Vec<Quote>>> + Send;

    /// Fetches up to `limit` candles for `symbol`, ascending by time.
    fn fetch_candles(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// Fetches an order book snapshot with `depth` levels per side.
    fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> impl Future<Output = Result<OrderBookSnapshot>> + Send;
}

/// Runs `fut` under `limit`, mapping expiry to [`HangqingError::Timeout`].
///
/// # Errors
///
/// Returns the future's own error, or a timeout error for `endpoint`.
pub async fn with_timeout<T>(
    endpoint: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(HangqingError::Timeout { endpoint }),
    }
}
