//! Dashboard REST API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{KLINE, MarketSource, ORDER_BOOK, SUMMARY, TICKERS};
use crate::models::Period;
use crate::models::book::OrderBookSnapshot;
use crate::models::candle::Candle;
use crate::models::summary::MarketSummary;
use crate::models::ticker::{Quote, TickerEntry};
use crate::{HangqingError, Result};

/// [`MarketSource`] backed by the `/api/market/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Builds a source for `base_url` (no trailing slash).
    ///
    /// `timeout` is applied by reqwest to every request as a backstop to
    /// the sync loop's own per-call deadline.
    ///
    /// # Errors
    ///
    /// Returns [`HangqingError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// `GET /api/market/summary`.
    pub fn summary_url(&self) -> String {
        format!("{}/api/market/summary", self.base_url)
    }

    /// `GET /api/market/tickers?limit=N`.
    pub fn tickers_url(&self, limit: usize) -> String {
        format!("{}/api/market/tickers?limit={limit}", self.base_url)
    }

    /// `GET /api/market/simple-kline/{symbol}?interval=P&limit=N`.
    pub fn kline_url(&self, symbol: &str, period: Period, limit: usize) -> String {
        format!(
            "{}/api/market/simple-kline/{symbol}?interval={}&limit={limit}",
            self.base_url,
            period.as_str()
        )
    }

    /// `GET /api/market/simple-orderbook/{symbol}?depth=N`.
    pub fn order_book_url(&self, symbol: &str, depth: usize) -> String {
        format!(
            "{}/api/market/simple-orderbook/{symbol}?depth={depth}",
            self.base_url
        )
    }

    /// Issues a GET and decodes a JSON body. Non-2xx is an error.
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, url: String) -> Result<T> {
        debug!(endpoint, url = %url, "GET");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HangqingError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl MarketSource for HttpSource {
    async fn fetch_summary(&self) -> Result<MarketSummary> {
        self.get_json(SUMMARY, self.summary_url()).await
    }

    async fn fetch_symbol_list(&self, limit: usize) -> Result<Vec<Quote>> {
        let entries: Vec<TickerEntry> = self.get_json(TICKERS, self.tickers_url(limit)).await?;
        Ok(entries.into_iter().map(Quote::from).collect())
    }

    async fn fetch_candles(&self, symbol: &str, period: Period, limit: usize) -> Result<Vec<Candle>> {
        self.get_json(KLINE, self.kline_url(symbol, period, limit))
            .await
    }

    async fn fetch_order_book(&self, symbol: &str, depth: usize) -> Result<OrderBookSnapshot> {
        self.get_json(ORDER_BOOK, self.order_book_url(symbol, depth))
            .await
    }
}
