//! Shared test utilities: a scripted in-memory source and a loopback HTTP
//! server standing in for the dashboard API.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::Instant;

use hangqing::models::Period;
use hangqing::models::book::{BookLevel, OrderBookSnapshot};
use hangqing::models::candle::Candle;
use hangqing::models::summary::MarketSummary;
use hangqing::models::ticker::Quote;
use hangqing::source::{KLINE, MarketSource, ORDER_BOOK, SUMMARY};
use hangqing::store::ViewState;
use hangqing::{HangqingError, Result};

pub const SUMMARY_JSON: &str = include_str!("../fixtures/summary.json");
pub const TICKERS_JSON: &str = include_str!("../fixtures/tickers.json");
pub const KLINE_JSON: &str = include_str!("../fixtures/kline.json");
pub const ORDERBOOK_JSON: &str = include_str!("../fixtures/orderbook.json");

/// One recorded candle fetch.
#[derive(Debug, Clone)]
pub struct KlineCall {
    pub symbol: String,
    pub period: Period,
    pub at: Instant,
}

/// Mutable behaviour of a [`ScriptedSource`].
#[derive(Debug, Default)]
pub struct Script {
    pub quotes: Vec<Quote>,
    /// Delay per candle call, consumed front to back; empty means no delay.
    pub candle_delays: VecDeque<Duration>,
    pub fail_summary: bool,
    pub fail_candles: bool,
    pub fail_order_book: bool,
    pub kline_calls: Vec<KlineCall>,
}

/// In-memory [`MarketSource`].
///
/// Each candle response holds one candle whose close is the 1-based call
/// number, so tests can tell which fetch a stored series came from.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        let source = Self::default();
        source.script.lock().unwrap().quotes = quotes;
        source
    }

    pub fn kline_calls(&self) -> Vec<KlineCall> {
        self.script.lock().unwrap().kline_calls.clone()
    }

    pub fn edit(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }
}

impl MarketSource for ScriptedSource {
    async fn fetch_summary(&self) -> Result<MarketSummary> {
        if self.script.lock().unwrap().fail_summary {
            return Err(HangqingError::Status {
                endpoint: SUMMARY,
                status: 500,
            });
        }
        Ok(MarketSummary {
            total_market_cap: Decimal::from(85_000_000_000_000_u64),
            daily_volume: Decimal::from(800_000_000_000_u64),
            btc_dominance: Decimal::ZERO,
        })
    }

    async fn fetch_symbol_list(&self, limit: usize) -> Result<Vec<Quote>> {
        let quotes = self.script.lock().unwrap().quotes.clone();
        Ok(quotes.into_iter().take(limit).collect())
    }

    async fn fetch_candles(&self, symbol: &str, period: Period, _limit: usize) -> Result<Vec<Candle>> {
        let (call_no, delay, fail) = {
            let mut script = self.script.lock().unwrap();
            script.kline_calls.push(KlineCall {
                symbol: symbol.to_string(),
                period,
                at: Instant::now(),
            });
            (
                script.kline_calls.len(),
                script.candle_delays.pop_front(),
                script.fail_candles,
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(HangqingError::Status {
                endpoint: KLINE,
                status: 502,
            });
        }

        let close = Decimal::from(call_no as u64);
        Ok(vec![Candle {
            timestamp: "2024-03-01T00:00:00".to_string(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ONE,
        }])
    }

    async fn fetch_order_book(&self, _symbol: &str, _depth: usize) -> Result<OrderBookSnapshot> {
        if self.script.lock().unwrap().fail_order_book {
            return Err(HangqingError::Status {
                endpoint: ORDER_BOOK,
                status: 503,
            });
        }
        Ok(OrderBookSnapshot {
            bids: vec![BookLevel {
                price: Decimal::TEN,
                amount: Decimal::from(5),
                total: Decimal::from(50),
            }],
            asks: vec![BookLevel {
                price: Decimal::from(11),
                amount: Decimal::TWO,
                total: Decimal::from(22),
            }],
        })
    }
}

pub fn quote(symbol: &str, name: &str) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price: Decimal::TEN,
        change_absolute: Decimal::ZERO,
        change_percent: Decimal::ZERO,
        volume: Decimal::ONE,
    }
}

/// Quotes that include the default symbol.
pub fn default_quotes() -> Vec<Quote> {
    vec![
        quote("000001.SH", "上证指数"),
        quote("600036.SH", "招商银行"),
    ]
}

/// Waits until the published state satisfies `pred`, returning a copy.
pub async fn wait_for(
    states: &mut watch::Receiver<ViewState>,
    pred: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    tokio::time::timeout(Duration::from_secs(600), states.wait_for(pred))
        .await
        .expect("state never reached")
        .expect("sync loop stopped")
        .clone()
}

/// Canned response for one request path.
pub type Responder = Arc<dyn Fn(&str) -> (u16, String) + Send + Sync>;

/// Serves canned HTTP/1.1 responses on a loopback port.
///
/// Returns the base URL and the log of request targets seen so far.
pub async fn serve(responder: Responder) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let responder = Arc::clone(&responder);
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let target = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                log.lock().unwrap().push(target.clone());

                let (status, body) = responder(&target);
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), seen)
}

/// Routes the four API paths to the JSON fixtures.
pub fn fixture_responder() -> Responder {
    Arc::new(|target: &str| {
        let path = target.split('?').next().unwrap_or(target);
        if path == "/api/market/summary" {
            (200, SUMMARY_JSON.to_string())
        } else if path == "/api/market/tickers" {
            (200, TICKERS_JSON.to_string())
        } else if path.starts_with("/api/market/simple-kline/") {
            (200, KLINE_JSON.to_string())
        } else if path.starts_with("/api/market/simple-orderbook/") {
            (200, ORDERBOOK_JSON.to_string())
        } else {
            (404, "{\"detail\":\"Not Found\"}".to_string())
        }
    })
}
