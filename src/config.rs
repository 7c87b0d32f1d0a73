//! Application configuration loaded from environment variables.
//!
//! Every variable is optional:
//! - `HANGQING_API_URL` - base URL of the dashboard API
//! - `HANGQING_DEFAULT_SYMBOL` / `HANGQING_DEFAULT_SYMBOL_NAME` - initial selection
//! - `HANGQING_PERIOD` - initial candle period (`1m`, `5m`, `15m`, `1h`, `4h`, `1d`)
//! - `HANGQING_REFRESH_SECS` - background refresh interval
//! - `HANGQING_TIMEOUT_SECS` - per-request timeout
//! - `HANGQING_MA_WINDOWS` - comma-separated moving-average windows
//! - `HANGQING_LOG_FILE` / `HANGQING_LOG_LEVEL` - log destination and verbosity

use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use crate::HangqingError;
use crate::models::Period;

/// Default API endpoint.
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Shanghai Composite, shown until the user picks something else.
const DEFAULT_SYMBOL: &str = "000001.SH";
const DEFAULT_SYMBOL_NAME: &str = "上证指数";

const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MA_WINDOWS: [usize; 4] = [5, 10, 20, 30];
const DEFAULT_LOG_FILE: &str = "hangqing.log";

/// Number of tickers requested per cycle.
pub const TICKER_LIMIT: usize = 50;
/// Number of candles requested per cycle.
pub const KLINE_LIMIT: usize = 100;
/// Order book levels requested per side.
pub const BOOK_DEPTH: usize = 10;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub market: MarketConfig,
    pub log: LogConfig,
}

/// Remote API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

/// Initial selection and refresh cadence.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub default_symbol: String,
    pub default_symbol_name: String,
    pub period: Period,
    pub refresh_interval: Duration,
    pub ma_windows: Vec<usize>,
    pub ticker_limit: usize,
    pub kline_limit: usize,
    pub book_depth: usize,
}

/// Log file settings. The terminal belongs to the UI, so logs go to a file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: Level,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`HangqingError::Config`] if a numeric, period, window or
/// level variable cannot be parsed, or if a duration is zero.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("HANGQING_API_URL")
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let default_symbol =
        non_empty_var("HANGQING_DEFAULT_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
    let default_symbol_name = match non_empty_var("HANGQING_DEFAULT_SYMBOL_NAME") {
        Some(name) => name,
        None if default_symbol == DEFAULT_SYMBOL => DEFAULT_SYMBOL_NAME.to_string(),
        None => default_symbol.clone(),
    };

    let period = match non_empty_var("HANGQING_PERIOD") {
        Some(raw) => raw.parse()?,
        None => Period::default(),
    };

    let refresh_interval = seconds_var("HANGQING_REFRESH_SECS", DEFAULT_REFRESH_SECS)?;
    let request_timeout = seconds_var("HANGQING_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

    let ma_windows = match non_empty_var("HANGQING_MA_WINDOWS") {
        Some(raw) => parse_windows(&raw)?,
        None => DEFAULT_MA_WINDOWS.to_vec(),
    };

    let file = non_empty_var("HANGQING_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let level = match non_empty_var("HANGQING_LOG_LEVEL") {
        Some(raw) => raw
            .parse::<Level>()
            .map_err(|_| HangqingError::Config(format!("invalid HANGQING_LOG_LEVEL {raw:?}")))?,
        None => Level::INFO,
    };

    Ok(AppConfig {
        api: ApiConfig {
            base_url,
            request_timeout,
        },
        market: MarketConfig {
            default_symbol,
            default_symbol_name,
            period,
            refresh_interval,
            ma_windows,
            ticker_limit: TICKER_LIMIT,
            kline_limit: KLINE_LIMIT,
            book_depth: BOOK_DEPTH,
        },
        log: LogConfig { file, level },
    })
}

/// Parses `"5,10,20"` into windows. Every window must be at least one.
fn parse_windows(raw: &str) -> crate::Result<Vec<usize>> {
    let windows = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(w) if w > 0 => Ok(w),
            _ => Err(HangqingError::Config(format!(
                "invalid moving-average window {s:?} in HANGQING_MA_WINDOWS"
            ))),
        })
        .collect::<crate::Result<Vec<_>>>()?;

    if windows.is_empty() {
        return Err(HangqingError::Config(
            "HANGQING_MA_WINDOWS must list at least one window".to_string(),
        ));
    }
    Ok(windows)
}

/// Reads a positive whole number of seconds.
fn seconds_var(name: &str, default: u64) -> crate::Result<Duration> {
    let secs = match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| HangqingError::Config(format!("{name} must be a whole number of seconds")))?,
        None => default,
    };
    if secs == 0 {
        return Err(HangqingError::Config(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
