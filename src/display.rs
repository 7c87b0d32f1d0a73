//! Pure helpers shared by the render layer: order book sorting, quote
//! search and sorting, and number formatting.

use std::borrow::Cow;
use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::book::{BookLevel, OrderBookSnapshot};
use crate::models::candle::Candle;
use crate::models::ticker::Quote;

/// Symbol whose price is shown as the headline index level.
pub const INDEX_SYMBOL: &str = "000001.SH";

/// Order book sides ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthView {
    /// Highest price first.
    pub bids: Vec<BookLevel>,
    /// Lowest price first.
    pub asks: Vec<BookLevel>,
    /// Largest amount across both sides; scales every depth bar.
    pub max_amount: Decimal,
}

impl DepthView {
    /// Fraction of the full bar width for `amount`, in `0.0..=1.0`.
    pub fn bar_ratio(&self, amount: Decimal) -> f64 {
        if self.max_amount <= Decimal::ZERO {
            return 0.0;
        }
        (amount / self.max_amount)
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

/// Sorts each side independently and computes the shared depth maximum.
pub fn depth_view(book: &OrderBookSnapshot) -> DepthView {
    let mut bids = book.bids.clone();
    let mut asks = book.asks.clone();
    bids.sort_by(|a, b| b.price.cmp(&a.price));
    asks.sort_by(|a, b| a.price.cmp(&b.price));

    let max_amount = bids
        .iter()
        .chain(asks.iter())
        .map(|level| level.amount)
        .max()
        .unwrap_or(Decimal::ZERO);

    DepthView {
        bids,
        asks,
        max_amount,
    }
}

/// Case-insensitive substring match on symbol or name.
///
/// An empty query returns `quotes` itself without copying.
pub fn filter_quotes<'a>(quotes: &'a [Quote], query: &str) -> Cow<'a, [Quote]> {
    if query.is_empty() {
        return Cow::Borrowed(quotes);
    }
    let needle = query.to_lowercase();
    Cow::Owned(
        quotes
            .iter()
            .filter(|q| {
                q.symbol.to_lowercase().contains(&needle) || q.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect(),
    )
}

/// Column the quote list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    /// Server order.
    #[default]
    Listed,
    /// Symbol, ascending.
    Symbol,
    /// Last price, descending.
    Price,
    /// Change percent, descending.
    ChangePercent,
}

impl SortColumn {
    /// Cycles to the next column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Listed => SortColumn::Symbol,
            SortColumn::Symbol => SortColumn::Price,
            SortColumn::Price => SortColumn::ChangePercent,
            SortColumn::ChangePercent => SortColumn::Listed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Listed => "listed",
            SortColumn::Symbol => "symbol",
            SortColumn::Price => "price",
            SortColumn::ChangePercent => "change",
        }
    }
}

/// Sorts quotes by `column`. Stable, so ties keep server order.
pub fn sort_quotes<'a>(quotes: Cow<'a, [Quote]>, column: SortColumn) -> Cow<'a, [Quote]> {
    let compare: fn(&Quote, &Quote) -> Ordering = match column {
        SortColumn::Listed => return quotes,
        SortColumn::Symbol => |a: &Quote, b: &Quote| a.symbol.cmp(&b.symbol),
        SortColumn::Price => |a: &Quote, b: &Quote| b.price.cmp(&a.price),
        SortColumn::ChangePercent => |a: &Quote, b: &Quote| b.change_percent.cmp(&a.change_percent),
    };
    let mut sorted = quotes.into_owned();
    sorted.sort_by(compare);
    Cow::Owned(sorted)
}

/// Top `n` quotes by change percent, biggest gainers first.
pub fn rank_by_change(quotes: &[Quote], n: usize) -> Vec<&Quote> {
    let mut ranked: Vec<&Quote> = quotes.iter().collect();
    ranked.sort_by(|a, b| b.change_percent.cmp(&a.change_percent));
    ranked.truncate(n);
    ranked
}

/// Price of [`INDEX_SYMBOL`] in the quote list, if listed.
pub fn index_level(quotes: &[Quote]) -> Option<Decimal> {
    quotes
        .iter()
        .find(|q| q.symbol == INDEX_SYMBOL)
        .map(|q| q.price)
}

/// Close and open-to-close change of the newest candle.
pub fn last_candle_change(candles: &[Candle]) -> Option<(Decimal, Decimal)> {
    candles.last().map(|c| (c.close, c.change_percent()))
}

/// Formats a yuan amount with Chinese magnitude units.
///
/// `3.2e13` becomes `¥32.00万亿`, `1.5e11` becomes `¥15.0百亿`.
pub fn format_cny(amount: Decimal) -> String {
    let units: [(Decimal, u32, &str); 5] = [
        (Decimal::from(1_000_000_000_000_u64), 2, "万亿"),
        (Decimal::from(10_000_000_000_u64), 1, "百亿"),
        (Decimal::from(100_000_000_u64), 2, "亿"),
        (Decimal::from(10_000_u64), 2, "万"),
        (Decimal::from(1_000_u64), 2, "千"),
    ];

    for (scale, dp, unit) in units {
        if amount >= scale {
            return format!("¥{}{unit}", fixed(amount / scale, dp));
        }
    }
    format!("¥{}", fixed(amount, 2))
}

/// Signed percentage with two decimals, e.g. `+0.48%`.
pub fn format_percent(value: Decimal) -> String {
    let sign = if value >= Decimal::ZERO { "+" } else { "" };
    format!("{sign}{}%", fixed(value, 2))
}

/// Rounds half away from zero and always prints `dp` decimals.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}
