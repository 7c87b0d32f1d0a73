//! View state shared with the render layer.
//!
//! [`ViewState`] is owned and mutated by the sync loop only. The UI sees
//! cloned snapshots published over a `watch` channel; the data inside each
//! [`Slice`] is behind an `Arc`, so a snapshot is cheap.

use std::sync::Arc;
use std::time::Instant;

use crate::error::FetchFailure;
use crate::models::book::OrderBookSnapshot;
use crate::models::candle::Candle;
use crate::models::summary::MarketSummary;
use crate::models::ticker::Quote;
use crate::models::{IndicatorSet, Period};

/// What the user is looking at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub symbol_name: String,
    pub period: Period,
    pub indicators: IndicatorSet,
}

impl Selection {
    /// Creates a selection with every indicator enabled.
    pub fn new(symbol: impl Into<String>, symbol_name: impl Into<String>, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            symbol_name: symbol_name.into(),
            period,
            indicators: IndicatorSet::default(),
        }
    }

    /// The part of the selection that determines what gets fetched.
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            symbol: self.symbol.clone(),
            period: self.period,
        }
    }
}

/// Symbol and period a candle or order book fetch was issued for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub symbol: String,
    pub period: Period,
}

/// One independently fetched piece of view state.
///
/// Holds the last good value, the failure of the most recent attempt (if
/// it failed) and the token of the cycle that last wrote it.
#[derive(Clone, Debug)]
pub struct Slice<T> {
    data: Option<Arc<T>>,
    error: Option<FetchFailure>,
    token: u64,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            token: 0,
        }
    }
}

impl<T> Slice<T> {
    /// Last good value, if any cycle ever succeeded.
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    /// Shared handle to the last good value.
    pub fn shared(&self) -> Option<Arc<T>> {
        self.data.clone()
    }

    /// Failure of the latest accepted attempt.
    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    /// Token of the cycle that last wrote this slice.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Returns `true` if a write from `token` would overwrite newer results.
    pub fn is_newer_than(&self, token: u64) -> bool {
        self.token > token
    }

    pub(crate) fn succeed(&mut self, token: u64, value: T) {
        self.data = Some(Arc::new(value));
        self.error = None;
        self.token = token;
    }

    /// Records a failure and keeps the last good value.
    pub(crate) fn fail(&mut self, token: u64, failure: FetchFailure) {
        self.error = Some(failure);
        self.token = token;
    }

    /// Drops data that belonged to a previous selection. The token is
    /// kept so older cycles still cannot write.
    pub(crate) fn clear(&mut self) {
        self.data = None;
        self.error = None;
    }
}

/// Sync loop phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPhase {
    /// No cycle issued yet.
    #[default]
    Idle,
    /// First cycle for a selection that has never shown candles.
    Loading,
    /// Latest cycle finished.
    Ready,
    /// Background cycle in progress over already-shown data.
    Refreshing,
    /// Every part of an initial cycle failed.
    Failed,
}

impl SyncPhase {
    /// Returns a display string for the phase.
    pub fn label(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "Idle",
            SyncPhase::Loading => "Loading...",
            SyncPhase::Ready => "Live",
            SyncPhase::Refreshing => "Refreshing...",
            SyncPhase::Failed => "Failed",
        }
    }
}

/// Page-level presentation derived from the state.
///
/// Stale data always wins over a blank screen: once anything has loaded,
/// failures surface as [`LoadState::ReadyWithStaleData`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NoData,
    Loading,
    Ready,
    ErrorWithNoData(FetchFailure),
    ReadyWithStaleData(FetchFailure),
}

/// Single source of truth for the render layer.
#[derive(Clone, Debug)]
pub struct ViewState {
    /// Bumped on every accepted mutation.
    pub version: u64,
    /// Token of the most recently issued cycle.
    pub cycle: u64,
    pub selection: Selection,
    pub phase: SyncPhase,
    pub summary: Slice<MarketSummary>,
    pub quotes: Slice<Vec<Quote>>,
    pub candles: Slice<Vec<Candle>>,
    pub order_book: Slice<OrderBookSnapshot>,
    /// When a cycle last delivered any successful part.
    pub last_refresh: Option<Instant>,
}

impl ViewState {
    /// Creates an empty state for the initial selection.
    pub fn new(selection: Selection) -> Self {
        Self {
            version: 0,
            cycle: 0,
            selection,
            phase: SyncPhase::Idle,
            summary: Slice::default(),
            quotes: Slice::default(),
            candles: Slice::default(),
            order_book: Slice::default(),
            last_refresh: None,
        }
    }

    /// Returns `true` if any slice holds data.
    pub fn has_any_data(&self) -> bool {
        self.summary.data().is_some()
            || self.quotes.data().is_some()
            || self.candles.data().is_some()
            || self.order_book.data().is_some()
    }

    /// Current failure markers, labelled by slice.
    pub fn errors(&self) -> impl Iterator<Item = (&'static str, &FetchFailure)> {
        [
            ("summary", self.summary.error()),
            ("quotes", self.quotes.error()),
            ("candles", self.candles.error()),
            ("order book", self.order_book.error()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
    }

    /// Page-level presentation state.
    pub fn load_state(&self) -> LoadState {
        let first_error = self.errors().next().map(|(_, e)| e.clone());

        if self.has_any_data() {
            return match first_error {
                Some(err) => LoadState::ReadyWithStaleData(err),
                None => LoadState::Ready,
            };
        }
        if self.phase == SyncPhase::Loading {
            return LoadState::Loading;
        }
        match first_error {
            Some(err) => LoadState::ErrorWithNoData(err),
            None => LoadState::NoData,
        }
    }
}
