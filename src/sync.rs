//! Periodic and on-demand synchronization of the view state.
//!
//! The loop is split in two:
//! - [`Synchronizer`] - the synchronous state machine: issues cycle
//!   tokens, reconciles fetch results into [`ViewState`] and rejects stale
//!   writes.
//! - [`spawn`] - the tokio task that drives it: a refresh timer, user
//!   commands, and one spawned task per fetch cycle reporting back over a
//!   channel.
//!
//! Every cycle carries a monotonically increasing token. A result is
//! written only if no newer cycle already wrote the same slice, and
//! candle/order-book results only if they were fetched for the current
//! selection. Issuing order wins, not arrival order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::FetchFailure;
use crate::models::book::OrderBookSnapshot;
use crate::models::candle::Candle;
use crate::models::summary::MarketSummary;
use crate::models::ticker::Quote;
use crate::models::{Indicator, Period};
use crate::source::{self, MarketSource, with_timeout};
use crate::store::{Selection, SelectionKey, Slice, SyncPhase, ViewState};
use crate::{HangqingError, Result};

/// Number of fetches in one cycle.
const PARTS_PER_CYCLE: u8 = 4;

/// Timing and request sizes for the loop.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub ticker_limit: usize,
    pub kline_limit: usize,
    pub book_depth: usize,
}

impl SyncSettings {
    /// Extracts loop settings from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh_interval: config.market.refresh_interval,
            request_timeout: config.api.request_timeout,
            ticker_limit: config.market.ticker_limit,
            kline_limit: config.market.kline_limit,
            book_depth: config.market.book_depth,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            ticker_limit: crate::config::TICKER_LIMIT,
            kline_limit: crate::config::KLINE_LIMIT,
            book_depth: crate::config::BOOK_DEPTH,
        }
    }
}

/// User-driven requests to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    SelectSymbol { symbol: String, name: String },
    SetPeriod(Period),
    ToggleIndicator(Indicator),
    RefreshNow,
    Shutdown,
}

/// Identifies one issued cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    pub token: u64,
    pub key: SelectionKey,
}

/// Result of one of the four fetches.
#[derive(Debug)]
pub enum Part {
    Summary(Result<MarketSummary>),
    Quotes(Result<Vec<Quote>>),
    Candles(Result<Vec<Candle>>),
    OrderBook(Result<OrderBookSnapshot>),
}

impl Part {
    fn name(&self) -> &'static str {
        match self {
            Part::Summary(_) => source::SUMMARY,
            Part::Quotes(_) => source::TICKERS,
            Part::Candles(_) => source::KLINE,
            Part::OrderBook(_) => source::ORDER_BOOK,
        }
    }
}

/// A fetch result tagged with the cycle that issued it.
#[derive(Debug)]
pub struct CycleEvent {
    pub token: u64,
    pub key: SelectionKey,
    pub part: Part,
}

/// What [`Synchronizer::apply`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Written to the view state (success or failure marker).
    Applied,
    /// Dropped: a newer cycle owns the slice or the selection moved on.
    Stale,
    /// First symbol list lacked the selected symbol; selection switched to
    /// the first listed one and a new cycle is needed.
    FellBack,
}

/// Progress of the most recently issued cycle.
#[derive(Debug)]
struct InFlight {
    token: u64,
    remaining: u8,
    any_success: bool,
}

/// Synchronous core of the sync loop. Owns the [`ViewState`].
#[derive(Debug)]
pub struct Synchronizer {
    state: ViewState,
    next_token: u64,
    /// Oldest token allowed to write candles or the order book; cycles
    /// issued before the last selection change are cancelled.
    accept_from: u64,
    in_flight: Option<InFlight>,
    symbol_list_loaded: bool,
    shown: HashSet<SelectionKey>,
}

impl Synchronizer {
    /// Creates an idle synchronizer for the initial selection.
    pub fn new(selection: Selection) -> Self {
        Self {
            state: ViewState::new(selection),
            next_token: 1,
            accept_from: 0,
            in_flight: None,
            symbol_list_loaded: false,
            shown: HashSet::new(),
        }
    }

    /// Current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Issues a new cycle for the current selection.
    ///
    /// The phase becomes `Loading` if this selection has never shown
    /// candles, `Refreshing` otherwise.
    pub fn begin_cycle(&mut self) -> CycleTicket {
        let token = self.next_token;
        self.next_token += 1;

        let key = self.state.selection.key();
        self.state.phase = if self.shown.contains(&key) {
            SyncPhase::Refreshing
        } else {
            SyncPhase::Loading
        };
        self.state.cycle = token;
        self.in_flight = Some(InFlight {
            token,
            remaining: PARTS_PER_CYCLE,
            any_success: false,
        });
        self.bump();

        CycleTicket { token, key }
    }

    /// Switches symbol. Returns `true` if a new cycle is needed.
    pub fn select_symbol(&mut self, symbol: &str, name: &str) -> bool {
        if self.state.selection.symbol == symbol {
            if self.state.selection.symbol_name != name {
                self.state.selection.symbol_name = name.to_string();
                self.bump();
            }
            return false;
        }
        self.state.selection.symbol = symbol.to_string();
        self.state.selection.symbol_name = name.to_string();
        self.reset_for_selection();
        true
    }

    /// Switches period. Returns `true` if a new cycle is needed.
    pub fn set_period(&mut self, period: Period) -> bool {
        if self.state.selection.period == period {
            return false;
        }
        self.state.selection.period = period;
        self.reset_for_selection();
        true
    }

    /// Flips an indicator. Never needs a fetch.
    pub fn toggle_indicator(&mut self, indicator: Indicator) {
        self.state.selection.indicators.toggle(indicator);
        self.bump();
    }

    /// Reconciles one fetch result into the view state.
    pub fn apply(&mut self, event: CycleEvent) -> ApplyOutcome {
        let CycleEvent { token, key, part } = event;
        let part_name = part.name();
        let selection_current = token >= self.accept_from && key == self.state.selection.key();

        let (outcome, succeeded) = match part {
            Part::Summary(result) => write_slice(&mut self.state.summary, token, result),
            Part::Quotes(result) => {
                let result = result.and_then(|q| non_empty(source::TICKERS, q, Vec::is_empty));
                let (outcome, succeeded) = write_slice(&mut self.state.quotes, token, result);
                if succeeded && let Some(fallback) = self.first_list_fallback() {
                    info!(
                        token,
                        from = %self.state.selection.symbol,
                        to = %fallback.symbol,
                        "Selected symbol missing from first symbol list, falling back"
                    );
                    self.state.selection.symbol = fallback.symbol;
                    self.state.selection.symbol_name = fallback.name;
                    self.state.last_refresh = Some(Instant::now());
                    self.reset_for_selection();
                    return ApplyOutcome::FellBack;
                }
                (outcome, succeeded)
            }
            Part::Candles(_) | Part::OrderBook(_) if !selection_current => {
                (ApplyOutcome::Stale, false)
            }
            Part::Candles(result) => {
                let result = result.and_then(|c| non_empty(source::KLINE, c, Vec::is_empty));
                let (outcome, succeeded) = write_slice(&mut self.state.candles, token, result);
                if succeeded {
                    self.shown.insert(key);
                }
                (outcome, succeeded)
            }
            Part::OrderBook(result) => {
                let result = result.and_then(|b| {
                    non_empty(source::ORDER_BOOK, b, OrderBookSnapshot::is_empty)
                });
                write_slice(&mut self.state.order_book, token, result)
            }
        };

        match outcome {
            ApplyOutcome::Stale => {
                debug!(token, part = part_name, "Discarding stale cycle result");
            }
            _ => {
                if succeeded {
                    self.state.last_refresh = Some(Instant::now());
                }
                self.finish_part(token, succeeded);
                self.bump();
            }
        }
        outcome
    }

    /// On the first successful symbol list only, picks the first listed
    /// symbol if the current one is absent.
    fn first_list_fallback(&mut self) -> Option<Quote> {
        if self.symbol_list_loaded {
            return None;
        }
        self.symbol_list_loaded = true;

        let quotes = self.state.quotes.data()?;
        let selected = &self.state.selection.symbol;
        if quotes.iter().any(|q| &q.symbol == selected) {
            return None;
        }
        quotes.first().cloned()
    }

    /// Counts a part against the in-flight cycle and settles the phase
    /// once all four have reported.
    fn finish_part(&mut self, token: u64, succeeded: bool) {
        let Some(cycle) = self.in_flight.as_mut() else {
            return;
        };
        if cycle.token != token {
            return;
        }
        cycle.any_success |= succeeded;
        cycle.remaining = cycle.remaining.saturating_sub(1);
        if cycle.remaining > 0 {
            return;
        }

        let any_success = cycle.any_success;
        self.in_flight = None;
        self.state.phase = match self.state.phase {
            SyncPhase::Loading if !any_success && !self.state.has_any_data() => SyncPhase::Failed,
            _ => SyncPhase::Ready,
        };
        info!(token, phase = self.state.phase.label(), "Cycle complete");
    }

    /// Drops selection-bound data and cancels every cycle issued so far.
    fn reset_for_selection(&mut self) {
        self.accept_from = self.next_token;
        self.state.candles.clear();
        self.state.order_book.clear();
        self.in_flight = None;
        self.bump();
    }

    fn bump(&mut self) {
        self.state.version += 1;
    }
}

/// Writes a result into `slice` unless a newer cycle already wrote it.
/// Returns the outcome and whether the result was a success.
fn write_slice<T>(slice: &mut Slice<T>, token: u64, result: Result<T>) -> (ApplyOutcome, bool) {
    if slice.is_newer_than(token) {
        return (ApplyOutcome::Stale, false);
    }
    match result {
        Ok(value) => {
            slice.succeed(token, value);
            (ApplyOutcome::Applied, true)
        }
        Err(err) => {
            warn!(token, error = %err, "Fetch failed, keeping last good data");
            slice.fail(token, FetchFailure::from(&err));
            (ApplyOutcome::Applied, false)
        }
    }
}

/// Turns an empty payload into [`HangqingError::EmptyResult`].
fn non_empty<T>(endpoint: &'static str, value: T, is_empty: impl Fn(&T) -> bool) -> Result<T> {
    if is_empty(&value) {
        Err(HangqingError::EmptyResult { endpoint })
    } else {
        Ok(value)
    }
}

/// Handle to a running sync loop.
///
/// Dropping every clone of the command sender (including this handle)
/// stops the loop.
#[derive(Debug)]
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<SyncCommand>,
    state: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Sends a command to the loop.
    ///
    /// # Errors
    ///
    /// Returns [`HangqingError::Io`] if the loop has stopped.
    pub fn send(&self, command: SyncCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| HangqingError::Io("sync loop has stopped".to_string()))
    }

    /// A fresh receiver of state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Clones the latest published state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Stops the loop, aborting in-flight cycles, and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.commands.send(SyncCommand::Shutdown);
        if let Err(e) = self.task.await {
            warn!("Sync loop task ended abnormally: {e}");
        }
    }
}

/// Spawns the sync loop on the current tokio runtime.
///
/// The first cycle starts immediately; the refresh timer first fires one
/// interval later.
pub fn spawn<S: MarketSource>(source: S, settings: SyncSettings, selection: Selection) -> SyncHandle {
    let core = Synchronizer::new(selection);
    let (state_tx, state_rx) = watch::channel(core.state().clone());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let sync_loop = SyncLoop {
        source: Arc::new(source),
        settings,
        core,
        state_tx,
        events_tx,
        events_rx,
        cycles: Vec::new(),
    };
    let task = tokio::spawn(sync_loop.run(cmd_rx));

    SyncHandle {
        commands: cmd_tx,
        state: state_rx,
        task,
    }
}

/// Async driver around [`Synchronizer`].
struct SyncLoop<S> {
    source: Arc<S>,
    settings: SyncSettings,
    core: Synchronizer,
    state_tx: watch::Sender<ViewState>,
    events_tx: mpsc::UnboundedSender<CycleEvent>,
    events_rx: mpsc::UnboundedReceiver<CycleEvent>,
    cycles: Vec<JoinHandle<()>>,
}

impl<S: MarketSource> SyncLoop<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SyncCommand>) {
        let period = self.settings.refresh_interval;
        let mut timer = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.start_cycle();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(SyncCommand::Shutdown) => break,
                    Some(command) => {
                        if self.handle_command(command) {
                            timer.reset();
                        }
                    }
                },
                Some(event) = self.events_rx.recv() => {
                    if self.core.apply(event) == ApplyOutcome::FellBack {
                        self.abort_cycles();
                        self.start_cycle();
                        timer.reset();
                    }
                    self.publish();
                }
                _ = timer.tick() => {
                    self.start_cycle();
                }
            }
        }

        self.abort_cycles();
        info!("Sync loop stopped");
    }

    /// Applies a command. Returns `true` if it started a new cycle.
    fn handle_command(&mut self, command: SyncCommand) -> bool {
        let restart = match command {
            SyncCommand::SelectSymbol { symbol, name } => {
                let changed = self.core.select_symbol(&symbol, &name);
                if changed {
                    info!(symbol = %symbol, "Symbol selected");
                }
                changed
            }
            SyncCommand::SetPeriod(period) => {
                let changed = self.core.set_period(period);
                if changed {
                    info!(period = %period, "Period selected");
                }
                changed
            }
            SyncCommand::ToggleIndicator(indicator) => {
                self.core.toggle_indicator(indicator);
                self.publish();
                return false;
            }
            SyncCommand::RefreshNow => {
                self.start_cycle();
                return true;
            }
            SyncCommand::Shutdown => return false,
        };

        if restart {
            self.abort_cycles();
            self.start_cycle();
        } else {
            self.publish();
        }
        restart
    }

    fn start_cycle(&mut self) {
        let ticket = self.core.begin_cycle();
        info!(
            token = ticket.token,
            symbol = %ticket.key.symbol,
            period = %ticket.key.period,
            phase = self.core.state().phase.label(),
            "Starting sync cycle"
        );
        self.publish();

        self.cycles.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(run_cycle(
            Arc::clone(&self.source),
            self.settings.clone(),
            ticket,
            self.events_tx.clone(),
        ));
        self.cycles.push(handle);
    }

    fn abort_cycles(&mut self) {
        for handle in self.cycles.drain(..) {
            handle.abort();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.core.state().clone());
    }
}

/// Runs the four fetches of one cycle concurrently, reporting each result
/// as soon as it is available.
async fn run_cycle<S: MarketSource>(
    source: Arc<S>,
    settings: SyncSettings,
    ticket: CycleTicket,
    events: mpsc::UnboundedSender<CycleEvent>,
) {
    let CycleTicket { token, key } = ticket;
    let limit = settings.request_timeout;
    let report = |part: Part| {
        let _ = events.send(CycleEvent {
            token,
            key: key.clone(),
            part,
        });
    };

    let summary = async {
        let result = with_timeout(source::SUMMARY, limit, source.fetch_summary()).await;
        report(Part::Summary(result));
    };
    let quotes = async {
        let result = with_timeout(
            source::TICKERS,
            limit,
            source.fetch_symbol_list(settings.ticker_limit),
        )
        .await;
        report(Part::Quotes(result));
    };
    let candles = async {
        let result = with_timeout(
            source::KLINE,
            limit,
            source.fetch_candles(&key.symbol, key.period, settings.kline_limit),
        )
        .await;
        report(Part::Candles(result));
    };
    let order_book = async {
        let result = with_timeout(
            source::ORDER_BOOK,
            limit,
            source.fetch_order_book(&key.symbol, settings.book_depth),
        )
        .await;
        report(Part::OrderBook(result));
    };

    tokio::join!(summary, quotes, candles, order_book);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::models::book::BookLevel;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn selection() -> Selection {
        Selection::new("000001.SH", "上证指数", Period::D1)
    }

    fn quote(symbol: &str, name: &str) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: dec!(10),
            change_absolute: dec!(0.1),
            change_percent: dec!(1.0),
            volume: dec!(1000),
        }
    }

    fn candle(close: Decimal) -> Candle {
        Candle {
            timestamp: "2024-03-01T00:00:00".to_string(),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1),
        }
    }

    fn book(best_bid: Decimal) -> OrderBookSnapshot {
        OrderBookSnapshot {
            bids: vec![BookLevel {
                price: best_bid,
                amount: dec!(5),
                total: best_bid * dec!(5),
            }],
            asks: vec![],
        }
    }

    fn event(ticket: &CycleTicket, part: Part) -> CycleEvent {
        CycleEvent {
            token: ticket.token,
            key: ticket.key.clone(),
            part,
        }
    }

    fn network_error() -> HangqingError {
        HangqingError::Status {
            endpoint: source::ORDER_BOOK,
            status: 503,
        }
    }

    /// Feeds a full successful cycle for the current selection.
    fn complete_cycle(sync: &mut Synchronizer, close: Decimal) -> CycleTicket {
        let ticket = sync.begin_cycle();
        let symbol = ticket.key.symbol.clone();
        sync.apply(event(&ticket, Part::Summary(Ok(MarketSummary::default()))));
        sync.apply(event(&ticket, Part::Quotes(Ok(vec![quote(&symbol, "x")]))));
        sync.apply(event(&ticket, Part::Candles(Ok(vec![candle(close)]))));
        sync.apply(event(&ticket, Part::OrderBook(Ok(book(close)))));
        ticket
    }

    #[test]
    fn first_cycle_loads_then_becomes_ready() {
        let mut sync = Synchronizer::new(selection());
        assert_eq!(sync.state().phase, SyncPhase::Idle);

        let ticket = sync.begin_cycle();
        assert_eq!(ticket.token, 1);
        assert_eq!(sync.state().phase, SyncPhase::Loading);

        sync.apply(event(&ticket, Part::Summary(Ok(MarketSummary::default()))));
        sync.apply(event(&ticket, Part::Quotes(Ok(vec![quote("000001.SH", "上证指数")]))));
        sync.apply(event(&ticket, Part::Candles(Ok(vec![candle(dec!(10))]))));
        assert_eq!(sync.state().phase, SyncPhase::Loading);
        sync.apply(event(&ticket, Part::OrderBook(Ok(book(dec!(10))))));

        assert_eq!(sync.state().phase, SyncPhase::Ready);
        assert!(sync.state().last_refresh.is_some());

        let next = sync.begin_cycle();
        assert_eq!(next.token, 2);
        assert_eq!(sync.state().phase, SyncPhase::Refreshing);
    }

    #[test]
    fn older_cycle_resolving_late_never_overwrites_newer() {
        let mut sync = Synchronizer::new(selection());
        let a = sync.begin_cycle();
        let b = sync.begin_cycle();

        assert_eq!(
            sync.apply(event(&b, Part::Candles(Ok(vec![candle(dec!(20))])))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            sync.apply(event(&b, Part::OrderBook(Ok(book(dec!(20)))))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            sync.apply(event(&a, Part::Candles(Ok(vec![candle(dec!(10))])))),
            ApplyOutcome::Stale
        );
        assert_eq!(
            sync.apply(event(&a, Part::OrderBook(Ok(book(dec!(10)))))),
            ApplyOutcome::Stale
        );

        let state = sync.state();
        assert_eq!(state.candles.data().unwrap()[0].close, dec!(20));
        assert_eq!(state.order_book.data().unwrap().bids[0].price, dec!(20));
        assert_eq!(state.candles.token(), b.token);
    }

    #[test]
    fn late_failure_from_older_cycle_is_also_discarded() {
        let mut sync = Synchronizer::new(selection());
        let a = sync.begin_cycle();
        let b = sync.begin_cycle();

        sync.apply(event(&b, Part::OrderBook(Ok(book(dec!(20))))));
        let outcome = sync.apply(event(&a, Part::OrderBook(Err(network_error()))));

        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(sync.state().order_book.error().is_none());
    }

    #[test]
    fn order_book_failure_keeps_prior_candles() {
        let mut sync = Synchronizer::new(selection());
        complete_cycle(&mut sync, dec!(10));

        let ticket = sync.begin_cycle();
        sync.apply(event(&ticket, Part::OrderBook(Err(network_error()))));

        let state = sync.state();
        assert_eq!(state.candles.data().unwrap()[0].close, dec!(10));
        assert_eq!(state.order_book.data().unwrap().bids[0].price, dec!(10));
        let failure = state.order_book.error().unwrap();
        assert_eq!(failure.kind, FailureKind::Network);
        assert!(state.candles.error().is_none());
    }

    #[test]
    fn results_for_previous_selection_are_discarded() {
        let mut sync = Synchronizer::new(selection());
        let old = sync.begin_cycle();

        assert!(sync.select_symbol("600036.SH", "招商银行"));
        let new = sync.begin_cycle();

        assert_eq!(
            sync.apply(event(&old, Part::Candles(Ok(vec![candle(dec!(1))])))),
            ApplyOutcome::Stale
        );
        assert!(sync.state().candles.data().is_none());

        sync.apply(event(&new, Part::Candles(Ok(vec![candle(dec!(33))]))));
        assert_eq!(sync.state().candles.data().unwrap()[0].close, dec!(33));
    }

    #[test]
    fn cancelled_cycle_stays_discarded_after_switching_back() {
        let mut sync = Synchronizer::new(selection());
        let cancelled = sync.begin_cycle();

        assert!(sync.select_symbol("600036.SH", "招商银行"));
        sync.begin_cycle();
        assert!(sync.select_symbol("000001.SH", "上证指数"));
        let current = sync.begin_cycle();

        // Same key as the current selection, but issued before the switch.
        assert_eq!(cancelled.key, current.key);
        assert_eq!(
            sync.apply(event(&cancelled, Part::Candles(Ok(vec![candle(dec!(99))])))),
            ApplyOutcome::Stale
        );
        assert_eq!(
            sync.apply(event(&cancelled, Part::OrderBook(Ok(book(dec!(99)))))),
            ApplyOutcome::Stale
        );
        assert!(sync.state().candles.data().is_none());
        assert!(sync.state().order_book.data().is_none());

        sync.apply(event(&current, Part::Candles(Ok(vec![candle(dec!(12))]))));
        assert_eq!(sync.state().candles.data().unwrap()[0].close, dec!(12));
    }

    #[test]
    fn selection_change_clears_chart_data_and_reloads() {
        let mut sync = Synchronizer::new(selection());
        complete_cycle(&mut sync, dec!(10));

        assert!(sync.set_period(Period::H1));
        assert!(sync.state().candles.data().is_none());
        assert!(sync.state().order_book.data().is_none());
        assert!(sync.state().quotes.data().is_some());

        sync.begin_cycle();
        assert_eq!(sync.state().phase, SyncPhase::Loading);

        // Back to a selection that has already shown candles.
        assert!(sync.set_period(Period::D1));
        sync.begin_cycle();
        assert_eq!(sync.state().phase, SyncPhase::Refreshing);
    }

    #[test]
    fn unchanged_selection_does_not_restart() {
        let mut sync = Synchronizer::new(selection());
        assert!(!sync.select_symbol("000001.SH", "上证指数"));
        assert!(!sync.set_period(Period::D1));
    }

    #[test]
    fn first_list_without_selected_symbol_falls_back_once() {
        let mut sync = Synchronizer::new(selection());
        let first = sync.begin_cycle();
        let listed = vec![
            quote("600036.SH", "招商银行"),
            quote("000858.SZ", "五粮液"),
            quote("601318.SH", "中国平安"),
        ];

        let outcome = sync.apply(event(&first, Part::Quotes(Ok(listed.clone()))));
        assert_eq!(outcome, ApplyOutcome::FellBack);
        assert_eq!(sync.state().selection.symbol, "600036.SH");
        assert_eq!(sync.state().selection.symbol_name, "招商银行");

        // The user goes back to the default symbol, which is still unlisted.
        assert!(sync.select_symbol("000001.SH", "上证指数"));
        let later = sync.begin_cycle();
        let outcome = sync.apply(event(&later, Part::Quotes(Ok(listed))));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(sync.state().selection.symbol, "000001.SH");
    }

    #[test]
    fn listed_symbol_is_kept_on_first_load() {
        let mut sync = Synchronizer::new(selection());
        let ticket = sync.begin_cycle();
        let outcome = sync.apply(event(
            &ticket,
            Part::Quotes(Ok(vec![quote("600036.SH", "a"), quote("000001.SH", "b")])),
        ));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(sync.state().selection.symbol, "000001.SH");
    }

    #[test]
    fn empty_symbol_list_is_an_empty_result_and_defers_fallback() {
        let mut sync = Synchronizer::new(selection());
        let first = sync.begin_cycle();
        sync.apply(event(&first, Part::Quotes(Ok(vec![]))));
        assert_eq!(
            sync.state().quotes.error().unwrap().kind,
            FailureKind::EmptyResult
        );

        let second = sync.begin_cycle();
        let outcome = sync.apply(event(&second, Part::Quotes(Ok(vec![quote("600036.SH", "a")]))));
        assert_eq!(outcome, ApplyOutcome::FellBack);
    }

    #[test]
    fn initial_cycle_with_every_part_failing_is_failed() {
        let mut sync = Synchronizer::new(selection());
        let ticket = sync.begin_cycle();
        sync.apply(event(&ticket, Part::Summary(Err(network_error()))));
        sync.apply(event(&ticket, Part::Quotes(Err(network_error()))));
        sync.apply(event(&ticket, Part::Candles(Err(network_error()))));
        sync.apply(event(&ticket, Part::OrderBook(Err(network_error()))));

        assert_eq!(sync.state().phase, SyncPhase::Failed);
        assert!(!sync.state().has_any_data());
    }

    #[test]
    fn failing_second_cycle_during_initial_load_is_not_failed() {
        let mut sync = Synchronizer::new(selection());
        let first = sync.begin_cycle();
        let second = sync.begin_cycle();
        assert_eq!(sync.state().phase, SyncPhase::Loading);

        sync.apply(event(&first, Part::Summary(Ok(MarketSummary::default()))));
        sync.apply(event(&first, Part::Quotes(Ok(vec![quote("000001.SH", "上证指数")]))));
        sync.apply(event(&first, Part::Candles(Ok(vec![candle(dec!(10))]))));
        sync.apply(event(&first, Part::OrderBook(Ok(book(dec!(10))))));

        sync.apply(event(&second, Part::Summary(Err(network_error()))));
        sync.apply(event(&second, Part::Quotes(Err(network_error()))));
        sync.apply(event(&second, Part::Candles(Err(network_error()))));
        sync.apply(event(&second, Part::OrderBook(Err(network_error()))));

        assert_eq!(sync.state().phase, SyncPhase::Ready);
        assert!(matches!(
            sync.state().load_state(),
            crate::store::LoadState::ReadyWithStaleData(_)
        ));
        assert_eq!(sync.state().candles.data().unwrap()[0].close, dec!(10));
    }

    #[test]
    fn failing_refresh_settles_ready_with_stale_data() {
        let mut sync = Synchronizer::new(selection());
        complete_cycle(&mut sync, dec!(10));

        let ticket = sync.begin_cycle();
        sync.apply(event(&ticket, Part::Summary(Err(network_error()))));
        sync.apply(event(&ticket, Part::Quotes(Err(network_error()))));
        sync.apply(event(&ticket, Part::Candles(Err(network_error()))));
        sync.apply(event(&ticket, Part::OrderBook(Err(network_error()))));

        assert_eq!(sync.state().phase, SyncPhase::Ready);
        assert!(matches!(
            sync.state().load_state(),
            crate::store::LoadState::ReadyWithStaleData(_)
        ));
        assert_eq!(sync.state().candles.data().unwrap()[0].close, dec!(10));
    }

    #[test]
    fn indicator_toggle_bumps_version_without_cycle() {
        let mut sync = Synchronizer::new(selection());
        let before = sync.state().version;
        sync.toggle_indicator(Indicator::MovingAverage);
        assert!(sync.state().version > before);
        assert!(!sync.state().selection.indicators.moving_average);
        assert_eq!(sync.state().cycle, 0);
    }
}
