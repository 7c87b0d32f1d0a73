use std::fs::File;
use std::sync::Mutex;

use hangqing::HangqingError;
use hangqing::config::{LogConfig, fetch_config};
use hangqing::source::HttpSource;
use hangqing::store::Selection;
use hangqing::sync::{self, SyncHandle, SyncSettings};
use hangqing::tui::event::{spawn_event_reader, spawn_tick_timer, update};
use hangqing::tui::{App, Tui, install_panic_hook, render, restore_terminal, setup_terminal};
use tokio::sync::mpsc;
use tracing::info;

/// UI tick, drives the "updated Ns ago" label and error expiry.
const TICK_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<(), HangqingError> {
    let app_config = fetch_config()?;
    init_logging(&app_config.log)?;

    let market = &app_config.market;
    info!(
        api = %app_config.api.base_url,
        symbol = %market.default_symbol,
        period = %market.period,
        "Starting dashboard"
    );

    let source = HttpSource::new(app_config.api.base_url.clone(), app_config.api.request_timeout)?;
    let selection = Selection::new(
        market.default_symbol.clone(),
        market.default_symbol_name.clone(),
        market.period,
    );
    let sync = sync::spawn(source, SyncSettings::from_config(&app_config), selection);

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &sync, market.ma_windows.clone()).await;
    restore_terminal(&mut terminal)?;

    sync.shutdown().await;
    info!("Dashboard closed");
    result
}

/// Writes logs to a file; the terminal belongs to the dashboard.
fn init_logging(config: &LogConfig) -> Result<(), HangqingError> {
    let file = File::create(&config.file).map_err(|e| {
        HangqingError::Io(format!("cannot open log file {}: {e}", config.file.display()))
    })?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.level)
        .init();
    Ok(())
}

/// Draws snapshots and forwards key actions until the user quits.
async fn run(terminal: &mut Tui, sync: &SyncHandle, ma_windows: Vec<usize>) -> Result<(), HangqingError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx, TICK_MS);

    let mut states = sync.subscribe();
    let mut app = App::new(states.borrow_and_update().clone(), ma_windows);

    loop {
        terminal
            .draw(|frame| render(frame, &app))
            .map_err(|e| HangqingError::Io(e.to_string()))?;

        tokio::select! {
            Some(message) = rx.recv() => {
                if let Some(action) = update(&mut app, message)
                    && let Err(e) = sync.send(action.into())
                {
                    app.show_error(e.to_string());
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Err(HangqingError::Io("sync loop has stopped".to_string()));
                }
                let view = states.borrow_and_update().clone();
                app.apply_view(view);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
