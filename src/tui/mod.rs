//! Terminal dashboard for the chart synchronizer.
//!
//! Renders [`ViewState`](crate::store::ViewState) snapshots and the
//! [`ChartSpec`](crate::chart::ChartSpec) built from them, and turns key
//! presses into sync loop commands.

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod panels;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, Event, Message};
pub use terminal::{Tui, install_panic_hook, restore_terminal, setup_terminal};
pub use ui::render;
