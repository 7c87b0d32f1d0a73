//! Live market chart synchronizer.
//!
//! Keeps a market summary, a quote list, candles and an order book for the
//! selected symbol fresh by polling a dashboard REST API, derives
//! moving-average indicators, and builds a declarative chart description.
//! Results from superseded fetch cycles never overwrite newer data.
//!
//! - [`source`] - the HTTP data source behind the [`source::MarketSource`] trait
//! - [`sync`] - the refresh loop and its cycle-token reconciliation
//! - [`store`] - the view state published to the render layer
//! - [`indicators`], [`chart`], [`display`] - pure derivations for rendering
//! - [`tui`] - the terminal dashboard

pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod indicators;
pub mod models;
pub mod source;
pub mod store;
pub mod sync;
pub mod tui;

pub use error::{HangqingError, Result};
