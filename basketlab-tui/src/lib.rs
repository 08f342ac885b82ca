//! BasketLab TUI — four-panel terminal front end for basket backtests.
//!
//! Panels:
//! 1. Baskets — service-ordered basket selector
//! 2. Strategies — strategy selector with default parameters
//! 3. Results — per-symbol PnL chart, row table, signed total
//! 4. Help — keyboard shortcuts

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, ErrorCategory, Panel};
pub use worker::{spawn_worker, WorkerCommand, WorkerResponse};
