//! BasketLab Core — selection and orchestration state for basket backtests.
//!
//! This crate holds everything that is pure state and data transformation:
//! - Catalog types (strategies, ordered basket → symbols map)
//! - Selection state seeded from the catalog
//! - Backtest request construction and run fingerprints
//! - The `Idle → Running → Idle` orchestrator with its at-most-one-run guard
//! - Result rows, boundary validation, and the PnL aggregator
//!
//! No I/O happens here; the client crate talks to the service.

pub mod aggregate;
pub mod catalog;
pub mod orchestrator;
pub mod request;
pub mod result;
pub mod selection;

pub use aggregate::{aggregate, AggregatedView, PnlSign, SymbolPnl};
pub use catalog::{BasketCatalog, Catalog, ParamValue, Params, Strategy};
pub use orchestrator::{Orchestrator, RunOutcome, RunRejected, RunState};
pub use request::{BacktestRequest, RunFingerprint};
pub use result::{validate_rows, BacktestResultRow, RowField, RowIssue};
pub use selection::SelectionState;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: state handed to the worker thread is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Catalog>();
        require_sync::<Catalog>();
        require_send::<BacktestRequest>();
        require_sync::<BacktestRequest>();
        require_send::<BacktestResultRow>();
        require_sync::<BacktestResultRow>();
        require_send::<RunFingerprint>();
        require_sync::<RunFingerprint>();
        require_send::<Orchestrator>();
        require_sync::<Orchestrator>();
        require_send::<AggregatedView>();
        require_sync::<AggregatedView>();
    }
}
