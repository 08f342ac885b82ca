//! Backtest orchestrator — the `Idle → Running → Idle` run protocol.
//!
//! A run is split into `begin` (guard, build the request, enter Running) and
//! `complete` (apply or discard the outcome, return to Idle). The I/O between
//! the two happens elsewhere: inline in the CLI session, on the worker thread
//! in the TUI. At most one run is in flight; a `begin` while Running is
//! rejected and never queued.

use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::aggregate::{aggregate, AggregatedView};
use crate::catalog::BasketCatalog;
use crate::request::{BacktestRequest, RunFingerprint};
use crate::result::BacktestResultRow;
use crate::selection::SelectionState;

/// Busy/idle state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Why `begin` refused to start a run. None of these change any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunRejected {
    #[error("no strategy or basket selected yet")]
    NotReady,
    #[error("a backtest is already running")]
    Busy,
    #[error("basket '{0}' is not in the catalog")]
    UnknownBasket(String),
}

/// What `complete` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Result set replaced with this many rows.
    Applied { rows: usize },
    /// Run failed; previous results kept.
    Failed,
    /// No run was in flight; outcome ignored.
    Stale,
}

/// Owns the run state, the latest result set, and the view derived from it.
#[derive(Debug)]
pub struct Orchestrator {
    state: RunState,
    in_flight: Option<RunFingerprint>,
    results: Arc<[BacktestResultRow]>,
    view: AggregatedView,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self {
            state: RunState::Idle,
            in_flight: None,
            results: Arc::from(Vec::new()),
            view: AggregatedView::empty(),
        }
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Fingerprint of the run in flight.
    pub fn in_flight(&self) -> Option<&RunFingerprint> {
        self.in_flight.as_ref()
    }

    /// Latest successful result set. Swapped whole on every successful run.
    pub fn results(&self) -> &Arc<[BacktestResultRow]> {
        &self.results
    }

    /// Aggregated view of `results()`.
    pub fn view(&self) -> &AggregatedView {
        &self.view
    }

    /// Guard and start a run.
    ///
    /// Checks, in order: both selections present, not already running, basket
    /// known to the catalog. On success the state is Running and the returned
    /// request must be dispatched, then answered with `complete`.
    pub fn begin(
        &mut self,
        selection: &SelectionState,
        baskets: &BasketCatalog,
    ) -> Result<BacktestRequest, RunRejected> {
        let (Some(strategy), Some(basket)) = (selection.strategy_id(), selection.basket_name())
        else {
            debug!("run ignored: selection incomplete");
            return Err(RunRejected::NotReady);
        };
        if self.is_running() {
            debug!("run ignored: already running");
            return Err(RunRejected::Busy);
        }
        let Some(symbols) = baskets.symbols(basket) else {
            warn!(basket, "run refused: basket not in catalog");
            return Err(RunRejected::UnknownBasket(basket.to_string()));
        };

        let request = BacktestRequest::new(strategy, symbols.to_vec());
        let fingerprint = request.fingerprint();
        info!(
            run = %fingerprint,
            strategy,
            basket,
            symbols = request.basket.len(),
            "backtest started"
        );
        self.state = RunState::Running;
        self.in_flight = Some(fingerprint);
        Ok(request)
    }

    /// Finish the run in flight.
    ///
    /// Success replaces the result set and recomputes the view. Failure keeps
    /// the previous results. Either way the state returns to Idle.
    pub fn complete<E: Display>(
        &mut self,
        outcome: Result<Vec<BacktestResultRow>, E>,
    ) -> RunOutcome {
        if !self.is_running() {
            warn!("backtest outcome arrived with no run in flight; ignored");
            return RunOutcome::Stale;
        }
        let fingerprint = self.in_flight.take();
        self.state = RunState::Idle;

        match outcome {
            Ok(rows) => {
                let count = rows.len();
                self.view = aggregate(&rows);
                self.results = rows.into();
                info!(
                    run = fingerprint.as_ref().map(|f| f.as_str()).unwrap_or("-"),
                    rows = count,
                    total_pnl = self.view.total_pnl,
                    "backtest completed"
                );
                RunOutcome::Applied { rows: count }
            }
            Err(e) => {
                error!(
                    run = fingerprint.as_ref().map(|f| f.as_str()).unwrap_or("-"),
                    error = %e,
                    "backtest failed; keeping previous results"
                );
                RunOutcome::Failed
            }
        }
    }
}
