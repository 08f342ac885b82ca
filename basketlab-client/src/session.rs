//! Run session — catalog, selection, and orchestrator bound to one service.
//!
//! The CLI drives a session synchronously. The TUI keeps the same pieces on
//! its `AppState` and ships the I/O to a worker thread instead.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use basketlab_core::{
    validate_rows, AggregatedView, BacktestResultRow, Catalog, Orchestrator, RowIssue,
    RunFingerprint, RunRejected, SelectionState,
};

use crate::error::ServiceError;
use crate::loader::{load_catalog, LoadReport};
use crate::service::BacktestService;

/// Errors from a synchronous run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("run rejected: {0}")]
    Rejected(#[from] RunRejected),
    #[error("backtest failed: {0}")]
    Service(#[from] ServiceError),
}

/// A run whose results were applied.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub fingerprint: RunFingerprint,
    pub rows: Arc<[BacktestResultRow]>,
    /// Rows with non-numeric PnL text. They are kept and show up as NaN.
    pub issues: Vec<RowIssue>,
}

pub struct Session<S: BacktestService> {
    service: S,
    catalog: Catalog,
    selection: SelectionState,
    orchestrator: Orchestrator,
}

impl<S: BacktestService> Session<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            catalog: Catalog::default(),
            selection: SelectionState::new(),
            orchestrator: Orchestrator::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn view(&self) -> &AggregatedView {
        self.orchestrator.view()
    }

    /// Fetch strategies and baskets, apply what succeeded, seed the selection.
    pub fn load_catalog(&mut self) -> LoadReport {
        load_catalog(&self.service, &mut self.catalog, &mut self.selection)
    }

    pub fn select_strategy(&mut self, id: impl Into<String>) {
        self.selection.select_strategy(id);
    }

    pub fn select_basket(&mut self, name: impl Into<String>) {
        self.selection.select_basket(name);
    }

    /// Run the current selection to completion.
    ///
    /// Rejections dispatch nothing. A service failure keeps the previous
    /// results; success replaces them.
    pub fn run_backtest(&mut self) -> Result<RunReport, RunError> {
        let request = self
            .orchestrator
            .begin(&self.selection, &self.catalog.baskets)?;
        let fingerprint = request.fingerprint();

        match self.service.run_backtest(&request) {
            Ok(rows) => {
                let issues = validate_rows(&rows);
                for issue in &issues {
                    warn!(run = %fingerprint, %issue, "non-numeric PnL in result row");
                }
                self.orchestrator.complete::<ServiceError>(Ok(rows));
                Ok(RunReport {
                    fingerprint,
                    rows: Arc::clone(self.orchestrator.results()),
                    issues,
                })
            }
            Err(e) => {
                self.orchestrator.complete::<&ServiceError>(Err(&e));
                Err(RunError::Service(e))
            }
        }
    }
}
