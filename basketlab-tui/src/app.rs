//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use basketlab_client::{CatalogFetch, ServiceError};
use basketlab_core::{
    validate_rows, Catalog, Orchestrator, RowIssue, RunOutcome, RunRejected, SelectionState,
};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Error history length.
pub const MAX_ERRORS: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Baskets,
    Strategies,
    Results,
    Help,
}

impl Panel {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Panel::Baskets => 0,
            Panel::Strategies => 1,
            Panel::Results => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Baskets),
            1 => Some(Panel::Strategies),
            2 => Some(Panel::Results),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Baskets => "Baskets",
            Panel::Strategies => "Strategies",
            Panel::Results => "Results",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Baskets)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT)
            .unwrap_or(Panel::Baskets)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Service unreachable.
    Network,
    /// Service answered with a non-2xx status.
    Service,
    /// Malformed payload.
    Data,
    /// Non-numeric PnL in a result row.
    NanMetrics,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Service => "SVC",
            ErrorCategory::Data => "DATA",
            ErrorCategory::NanMetrics => "NaN",
            ErrorCategory::Other => "ERR",
        }
    }

    pub fn of(err: &ServiceError) -> Self {
        match err {
            ServiceError::Network(_) => ErrorCategory::Network,
            ServiceError::Status { .. } => ErrorCategory::Service,
            ServiceError::Decode(_) => ErrorCategory::Data,
            ServiceError::Client(_) => ErrorCategory::Other,
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Domain state
    pub catalog: Catalog,
    pub selection: SelectionState,
    pub orchestrator: Orchestrator,
    pub catalog_loading: bool,
    /// Flagged rows from the latest applied run.
    pub row_issues: Vec<RowIssue>,

    // Cursors
    pub basket_cursor: usize,
    pub strategy_cursor: usize,
    pub results_scroll: usize,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    /// Cleared once the worker's response channel disconnects.
    pub worker_alive: bool,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(worker_tx: Sender<WorkerCommand>, worker_rx: Receiver<WorkerResponse>) -> Self {
        Self {
            active_panel: Panel::Baskets,
            running: true,
            catalog: Catalog::default(),
            selection: SelectionState::new(),
            orchestrator: Orchestrator::new(),
            catalog_loading: false,
            row_issues: Vec::new(),
            basket_cursor: 0,
            strategy_cursor: 0,
            results_scroll: 0,
            worker_tx,
            worker_rx,
            worker_alive: true,
            status_message: None,
            error_history: VecDeque::with_capacity(MAX_ERRORS),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    /// Ask the worker for strategies and baskets. Ignored while a load is pending.
    pub fn request_catalog(&mut self) {
        if self.catalog_loading {
            return;
        }
        if self.worker_tx.send(WorkerCommand::LoadCatalog).is_err() {
            self.push_error(
                ErrorCategory::Other,
                "Worker unavailable".into(),
                "catalog load".into(),
            );
            return;
        }
        self.catalog_loading = true;
        self.set_status("Loading strategies and baskets…");
    }

    pub fn apply_catalog(&mut self, fetch: CatalogFetch) {
        self.catalog_loading = false;
        let report = fetch.apply(&mut self.catalog, &mut self.selection);
        self.sync_cursors();

        if report.is_complete_success() {
            self.set_status(format!(
                "Loaded {} strategies, {} baskets",
                self.catalog.strategies.len(),
                self.catalog.baskets.len()
            ));
            return;
        }
        for (part, err) in report.failures {
            self.push_error(
                ErrorCategory::of(&err),
                format!("Failed to load {part}: {err}"),
                "catalog load (press r to retry)".into(),
            );
        }
    }

    /// Point the selector cursors at the current selection.
    pub fn sync_cursors(&mut self) {
        if let Some(i) = self
            .selection
            .basket_name()
            .and_then(|name| self.catalog.baskets.position(name))
        {
            self.basket_cursor = i;
        }
        if let Some(i) = self
            .selection
            .strategy_id()
            .and_then(|id| self.catalog.strategy_position(id))
        {
            self.strategy_cursor = i;
        }
    }

    /// The run action is enabled.
    pub fn can_run(&self) -> bool {
        self.selection.is_complete() && !self.orchestrator.is_running()
    }

    pub fn select_basket_at_cursor(&mut self) {
        let Some(name) = self.catalog.baskets.name_at(self.basket_cursor) else {
            return;
        };
        let name = name.to_string();
        self.set_status(format!("Basket: {name}"));
        self.selection.select_basket(name);
    }

    pub fn select_strategy_at_cursor(&mut self) {
        let Some(strategy) = self.catalog.strategies.get(self.strategy_cursor) else {
            return;
        };
        let (id, name) = (strategy.id.clone(), strategy.name.clone());
        self.set_status(format!("Strategy: {name}"));
        self.selection.select_strategy(id);
    }

    /// Start a backtest of the current selection on the worker.
    pub fn run_backtest(&mut self) {
        let request = match self.orchestrator.begin(&self.selection, &self.catalog.baskets) {
            Ok(request) => request,
            Err(RunRejected::Busy) => {
                self.set_warning("A backtest is already running");
                return;
            }
            Err(RunRejected::NotReady) => {
                self.set_warning("Select a strategy and a basket first");
                return;
            }
            Err(e @ RunRejected::UnknownBasket(_)) => {
                self.push_error(ErrorCategory::Other, e.to_string(), "run".into());
                return;
            }
        };

        let fingerprint = request.fingerprint();
        if self
            .worker_tx
            .send(WorkerCommand::RunBacktest { request })
            .is_err()
        {
            self.orchestrator.complete::<&str>(Err("worker unavailable"));
            self.push_error(
                ErrorCategory::Other,
                "Worker unavailable".into(),
                format!("run {fingerprint}"),
            );
            return;
        }
        self.set_status(format!("Running… [{fingerprint}]"));
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::CatalogLoaded(fetch) => self.apply_catalog(fetch),
            WorkerResponse::BacktestComplete { fingerprint, rows } => {
                if self.orchestrator.in_flight() != Some(&fingerprint) {
                    warn!(run = %fingerprint, "response for a run not in flight; ignored");
                    return;
                }
                let issues = validate_rows(&rows);
                if let RunOutcome::Applied { rows } =
                    self.orchestrator.complete::<ServiceError>(Ok(rows))
                {
                    self.results_scroll = 0;
                    self.report_applied(rows, issues);
                }
            }
            WorkerResponse::BacktestFailed { fingerprint, error } => {
                if self.orchestrator.in_flight() != Some(&fingerprint) {
                    warn!(run = %fingerprint, "failure for a run not in flight; ignored");
                    return;
                }
                self.orchestrator.complete::<&ServiceError>(Err(&error));
                self.push_error(
                    ErrorCategory::of(&error),
                    format!("Backtest failed: {error}"),
                    format!("run {fingerprint}; previous results kept"),
                );
            }
        }
    }

    /// Apply every pending worker response without blocking.
    pub fn drain_worker(&mut self) {
        loop {
            match self.worker_rx.try_recv() {
                Ok(resp) => self.handle_worker_response(resp),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_lost();
                    break;
                }
            }
        }
    }

    /// The worker exited without answering. Settle whatever was pending on it.
    pub fn worker_lost(&mut self) {
        if !self.worker_alive {
            return;
        }
        self.worker_alive = false;
        error!(
            running = self.orchestrator.is_running(),
            catalog_loading = self.catalog_loading,
            "worker thread stopped"
        );

        let mut pending = Vec::new();
        if self.catalog_loading {
            self.catalog_loading = false;
            pending.push("catalog load".to_string());
        }
        if let Some(fingerprint) = self.orchestrator.in_flight().cloned() {
            self.orchestrator.complete::<&str>(Err("worker stopped"));
            pending.push(format!("run {fingerprint}; previous results kept"));
        }
        let context = if pending.is_empty() {
            "idle".to_string()
        } else {
            pending.join(", ")
        };
        self.push_error(
            ErrorCategory::Other,
            "Background worker stopped; restart to reconnect".into(),
            context,
        );
    }

    fn report_applied(&mut self, rows: usize, issues: Vec<RowIssue>) {
        let view = self.orchestrator.view();
        let summary = format!(
            "Backtest complete: {rows} symbols, {} trades, total PnL {:.2}",
            view.total_trades(),
            view.total_pnl
        );
        info!(rows, flagged = issues.len(), "results applied");

        for issue in &issues {
            warn!(%issue, "non-numeric PnL in result row");
            self.push_error(ErrorCategory::NanMetrics, issue.to_string(), "result row".into());
        }
        if issues.is_empty() {
            self.set_status(summary);
        } else {
            self.set_warning(format!("{summary} ({} non-numeric values)", issues.len()));
        }
        self.row_issues = issues;
    }

    /// Push an error to the history, capping at `MAX_ERRORS`.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > MAX_ERRORS {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basketlab_core::{BacktestResultRow, BasketCatalog, Params, Strategy};
    use std::sync::mpsc;

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        (AppState::new(cmd_tx, resp_rx), cmd_rx, resp_tx)
    }

    fn fetch() -> CatalogFetch {
        CatalogFetch {
            strategies: Ok(vec![
                Strategy { id: "momentum".into(), name: "Momentum ML".into(), params: Params::new() },
                Strategy {
                    id: "mean_reversion".into(),
                    name: "Mean Reversion".into(),
                    params: Params::new(),
                },
            ]),
            baskets: Ok([
                ("TOP_3", vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]),
                ("MEME", vec!["DOGEUSDT".to_string()]),
            ]
            .into_iter()
            .collect::<BasketCatalog>()),
        }
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Baskets.next(), Panel::Strategies);
        assert_eq!(Panel::Help.next(), Panel::Baskets);
        assert_eq!(Panel::Baskets.prev(), Panel::Help);
        assert_eq!(Panel::Strategies.prev(), Panel::Baskets);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..Panel::COUNT {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(Panel::COUNT).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _cmd_rx, _resp_tx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), MAX_ERRORS);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn catalog_load_seeds_selection_and_cursors() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.request_catalog();
        app.request_catalog();
        assert!(matches!(cmd_rx.try_recv(), Ok(WorkerCommand::LoadCatalog)));
        assert!(cmd_rx.try_recv().is_err(), "second request while loading is dropped");

        app.handle_worker_response(WorkerResponse::CatalogLoaded(fetch()));
        assert!(!app.catalog_loading);
        assert_eq!(app.selection.strategy_id(), Some("momentum"));
        assert_eq!(app.selection.basket_name(), Some("TOP_3"));
        assert_eq!((app.basket_cursor, app.strategy_cursor), (0, 0));
        assert!(app.can_run());
    }

    #[test]
    fn failed_half_lands_in_error_history() {
        let (mut app, _cmd_rx, _resp_tx) = app();
        let mut partial = fetch();
        partial.baskets = Err(ServiceError::Network("refused".into()));
        app.apply_catalog(partial);

        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Network);
        assert!(app.error_history[0].message.contains("baskets"));
        assert!(!app.can_run());
    }

    #[test]
    fn run_round_trip_applies_results() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        app.run_backtest();
        assert!(!app.can_run());

        let request = match cmd_rx.try_recv() {
            Ok(WorkerCommand::RunBacktest { request }) => request,
            other => panic!("expected RunBacktest, got {other:?}"),
        };
        assert_eq!(request.basket, vec!["BTCUSDT", "ETHUSDT"]);

        app.handle_worker_response(WorkerResponse::BacktestComplete {
            fingerprint: request.fingerprint(),
            rows: vec![
                BacktestResultRow::new("BTCUSDT", "10.50", 3, "3.50"),
                BacktestResultRow::new("ETHUSDT", "-4.00", 1, "-4.00"),
            ],
        });
        assert!(app.can_run());
        assert_eq!(app.orchestrator.view().total_pnl, 6.5);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Info))));
    }

    #[test]
    fn second_run_while_running_sends_nothing() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        app.run_backtest();
        app.run_backtest();
        assert!(cmd_rx.try_recv().is_ok());
        assert!(cmd_rx.try_recv().is_err());
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn failure_keeps_results_and_records_error() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        app.run_backtest();
        let Ok(WorkerCommand::RunBacktest { request }) = cmd_rx.try_recv() else {
            panic!("no request sent");
        };
        app.handle_worker_response(WorkerResponse::BacktestComplete {
            fingerprint: request.fingerprint(),
            rows: vec![BacktestResultRow::new("BTCUSDT", "2.00", 1, "2.00")],
        });

        app.run_backtest();
        let Ok(WorkerCommand::RunBacktest { request }) = cmd_rx.try_recv() else {
            panic!("no request sent");
        };
        app.handle_worker_response(WorkerResponse::BacktestFailed {
            fingerprint: request.fingerprint(),
            error: ServiceError::status(503, "busy"),
        });

        assert_eq!(app.orchestrator.results().len(), 1);
        assert_eq!(app.orchestrator.view().total_pnl, 2.0);
        assert_eq!(app.error_history[0].category, ErrorCategory::Service);
        assert!(app.can_run());
    }

    #[test]
    fn non_numeric_rows_raise_warning() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        app.run_backtest();
        let Ok(WorkerCommand::RunBacktest { request }) = cmd_rx.try_recv() else {
            panic!("no request sent");
        };
        app.handle_worker_response(WorkerResponse::BacktestComplete {
            fingerprint: request.fingerprint(),
            rows: vec![BacktestResultRow::new("BTCUSDT", "oops", 1, "1.00")],
        });

        assert!(app.orchestrator.view().total_pnl.is_nan());
        assert_eq!(app.row_issues.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::NanMetrics);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn stale_response_is_ignored() {
        let (mut app, _cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        let stray = basketlab_core::BacktestRequest::new("x", vec![]).fingerprint();
        app.handle_worker_response(WorkerResponse::BacktestComplete {
            fingerprint: stray,
            rows: vec![BacktestResultRow::new("BTCUSDT", "9.00", 1, "9.00")],
        });
        assert!(app.orchestrator.results().is_empty());
    }

    #[test]
    fn dead_worker_does_not_leave_state_running() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.apply_catalog(fetch());
        drop(cmd_rx);
        app.run_backtest();
        assert!(!app.orchestrator.is_running());
        assert_eq!(app.error_history.len(), 1);
    }

    #[test]
    fn lost_worker_settles_pending_run_and_load() {
        let (mut app, cmd_rx, resp_tx) = app();
        app.apply_catalog(fetch());
        app.request_catalog();
        app.run_backtest();
        assert!(app.orchestrator.is_running());
        assert!(app.catalog_loading);

        drop(resp_tx);
        app.drain_worker();

        assert!(!app.worker_alive);
        assert!(!app.orchestrator.is_running());
        assert!(!app.catalog_loading);
        assert!(app.can_run());
        assert_eq!(app.error_history.len(), 1);
        assert!(app.error_history[0].context.contains("catalog load"));
        assert!(app.error_history[0].context.contains("previous results kept"));

        // A second drain after disconnect records nothing new.
        app.drain_worker();
        assert_eq!(app.error_history.len(), 1);
        drop(cmd_rx);
    }
}
