//! Background worker thread — all service I/O runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels.
//! The worker creates a private rayon::ThreadPool (not the global pool) for
//! the parallel catalog fetch.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use basketlab_client::{fetch_catalog, BacktestService, CatalogFetch, ServiceError};
use basketlab_core::{BacktestRequest, BacktestResultRow, RunFingerprint};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    LoadCatalog,
    RunBacktest { request: BacktestRequest },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    CatalogLoaded(CatalogFetch),
    BacktestComplete {
        fingerprint: RunFingerprint,
        rows: Vec<BacktestResultRow>,
    },
    BacktestFailed {
        fingerprint: RunFingerprint,
        error: ServiceError,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    service: Box<dyn BacktestService>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("basketlab-worker".into())
        .spawn(move || {
            worker_loop(service.as_ref(), rx, tx);
        })
        .expect("failed to spawn worker thread")
}

fn worker_loop(
    service: &dyn BacktestService,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    // Two threads: one per half of the catalog fetch.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .thread_name(|i| format!("basketlab-pool-{i}"))
        .build()
        .map_err(|e| warn!(error = %e, "worker pool unavailable; using global rayon pool"))
        .ok();

    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                let resp = handle_command(cmd, service, pool.as_ref());
                if let Some(resp) = resp {
                    if tx.send(resp).is_err() {
                        debug!("UI receiver dropped; worker exiting");
                        break;
                    }
                }
            }
        }
    }
}

fn handle_command(
    cmd: WorkerCommand,
    service: &dyn BacktestService,
    pool: Option<&rayon::ThreadPool>,
) -> Option<WorkerResponse> {
    match cmd {
        WorkerCommand::LoadCatalog => {
            let fetch = match pool {
                Some(pool) => pool.install(|| fetch_catalog(service)),
                None => fetch_catalog(service),
            };
            Some(WorkerResponse::CatalogLoaded(fetch))
        }
        WorkerCommand::RunBacktest { request } => {
            let fingerprint = request.fingerprint();
            debug!(run = %fingerprint, "dispatching backtest");
            Some(match service.run_backtest(&request) {
                Ok(rows) => WorkerResponse::BacktestComplete { fingerprint, rows },
                Err(error) => WorkerResponse::BacktestFailed { fingerprint, error },
            })
        }
        WorkerCommand::Shutdown => None, // handled in loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use basketlab_core::{BasketCatalog, Params, Strategy};

    struct Canned;

    impl BacktestService for Canned {
        fn strategies(&self) -> Result<Vec<Strategy>, ServiceError> {
            Ok(vec![Strategy {
                id: "momentum".into(),
                name: "Momentum ML".into(),
                params: Params::new(),
            }])
        }

        fn assets(&self) -> Result<BasketCatalog, ServiceError> {
            Err(ServiceError::Network("connection refused".into()))
        }

        fn run_backtest(
            &self,
            request: &BacktestRequest,
        ) -> Result<Vec<BacktestResultRow>, ServiceError> {
            if request.basket.is_empty() {
                return Err(ServiceError::status(404, "No data found"));
            }
            Ok(request
                .basket
                .iter()
                .map(|s| BacktestResultRow::new(s.as_str(), "1.00", 1, "1.00"))
                .collect())
        }
    }

    fn start() -> (Sender<WorkerCommand>, Receiver<WorkerResponse>, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Box::new(Canned), cmd_rx, resp_tx);
        (cmd_tx, resp_rx, handle)
    }

    #[test]
    fn catalog_load_reports_both_halves() {
        let (tx, rx, handle) = start();
        tx.send(WorkerCommand::LoadCatalog).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerResponse::CatalogLoaded(fetch) => {
                assert_eq!(fetch.strategies.unwrap().len(), 1);
                assert!(fetch.baskets.is_err());
            }
            other => panic!("expected CatalogLoaded, got {other:?}"),
        }
        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn backtest_responses_carry_fingerprint() {
        let (tx, rx, handle) = start();
        let ok = BacktestRequest::new("momentum", vec!["BTC".into(), "ETH".into()]);
        let expected = ok.fingerprint();
        tx.send(WorkerCommand::RunBacktest { request: ok }).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerResponse::BacktestComplete { fingerprint, rows } => {
                assert_eq!(fingerprint, expected);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected BacktestComplete, got {other:?}"),
        }

        let empty = BacktestRequest::new("momentum", Vec::new());
        tx.send(WorkerCommand::RunBacktest { request: empty }).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerResponse::BacktestFailed { error, .. } => {
                assert!(matches!(error, ServiceError::Status { status: 404, .. }));
            }
            other => panic!("expected BacktestFailed, got {other:?}"),
        }
        drop(tx);
        handle.join().unwrap();
    }
}
