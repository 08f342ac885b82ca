//! Catalog loading — strategies and baskets fetched jointly at startup.
//!
//! Both calls are issued in parallel and awaited together. Each half degrades
//! on its own: a failed half is reported and leaves only that part of the
//! catalog empty. Nothing retries automatically; a reload is a user action.

use std::fmt;

use tracing::{error, info};

use basketlab_core::{BasketCatalog, Catalog, SelectionState, Strategy};

use crate::error::ServiceError;
use crate::service::BacktestService;

/// Which half of the catalog a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPart {
    Strategies,
    Baskets,
}

impl fmt::Display for CatalogPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogPart::Strategies => f.write_str("strategies"),
            CatalogPart::Baskets => f.write_str("baskets"),
        }
    }
}

/// Raw outcome of the joint fetch, before it is applied.
#[derive(Debug, Clone)]
pub struct CatalogFetch {
    pub strategies: Result<Vec<Strategy>, ServiceError>,
    pub baskets: Result<BasketCatalog, ServiceError>,
}

/// What applying a fetch changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Strategy count, if that half loaded.
    pub strategies: Option<usize>,
    /// Basket count, if that half loaded.
    pub baskets: Option<usize>,
    pub failures: Vec<(CatalogPart, ServiceError)>,
    /// The selection gained a default from this load.
    pub seeded: bool,
}

impl LoadReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch strategies and baskets in parallel.
///
/// Runs on the current rayon pool; the TUI worker installs its own.
pub fn fetch_catalog<S: BacktestService + ?Sized>(service: &S) -> CatalogFetch {
    let (strategies, baskets) = rayon::join(|| service.strategies(), || service.assets());
    CatalogFetch {
        strategies,
        baskets,
    }
}

impl CatalogFetch {
    /// Apply the successful halves, then seed empty selection fields.
    ///
    /// A failed half leaves the existing part of the catalog untouched. Fields
    /// the user already chose are never overwritten.
    pub fn apply(self, catalog: &mut Catalog, selection: &mut SelectionState) -> LoadReport {
        let mut report = LoadReport::default();

        match self.strategies {
            Ok(strategies) => {
                info!(count = strategies.len(), "strategies loaded");
                report.strategies = Some(strategies.len());
                catalog.strategies = strategies;
            }
            Err(e) => {
                error!(error = %e, "failed to load strategies");
                report.failures.push((CatalogPart::Strategies, e));
            }
        }

        match self.baskets {
            Ok(baskets) => {
                info!(
                    count = baskets.len(),
                    symbols = baskets.symbol_count(),
                    "baskets loaded"
                );
                report.baskets = Some(baskets.len());
                catalog.baskets = baskets;
            }
            Err(e) => {
                error!(error = %e, "failed to load baskets");
                report.failures.push((CatalogPart::Baskets, e));
            }
        }

        report.seeded = selection.seed_from(catalog);
        report
    }
}

/// Fetch and apply in one step.
pub fn load_catalog<S: BacktestService + ?Sized>(
    service: &S,
    catalog: &mut Catalog,
    selection: &mut SelectionState,
) -> LoadReport {
    fetch_catalog(service).apply(catalog, selection)
}
