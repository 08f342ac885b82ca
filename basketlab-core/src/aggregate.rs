//! Result aggregation — raw rows into chart-ready records and a signed total.
//!
//! `aggregate` is pure: the same rows always give the same view. Non-numeric
//! PnL text parses to NaN and is summed as-is, so a bad row shows up as a NaN
//! total instead of being silently skipped.

use serde::{Serialize, Serializer};

use crate::result::BacktestResultRow;

/// Chart record for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolPnl {
    pub name: String,
    #[serde(serialize_with = "non_finite_as_text")]
    pub pnl: f64,
    pub trades: u32,
}

/// Display class of a PnL figure. Zero counts as non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PnlSign {
    NonNegative,
    Negative,
}

impl PnlSign {
    /// NaN is not `>= 0` and therefore classifies as negative.
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            PnlSign::NonNegative
        } else {
            PnlSign::Negative
        }
    }
}

/// Derived view over the latest result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedView {
    pub per_symbol: Vec<SymbolPnl>,
    #[serde(serialize_with = "non_finite_as_text")]
    pub total_pnl: f64,
}

/// JSON has no NaN; write non-finite values as text (`"NaN"`, `"inf"`) rather
/// than letting them collapse to `null`.
fn non_finite_as_text<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.collect_str(value)
    }
}

impl Default for AggregatedView {
    fn default() -> Self {
        Self::empty()
    }
}

impl AggregatedView {
    /// The "no run yet" view.
    pub fn empty() -> Self {
        Self {
            per_symbol: Vec::new(),
            total_pnl: 0.0,
        }
    }

    /// True only when there is nothing to show. A completed run with a zero
    /// total is not empty.
    pub fn is_empty(&self) -> bool {
        self.per_symbol.is_empty()
    }

    pub fn sign(&self) -> PnlSign {
        PnlSign::of(self.total_pnl)
    }

    pub fn total_trades(&self) -> u64 {
        self.per_symbol.iter().map(|s| u64::from(s.trades)).sum()
    }

    /// Smallest and largest finite per-symbol PnL, widened to include zero.
    ///
    /// Used to scale the chart axis. `None` when no value is finite.
    pub fn pnl_bounds(&self) -> Option<(f64, f64)> {
        self.per_symbol
            .iter()
            .map(|s| s.pnl)
            .filter(|p| p.is_finite())
            .fold(None, |acc, p| {
                let (lo, hi) = acc.unwrap_or((0.0_f64, 0.0_f64));
                Some((lo.min(p), hi.max(p)))
            })
    }
}

/// Build the view for a result set. Row order is preserved.
pub fn aggregate(rows: &[BacktestResultRow]) -> AggregatedView {
    let per_symbol: Vec<SymbolPnl> = rows
        .iter()
        .map(|row| SymbolPnl {
            name: row.symbol.clone(),
            pnl: row.pnl(),
            trades: row.trades,
        })
        .collect();
    let total_pnl = per_symbol.iter().fold(0.0, |acc, s| acc + s.pnl);
    AggregatedView {
        per_symbol,
        total_pnl,
    }
}
