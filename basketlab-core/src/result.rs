//! Per-symbol backtest result rows and boundary validation.

use serde::{Deserialize, Serialize};

/// One row of a backtest response.
///
/// PnL figures arrive as decimal strings. Field names follow the service
/// (`"Total PnL"`, `"Trades"`, `"Avg PnL"`); camelCase spellings are accepted too.
/// Unknown fields such as the echoed `"Strategy"` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResultRow {
    pub symbol: String,
    #[serde(rename = "Total PnL", alias = "totalPnl")]
    pub total_pnl: String,
    #[serde(rename = "Trades", alias = "trades")]
    pub trades: u32,
    #[serde(rename = "Avg PnL", alias = "avgPnl")]
    pub avg_pnl: String,
}

impl BacktestResultRow {
    pub fn new(
        symbol: impl Into<String>,
        total_pnl: impl Into<String>,
        trades: u32,
        avg_pnl: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            total_pnl: total_pnl.into(),
            trades,
            avg_pnl: avg_pnl.into(),
        }
    }

    /// Total PnL as a float. Non-numeric text yields NaN.
    pub fn pnl(&self) -> f64 {
        parse_decimal(&self.total_pnl)
    }

    /// Average PnL per trade as a float. Non-numeric text yields NaN.
    pub fn avg(&self) -> f64 {
        parse_decimal(&self.avg_pnl)
    }
}

fn parse_decimal(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Which decimal field of a row failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    TotalPnl,
    AvgPnl,
}

impl RowField {
    pub fn label(self) -> &'static str {
        match self {
            RowField::TotalPnl => "Total PnL",
            RowField::AvgPnl => "Avg PnL",
        }
    }
}

/// A row whose decimal field is not a finite number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub symbol: String,
    pub field: RowField,
    pub value: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} is not numeric ({:?})",
            self.symbol,
            self.field.label(),
            self.value
        )
    }
}

/// Flag rows whose PnL fields do not parse as finite numbers.
///
/// Rows are not dropped; the caller decides how loudly to report them.
pub fn validate_rows(rows: &[BacktestResultRow]) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    for row in rows {
        for (field, value) in [
            (RowField::TotalPnl, &row.total_pnl),
            (RowField::AvgPnl, &row.avg_pnl),
        ] {
            if !parse_decimal(value).is_finite() {
                issues.push(RowIssue {
                    symbol: row.symbol.clone(),
                    field,
                    value: value.clone(),
                });
            }
        }
    }
    issues
}
