//! Backtest request and run fingerprinting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Params;

/// Body of `POST /backtest`. Built fresh for every run and not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// Strategy id.
    pub strategy: String,
    /// Symbols copied from the selected basket at submit time.
    pub basket: Vec<String>,
    /// Parameter overrides. Always empty: the service applies strategy defaults.
    #[serde(default)]
    pub params: Params,
}

impl BacktestRequest {
    pub fn new(strategy: impl Into<String>, basket: Vec<String>) -> Self {
        Self {
            strategy: strategy.into(),
            basket,
            params: Params::new(),
        }
    }

    /// Deterministic fingerprint of this request.
    ///
    /// Identical requests share a fingerprint, so it labels a run in logs and
    /// the UI without any persisted id.
    pub fn fingerprint(&self) -> RunFingerprint {
        use serde_json::json;

        let canonical = json!({
            "strategy": &self.strategy,
            "basket": &self.basket,
            "params": &self.params,
        });
        let hash = blake3::hash(canonical.to_string().as_bytes());
        RunFingerprint(hash.to_hex()[..RunFingerprint::LEN].to_string())
    }
}

/// Short hex label derived from a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunFingerprint(String);

impl RunFingerprint {
    pub const LEN: usize = 12;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
