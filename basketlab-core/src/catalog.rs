//! Catalog — strategies and named asset baskets served by the backtest service.
//!
//! Baskets keep the order the service listed them in. The first basket and the
//! first strategy seed the selection, so that order is observable and must never
//! be re-sorted on the client.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single strategy parameter value.
///
/// Closed set of the JSON scalars the service uses for defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Strategy parameters, in the order the service declared them.
pub type Params = IndexMap<String, ParamValue>;

/// A strategy offered by the service. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl Strategy {
    /// Render the default parameters as `key: value` pairs.
    pub fn params_summary(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Basket name → ordered symbol list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketCatalog {
    baskets: IndexMap<String, Vec<String>>,
}

impl BasketCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols of a basket, if the basket exists.
    pub fn symbols(&self, name: &str) -> Option<&[String]> {
        self.baskets.get(name).map(|v| v.as_slice())
    }

    /// Basket names in service order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.baskets.keys().map(|s| s.as_str())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.baskets.keys().next().map(|s| s.as_str())
    }

    /// Position of a basket in service order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.baskets.get_index_of(name)
    }

    /// Basket name at a position in service order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.baskets.get_index(index).map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.baskets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }

    /// Total number of symbols across all baskets.
    pub fn symbol_count(&self) -> usize {
        self.baskets.values().map(|v| v.len()).sum()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<String>)> for BasketCatalog {
    fn from_iter<I: IntoIterator<Item = (N, Vec<String>)>>(iter: I) -> Self {
        Self {
            baskets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Everything the client knows about the service: strategies plus baskets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub strategies: Vec<Strategy>,
    pub baskets: BasketCatalog,
}

impl Catalog {
    pub fn new(strategies: Vec<Strategy>, baskets: BasketCatalog) -> Self {
        Self { strategies, baskets }
    }

    pub fn strategy_position(&self, id: &str) -> Option<usize> {
        self.strategies.iter().position(|s| s.id == id)
    }

    pub fn first_strategy_id(&self) -> Option<&str> {
        self.strategies.first().map(|s| s.id.as_str())
    }

    pub fn first_basket_name(&self) -> Option<&str> {
        self.baskets.first_name()
    }
}
