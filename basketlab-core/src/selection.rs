//! Selection state — the basket and strategy the next run will use.

use crate::catalog::Catalog;

/// Currently chosen strategy id and basket name.
///
/// `None` means "nothing chosen yet". Setters overwrite unconditionally and do
/// not consult the catalog; the orchestrator checks the basket when a run is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    strategy_id: Option<String>,
    basket_name: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a strategy. An empty id clears the field.
    pub fn select_strategy(&mut self, id: impl Into<String>) {
        self.strategy_id = non_empty(id.into());
    }

    /// Choose a basket. An empty name clears the field.
    pub fn select_basket(&mut self, name: impl Into<String>) {
        self.basket_name = non_empty(name.into());
    }

    pub fn strategy_id(&self) -> Option<&str> {
        self.strategy_id.as_deref()
    }

    pub fn basket_name(&self) -> Option<&str> {
        self.basket_name.as_deref()
    }

    /// Both fields chosen.
    pub fn is_complete(&self) -> bool {
        self.strategy_id.is_some() && self.basket_name.is_some()
    }

    /// Fill empty fields from the first catalog entries.
    ///
    /// Fields that already hold a choice are left alone. Returns true if
    /// anything changed.
    pub fn seed_from(&mut self, catalog: &Catalog) -> bool {
        let mut changed = false;
        if self.strategy_id.is_none() {
            if let Some(id) = catalog.first_strategy_id() {
                self.strategy_id = Some(id.to_string());
                changed = true;
            }
        }
        if self.basket_name.is_none() {
            if let Some(name) = catalog.first_basket_name() {
                self.basket_name = Some(name.to_string());
                changed = true;
            }
        }
        changed
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
