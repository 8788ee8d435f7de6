//! Shared store for completed backtest results.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::simulator::BacktestResult;

/// Results keyed by symbol, one per symbol, overwritten by later runs.
///
/// Handlers receive the store explicitly; a result is inserted only after a
/// fully successful simulation, so readers never observe partial state.
#[derive(Default)]
pub struct BacktestStore {
    results: RwLock<HashMap<String, BacktestResult>>,
}

impl BacktestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) the result for its symbol.
    pub fn insert(&self, result: BacktestResult) {
        self.results
            .write()
            .unwrap()
            .insert(result.symbol.clone(), result);
    }

    /// Get a copy of the result for a symbol.
    pub fn get(&self, symbol: &str) -> Option<BacktestResult> {
        self.results.read().unwrap().get(symbol).cloned()
    }

    /// Whether a result exists for a symbol.
    pub fn contains(&self, symbol: &str) -> bool {
        self.results.read().unwrap().contains_key(symbol)
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.results.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.results.read().unwrap().is_empty()
    }
}
