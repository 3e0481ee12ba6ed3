//! Concurrent symbol -> snapshot table
//!
//! One coarse lock guards the whole map. Every write replaces a snapshot
//! wholesale and every read clones one out, so a reader never sees fields
//! from two different updates and never holds the lock past the copy.

use super::TickerSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: RwLock<HashMap<String, TickerSnapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for `symbol` unconditionally
    pub fn write(&self, symbol: &str, snapshot: TickerSnapshot) {
        self.entries.write().insert(symbol.to_string(), snapshot);
    }

    /// Independent copy of the snapshot for `symbol`
    pub fn read(&self, symbol: &str) -> Option<TickerSnapshot> {
        self.entries.read().get(symbol).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Symbols with a snapshot, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.entries.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
