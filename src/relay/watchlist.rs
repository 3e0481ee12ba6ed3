//! Per-session watchlists
//!
//! Each session starts from the default coin list on first touch. Lists
//! live in memory only.

use crate::feed::normalize_symbol;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug)]
pub struct WatchlistBook {
    defaults: Vec<String>,
    lists: RwLock<HashMap<String, Vec<String>>>,
}

impl WatchlistBook {
    pub fn new<S: AsRef<str>>(defaults: &[S]) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(defaults.len());
        for symbol in defaults {
            let symbol = normalize_symbol(symbol.as_ref());
            if !symbol.is_empty() && !normalized.contains(&symbol) {
                normalized.push(symbol);
            }
        }
        Self {
            defaults: normalized,
            lists: RwLock::new(HashMap::new()),
        }
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Symbols watched by `session`, in insertion order
    pub fn list(&self, session: &str) -> Vec<String> {
        self.lists
            .read()
            .get(session)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn contains(&self, session: &str, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        match self.lists.read().get(session) {
            Some(list) => list.contains(&symbol),
            None => self.defaults.contains(&symbol),
        }
    }

    /// Append `symbol`; false if it was already present
    pub fn add(&self, session: &str, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        let mut lists = self.lists.write();
        let list = lists
            .entry(session.to_string())
            .or_insert_with(|| self.defaults.clone());
        if list.contains(&symbol) {
            return false;
        }
        list.push(symbol);
        true
    }

    /// Remove `symbol`; false if it was not present
    pub fn remove(&self, session: &str, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        let mut lists = self.lists.write();
        let list = lists
            .entry(session.to_string())
            .or_insert_with(|| self.defaults.clone());
        match list.iter().position(|s| *s == symbol) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_sees_defaults() {
        let book = WatchlistBook::new(&["btc", "ETH", "BTC"]);
        assert_eq!(book.defaults(), ["BTC", "ETH"]);
        assert_eq!(book.list("alice"), vec!["BTC", "ETH"]);
        assert!(book.contains("alice", "eth"));
    }

    #[test]
    fn test_add_and_remove() {
        let book = WatchlistBook::new(&["BTC"]);

        assert!(book.add("alice", "doge"));
        assert!(!book.add("alice", "DOGE"));
        assert_eq!(book.list("alice"), vec!["BTC", "DOGE"]);

        assert!(book.remove("alice", "btc"));
        assert!(!book.remove("alice", "btc"));
        assert_eq!(book.list("alice"), vec!["DOGE"]);
    }

    #[test]
    fn test_sessions_are_independent() {
        let book = WatchlistBook::new(&["BTC"]);
        book.add("alice", "SOL");
        book.remove("bob", "BTC");

        assert_eq!(book.list("alice"), vec!["BTC", "SOL"]);
        assert!(book.list("bob").is_empty());
        assert_eq!(book.list("carol"), vec!["BTC"]);
    }
}
