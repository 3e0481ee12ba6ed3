//! Price feed types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest known ticker state for one base asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// Base asset, uppercase, quote suffix stripped (e.g., "BTC")
    pub symbol: String,
    /// Last traded price
    pub price: f64,
    /// 24h change in percent (2.31 means +2.31%)
    pub price_change_24h: f64,
    /// 24h high
    pub high_24h: f64,
    /// 24h low
    pub low_24h: f64,
    /// 24h traded volume
    pub volume_24h: f64,
    /// Best bid, zero when the source omits it
    pub bid: f64,
    /// Best ask, zero when the source omits it
    pub ask: f64,
    /// Local time the snapshot was built
    pub observed_at: DateTime<Utc>,
}

/// Stream connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Subscribing,
    Streaming,
}

impl ConnectionState {
    /// Whether a socket is currently established
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ConnectionState::Open | ConnectionState::Subscribing | ConnectionState::Streaming
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Subscribing => "subscribing",
            ConnectionState::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// Uppercase and trim a user-supplied symbol
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_states() {
        assert!(!ConnectionState::Disconnected.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::Open.is_open());
        assert!(ConnectionState::Subscribing.is_open());
        assert!(ConnectionState::Streaming.is_open());
    }

    #[test]
    fn test_default_state_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::Streaming.to_string(), "streaming");
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" btc "), "BTC");
        assert_eq!(normalize_symbol("Eth"), "ETH");
    }
}
