//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// Pause between consecutive subscribe frames after a connect
pub const DEFAULT_SUBSCRIBE_DELAY: Duration = Duration::from_millis(100);

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Text frames sent, in order, after every successful connect
    pub subscriptions: Vec<String>,
    /// Delay between subscription frames
    pub subscribe_delay: Duration,
    /// Maximum reconnection attempts before giving up (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Fixed delay before each reconnection attempt
    pub reconnect_delay: Duration,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            subscriptions: Vec::new(),
            subscribe_delay: DEFAULT_SUBSCRIBE_DELAY,
            max_reconnect_attempts: 0,
            reconnect_delay: Duration::from_secs(5),
            ping_interval: Duration::from_secs(20),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the frames to send after each connect
    pub fn subscriptions(mut self, frames: Vec<String>) -> Self {
        self.subscriptions = frames;
        self
    }

    /// Set the delay between subscription frames
    pub fn subscribe_delay(mut self, d: Duration) -> Self {
        self.subscribe_delay = d;
        self
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the reconnection delay
    pub fn reconnect_delay(mut self, d: Duration) -> Self {
        self.reconnect_delay = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// Events emitted by the connection loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// A connection attempt is starting
    Connecting { attempt: u32 },
    /// Handshake completed
    Connected,
    /// Subscription frames are being sent
    Subscribing,
    /// All subscription frames were sent
    Subscribed,
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// Connection lost or closed
    Disconnected,
}

/// WebSocket errors
#[derive(Debug, Clone, Error)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Maximum reconnection attempts exceeded
    #[error("Maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}
