//! Configuration types for ticker-cache

use crate::feed::{RestConfig, BYBIT_REST_URL, BYBIT_WS_URL, DEFAULT_QUOTE};
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Streaming endpoint
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// REST endpoint used for fallback lookups
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    /// Market category for REST lookups
    #[serde(default = "default_category")]
    pub category: String,

    /// Quote asset for every pair
    #[serde(default = "default_quote")]
    pub quote: String,

    /// Base assets subscribed at start
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// How long `start` waits before returning (milliseconds)
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,

    /// Fixed pause between reconnect attempts (milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Keepalive ping interval (seconds, 0 is treated as 1)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Fallback request timeout (milliseconds)
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,
}

fn default_ws_url() -> String {
    BYBIT_WS_URL.to_string()
}
fn default_rest_url() -> String {
    BYBIT_REST_URL.to_string()
}
fn default_category() -> String {
    "spot".to_string()
}
fn default_quote() -> String {
    DEFAULT_QUOTE.to_string()
}
fn default_symbols() -> Vec<String> {
    ["BTC", "ETH", "BNB", "SOL", "XRP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_warmup_ms() -> u64 {
    2_000
}
fn default_reconnect_delay_ms() -> u64 {
    5_000
}
fn default_ping_interval_secs() -> u64 {
    20
}
fn default_fallback_timeout_ms() -> u64 {
    3_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            rest_url: default_rest_url(),
            category: default_category(),
            quote: default_quote(),
            symbols: default_symbols(),
            warmup_ms: default_warmup_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            ping_interval_secs: default_ping_interval_secs(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
        }
    }
}

impl FeedConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }

    /// Settings for the REST fallback client
    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            base_url: self.rest_url.clone(),
            category: self.category.clone(),
            quote: self.quote.clone(),
            timeout: Duration::from_millis(self.fallback_timeout_ms),
        }
    }
}

/// Command relay and scheduled broadcast configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Publish the default watchlist board periodically
    #[serde(default = "default_true")]
    pub broadcast_enabled: bool,

    /// Minutes between broadcasts
    #[serde(default = "default_broadcast_interval_minutes")]
    pub broadcast_interval_minutes: u64,

    /// Delay before the first broadcast (seconds)
    #[serde(default = "default_first_broadcast_secs")]
    pub first_broadcast_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_broadcast_interval_minutes() -> u64 {
    60
}
fn default_first_broadcast_secs() -> u64 {
    10
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            broadcast_enabled: true,
            broadcast_interval_minutes: default_broadcast_interval_minutes(),
            first_broadcast_secs: default_first_broadcast_secs(),
        }
    }
}

impl RelayConfig {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_minutes.max(1) * 60)
    }

    pub fn first_broadcast(&self) -> Duration {
        Duration::from_secs(self.first_broadcast_secs)
    }
}

/// Liveness endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    /// Serve the liveness endpoint while running
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_health_host")]
    pub host: String,

    #[serde(default = "default_health_port")]
    pub port: u16,
}

fn default_health_host() -> String {
    "0.0.0.0".to_string()
}
fn default_health_port() -> u16 {
    8080
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_health_host(),
            port: default_health_port(),
        }
    }
}

impl HealthConfig {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
