//! Price feed module
//!
//! Keeps an in-memory table of Bybit spot tickers current from the public
//! WebSocket stream, with a REST lookup for symbols the stream has not
//! delivered yet.

pub mod bybit;
mod client;
mod rest;
mod store;
mod types;

pub use bybit::{DecodeError, Inbound, BYBIT_WS_URL, DEFAULT_QUOTE};
pub use client::PriceFeedClient;
pub use rest::{BybitRestClient, FallbackError, RestConfig, BYBIT_REST_URL};
pub use store::SnapshotStore;
pub use types::{normalize_symbol, ConnectionState, TickerSnapshot};

use async_trait::async_trait;

/// Point lookup used when no streamed snapshot exists
///
/// Implementations must bound their own latency and report every failure
/// as `None`.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Option<TickerSnapshot>;
}

#[async_trait]
impl<T: FallbackSource + ?Sized> FallbackSource for std::sync::Arc<T> {
    async fn fetch(&self, symbol: &str) -> Option<TickerSnapshot> {
        (**self).fetch(symbol).await
    }
}
