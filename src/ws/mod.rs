//! WebSocket client library
//!
//! Provides a reusable WebSocket client with automatic reconnection,
//! subscription replay on every connect, and ping/pong keepalive.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage, DEFAULT_SUBSCRIBE_DELAY};
