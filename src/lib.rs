//! ticker-cache: live spot prices from the Bybit ticker stream
//!
//! This library provides:
//! - A reconnecting WebSocket transport with subscription replay
//! - A concurrently readable snapshot table kept current by the stream
//! - REST fallback lookups for symbols the stream has not delivered
//! - A chat-style command relay and scheduled price broadcasts
//! - An HTTP liveness endpoint reporting stream state
//! - TOML configuration and structured logging

pub mod cli;
pub mod config;
pub mod feed;
pub mod health;
pub mod relay;
pub mod telemetry;
pub mod ws;
