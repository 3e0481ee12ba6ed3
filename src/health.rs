//! Liveness HTTP endpoint
//!
//! Answers `200` whenever the process is up and reports the stream state in
//! the body. Reads only the feed's connection state, never the store.

use crate::feed::{ConnectionState, FallbackSource, PriceFeedClient};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Body of a liveness response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub connected: bool,
    pub state: ConnectionState,
    pub cached_symbols: usize,
}

/// Router serving the liveness check on `/` and `/health`
pub fn router<F: FallbackSource + 'static>(feed: Arc<PriceFeedClient<F>>) -> Router {
    Router::new()
        .route("/", get(health_handler::<F>))
        .route("/health", get(health_handler::<F>))
        .with_state(feed)
}

async fn health_handler<F: FallbackSource + 'static>(
    State(feed): State<Arc<PriceFeedClient<F>>>,
) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        connected: feed.is_connected(),
        state: feed.state(),
        cached_symbols: feed.cached_symbols().len(),
    })
}

/// Bind `addr` and serve the liveness router in the background
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
pub async fn serve<F: FallbackSource + 'static>(
    feed: Arc<PriceFeedClient<F>>,
    addr: SocketAddr,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "Liveness endpoint listening");

    let app = router(feed);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Liveness endpoint failed");
        }
    });

    Ok((local, handle))
}
