//! Scheduled price board broadcast

use super::render_board;
use crate::feed::{FallbackSource, PriceFeedClient};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Destination for broadcast messages
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    async fn publish(&self, text: &str) -> anyhow::Result<()>;
}

/// Sink that writes boards to the log
pub struct LogSink;

#[async_trait]
impl BroadcastSink for LogSink {
    async fn publish(&self, text: &str) -> anyhow::Result<()> {
        tracing::info!(board = %text, "Price broadcast");
        Ok(())
    }
}

/// Render and publish one board; returns how many symbols had data
pub async fn broadcast_once<F, S, T>(
    feed: &PriceFeedClient<F>,
    symbols: &[T],
    sink: &S,
) -> anyhow::Result<usize>
where
    F: FallbackSource,
    S: BroadcastSink + ?Sized,
    T: AsRef<str>,
{
    let prices = feed.get_multiple_prices(symbols).await;
    if prices.is_empty() {
        tracing::warn!("No prices available for broadcast");
        return Ok(0);
    }

    sink.publish(&render_board("🔄 Bybit price update", &prices))
        .await?;
    Ok(prices.len())
}

/// Publish a board every `period`, first after `first_delay`
pub async fn run_broadcast<F, S>(
    feed: Arc<PriceFeedClient<F>>,
    symbols: Vec<String>,
    sink: Arc<S>,
    first_delay: Duration,
    period: Duration,
) where
    F: FallbackSource,
    S: BroadcastSink + ?Sized,
{
    let mut ticker = interval_at(Instant::now() + first_delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match broadcast_once(feed.as_ref(), &symbols[..], sink.as_ref()).await {
            Ok(count) => tracing::debug!(count, "Broadcast sent"),
            Err(e) => tracing::error!(error = %e, "Broadcast failed"),
        }
    }
}
