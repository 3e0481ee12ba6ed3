//! Price feed client: owns the Bybit ticker stream and serves price reads

use super::bybit::{self, Inbound};
use super::rest::{BybitRestClient, FallbackError};
use super::{normalize_symbol, ConnectionState, FallbackSource, SnapshotStore, TickerSnapshot};
use crate::config::FeedConfig;
use crate::ws::{WsClient, WsConfig, WsMessage, DEFAULT_SUBSCRIBE_DELAY};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Background tasks of a started client
struct FeedTasks {
    socket: JoinHandle<()>,
    ingest: JoinHandle<()>,
    pairs: Vec<String>,
}

impl FeedTasks {
    fn abort(self) {
        self.ingest.abort();
        self.socket.abort();
    }
}

/// Live price cache fed by the Bybit ticker stream
///
/// Construct one per process and share it behind an `Arc`. `start` spawns
/// the connection task; reads never wait on the connection. A read that
/// misses the snapshot store goes to the fallback source and its result is
/// returned without being cached.
pub struct PriceFeedClient<F = BybitRestClient> {
    config: FeedConfig,
    store: Arc<SnapshotStore>,
    fallback: F,
    state: Arc<watch::Sender<ConnectionState>>,
    tasks: Mutex<Option<FeedTasks>>,
}

impl PriceFeedClient<BybitRestClient> {
    /// Client with the REST fallback built from the same config
    pub fn from_config(config: FeedConfig) -> Result<Self, FallbackError> {
        let fallback = BybitRestClient::with_config(config.rest_config())?;
        Ok(Self::new(config, fallback))
    }
}

impl<F: FallbackSource> PriceFeedClient<F> {
    pub fn new(config: FeedConfig, fallback: F) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            store: Arc::new(SnapshotStore::new()),
            fallback,
            state: Arc::new(state),
            tasks: Mutex::new(None),
        }
    }

    /// Begin streaming tickers for `symbols` (base assets)
    ///
    /// Returns after the configured warm-up. The connection may still be
    /// down at that point; reads fall back to REST until it is up. Calling
    /// this on a running client only logs a warning.
    pub async fn start<S: AsRef<str>>(&self, symbols: &[S]) {
        {
            let mut tasks = self.tasks.lock();
            if let Some(running) = tasks.as_ref() {
                tracing::warn!(pairs = ?running.pairs, "Price feed already started");
                return;
            }

            let pairs = subscription_set(symbols, &self.config.quote);
            let frames = pairs.iter().map(|p| bybit::subscribe_frame(p)).collect();

            tracing::info!(url = %self.config.ws_url, pairs = ?pairs, "Starting Bybit price feed");

            let ws = WsClient::new(
                WsConfig::new(self.config.ws_url.clone())
                    .subscriptions(frames)
                    .subscribe_delay(DEFAULT_SUBSCRIBE_DELAY)
                    .reconnect_delay(self.config.reconnect_delay())
                    .ping_interval(self.config.ping_interval()),
            );
            let (ws_rx, socket) = ws.connect();

            let ingest = tokio::spawn(run_ingest_loop(
                ws_rx,
                Arc::clone(&self.store),
                Arc::clone(&self.state),
                self.config.quote.clone(),
            ));

            *tasks = Some(FeedTasks {
                socket,
                ingest,
                pairs,
            });
        }

        tokio::time::sleep(self.config.warmup()).await;
    }

    /// Tear down the stream; cached snapshots stay readable
    pub fn stop(&self) {
        if let Some(tasks) = self.tasks.lock().take() {
            tasks.abort();
            self.state.send_replace(ConnectionState::Disconnected);
            tracing::info!("Price feed stopped");
        }
    }

    /// Latest snapshot for `symbol`, from the stream or else the fallback
    pub async fn get_price(&self, symbol: &str) -> Option<TickerSnapshot> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return None;
        }

        if let Some(snapshot) = self.store.read(&symbol) {
            return Some(snapshot);
        }

        tracing::debug!(symbol = %symbol, "No streamed snapshot, using fallback");
        self.fallback.fetch(&symbol).await
    }

    /// Prices for `symbols` in input order, keyed by the symbol as given
    ///
    /// Symbols with no data anywhere are omitted; a repeated symbol keeps
    /// its first position.
    pub async fn get_multiple_prices<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Vec<(String, TickerSnapshot)> {
        let mut results: Vec<(String, TickerSnapshot)> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if results.iter().any(|(key, _)| key == symbol) {
                continue;
            }
            if let Some(snapshot) = self.get_price(symbol).await {
                results.push((symbol.to_string(), snapshot));
            }
        }
        results
    }

    /// Whether the stream socket is currently up
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Exchange pairs requested at start, empty before `start`
    pub fn subscriptions(&self) -> Vec<String> {
        self.tasks
            .lock()
            .as_ref()
            .map(|t| t.pairs.clone())
            .unwrap_or_default()
    }

    /// Symbols with a streamed snapshot, sorted
    pub fn cached_symbols(&self) -> Vec<String> {
        self.store.symbols()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SnapshotStore {
        &self.store
    }
}

impl<F> Drop for PriceFeedClient<F> {
    fn drop(&mut self) {
        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.abort();
        }
    }
}

/// Ordered, de-duplicated exchange pairs for the given base assets
fn subscription_set<S: AsRef<str>>(symbols: &[S], quote: &str) -> Vec<String> {
    let mut pairs: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = normalize_symbol(symbol.as_ref());
        if symbol.is_empty() {
            continue;
        }
        let pair = bybit::pair_symbol(&symbol, quote);
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// State a transport event moves the client into
fn next_state(msg: &WsMessage) -> Option<ConnectionState> {
    match msg {
        WsMessage::Connecting { .. } => Some(ConnectionState::Connecting),
        WsMessage::Connected => Some(ConnectionState::Open),
        WsMessage::Subscribing => Some(ConnectionState::Subscribing),
        WsMessage::Subscribed => Some(ConnectionState::Streaming),
        WsMessage::Disconnected => Some(ConnectionState::Disconnected),
        WsMessage::Text(_) | WsMessage::Binary(_) => None,
    }
}

/// Sole writer to the snapshot store
async fn run_ingest_loop(
    mut ws_rx: mpsc::Receiver<WsMessage>,
    store: Arc<SnapshotStore>,
    state: Arc<watch::Sender<ConnectionState>>,
    quote: String,
) {
    while let Some(msg) = ws_rx.recv().await {
        if let Some(next) = next_state(&msg) {
            state.send_replace(next);
        }

        match msg {
            WsMessage::Text(text) => ingest(&store, &text, &quote),
            WsMessage::Connecting { attempt } if attempt > 1 => {
                tracing::info!(attempt, "Reconnecting to Bybit");
            }
            WsMessage::Connected => {
                tracing::info!("Bybit feed connected");
            }
            WsMessage::Subscribed => {
                tracing::info!("Bybit feed streaming");
            }
            WsMessage::Disconnected => {
                tracing::warn!("Bybit feed disconnected");
            }
            _ => {}
        }
    }

    state.send_replace(ConnectionState::Disconnected);
    tracing::debug!("Ingest loop finished");
}

fn ingest(store: &SnapshotStore, text: &str, quote: &str) {
    match bybit::parse_message(text, quote) {
        Ok(Inbound::Ticker(snapshot)) => {
            tracing::trace!(symbol = %snapshot.symbol, price = snapshot.price, "Ticker update");
            store.write(&snapshot.symbol.clone(), snapshot);
        }
        Ok(Inbound::OpReply { op, success: true, .. }) => {
            tracing::debug!(op = %op, "Bybit request acknowledged");
        }
        Ok(Inbound::OpReply { op, message, .. }) => {
            tracing::warn!(op = %op, message = %message, "Bybit rejected request");
        }
        Ok(Inbound::Ignored) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed feed message");
        }
    }
}
