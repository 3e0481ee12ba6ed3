//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Floor for the keepalive period; `interval` rejects zero
const MIN_PING_INTERVAL: Duration = Duration::from_secs(1);

/// How a streaming session ended without a transport error
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    /// Peer sent a close frame or the stream ran out
    Closed,
    /// Nobody is listening to our events any more
    ReceiverDropped,
}

/// Reusable WebSocket client with automatic reconnection, resubscription
/// and ping/pong handling
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return a receiver for messages plus the task handle
    ///
    /// This spawns a background task that owns the socket for its whole
    /// lifetime. After every successful handshake the configured
    /// subscription frames are replayed. On close or error the task waits
    /// `reconnect_delay` and dials again. It exits once the receiver is
    /// dropped, or when a non-zero attempt ceiling is reached.
    pub fn connect(&self) -> (mpsc::Receiver<WsMessage>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1024);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, tx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        (rx, handle)
    }

    /// Run the connection loop with automatic reconnection
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            attempt += 1;
            if tx.send(WsMessage::Connecting { attempt }).await.is_err() {
                break;
            }

            tracing::info!(url = %config.url, attempt, "Connecting to WebSocket");

            match connect_async(&config.url).await {
                Ok((socket, _response)) => {
                    failures = 0;
                    match Self::stream(&config, &tx, socket).await {
                        Ok(StreamEnd::ReceiverDropped) => {
                            tracing::debug!("Receiver dropped, closing connection");
                            break;
                        }
                        Ok(StreamEnd::Closed) => {
                            tracing::warn!("WebSocket closed by peer");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "WebSocket stream error");
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        error = %e,
                        failures,
                        "WebSocket connection failed"
                    );
                }
            }

            if tx.send(WsMessage::Disconnected).await.is_err() {
                break;
            }

            // Check max reconnects (0 = infinite)
            if config.max_reconnect_attempts > 0 && failures >= config.max_reconnect_attempts {
                tracing::error!("Max reconnection attempts reached");
                return Err(WsError::MaxReconnectsExceeded);
            }

            tokio::select! {
                _ = sleep(config.reconnect_delay) => {}
                _ = tx.closed() => {
                    tracing::info!("Receiver dropped, stopping reconnection");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Replay subscriptions on a fresh socket, then forward frames until
    /// the session ends
    async fn stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
        socket: Socket,
    ) -> Result<StreamEnd, WsError> {
        let (mut write, mut read) = socket.split();

        tracing::info!("WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(StreamEnd::ReceiverDropped);
        }

        if !config.subscriptions.is_empty() {
            if tx.send(WsMessage::Subscribing).await.is_err() {
                return Ok(StreamEnd::ReceiverDropped);
            }
            for (i, frame) in config.subscriptions.iter().enumerate() {
                if i > 0 {
                    sleep(config.subscribe_delay).await;
                }
                write
                    .send(Message::Text(frame.clone()))
                    .await
                    .map_err(|e| WsError::SendFailed(e.to_string()))?;
            }
            tracing::debug!(count = config.subscriptions.len(), "Subscriptions sent");
        }

        if tx.send(WsMessage::Subscribed).await.is_err() {
            return Ok(StreamEnd::ReceiverDropped);
        }

        let ping_period = config.ping_interval.max(MIN_PING_INTERVAL);
        let mut ping_interval = tokio::time::interval_at(Instant::now() + ping_period, ping_period);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                return Ok(StreamEnd::ReceiverDropped);
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                return Ok(StreamEnd::ReceiverDropped);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Ok(StreamEnd::Closed);
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Ok(StreamEnd::Closed);
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }

                _ = tx.closed() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::ReceiverDropped);
                }
            }
        }
    }
}
