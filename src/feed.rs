//! Live trade feed over WebSocket
//!
//! Connects to a Binance-style combined stream, decodes each message into a
//! normalized [`Tick`], and forwards it over a channel. Undecodable messages
//! are logged and dropped; they never tear down the connection. The feed task
//! is a scoped resource: [`FeedHandle::shutdown`] closes it, is idempotent,
//! and a fresh feed can be spawned later against the same store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// One normalized trade tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Feed-native stream symbol, e.g. "BTCUSDT"
    pub symbol: String,
    pub price: f64,
    pub received_at: DateTime<Utc>,
}

/// Why a raw feed message could not become a [`Tick`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("message is not a parseable stream envelope")]
    MalformedPayload,

    #[error("message envelope is missing required tick fields")]
    MissingFields,
}

/// Combined-stream envelope: `{"stream": "...", "data": {...}}`.
///
/// Everything is optional at the serde level so field absence maps to
/// [`DecodeError::MissingFields`] rather than a parse failure; the feed also
/// sends subscription acks and heartbeats that share the outer shape.
#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    #[allow(dead_code)]
    stream: Option<String>,
    data: Option<TradePayload>,
}

#[derive(Debug, Deserialize)]
struct TradePayload {
    #[serde(rename = "s")]
    symbol: Option<String>,
    /// Price arrives string-encoded
    #[serde(rename = "p")]
    price: Option<String>,
}

/// Decode one raw feed message into a [`Tick`].
pub fn decode(raw: &str) -> Result<Tick, DecodeError> {
    let envelope: StreamEnvelope =
        serde_json::from_str(raw).map_err(|_| DecodeError::MalformedPayload)?;

    let payload = envelope.data.ok_or(DecodeError::MissingFields)?;
    let symbol = payload.symbol.ok_or(DecodeError::MissingFields)?;
    let price_raw = payload.price.ok_or(DecodeError::MissingFields)?;
    let price: f64 = price_raw
        .parse()
        .map_err(|_| DecodeError::MalformedPayload)?;

    Ok(Tick {
        symbol,
        price,
        received_at: Utc::now(),
    })
}

/// Build the combined-stream URL for a set of trade symbols.
pub fn stream_url<'a>(ws_base: &str, symbols: impl Iterator<Item = &'a str>) -> String {
    let streams = symbols
        .map(|symbol| format!("{symbol}@trade"))
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/stream?streams={}", ws_base.trim_end_matches('/'), streams)
}

/// Feed connection configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Full combined-stream URL
    pub url: String,
    /// Ping interval to keep the connection alive
    pub ping_interval: Duration,
    /// Delay before reconnecting after a drop
    pub reconnect_delay: Duration,
    /// Tick channel capacity
    pub channel_buffer_size: usize,
}

impl FeedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(2),
            channel_buffer_size: 1000,
        }
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Connection status updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
}

/// Handle to a running feed task.
pub struct FeedHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Request the feed task to stop. Safe to call repeatedly, including after
    /// the task has already exited.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the feed task.
///
/// Returns the handle plus receivers for decoded ticks and connection status.
/// The task reconnects on drops until shut down; swapping in a fresh
/// connection is just `shutdown()` followed by another `spawn_feed` with the
/// same store left intact.
pub fn spawn_feed(
    config: FeedConfig,
) -> (
    FeedHandle,
    mpsc::Receiver<Tick>,
    watch::Receiver<ConnectionStatus>,
) {
    let (tick_tx, tick_rx) = mpsc::channel(config.channel_buffer_size);
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        run_feed_loop(config, tick_tx, status_tx, shutdown_rx).await;
    });

    (
        FeedHandle { shutdown_tx, task },
        tick_rx,
        status_rx,
    )
}

/// Connection loop with auto-reconnect: connect, drain messages, report
/// status, sleep, repeat until the shutdown flag flips.
async fn run_feed_loop(
    config: FeedConfig,
    tick_tx: mpsc::Sender<Tick>,
    status_tx: watch::Sender<ConnectionStatus>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("starting trade feed for {}", config.url);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        let _ = status_tx.send(ConnectionStatus::Reconnecting);

        let connection = tokio::select! {
            result = connect_async(&config.url) => result,
            _ = shutdown_rx.changed() => break,
        };

        match connection {
            Ok((ws_stream, _)) => {
                info!("connected to trade feed at {}", config.url);
                let _ = status_tx.send(ConnectionStatus::Connected);

                let (mut write, mut read) = ws_stream.split();

                // Keepalive pings on a side task
                let ping_interval = config.ping_interval;
                let (ping_shutdown_tx, mut ping_shutdown_rx) = mpsc::channel::<()>(1);
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(ping_interval);
                    loop {
                        tokio::select! {
                            _ = interval.tick() => {
                                if write.send(Message::Ping(vec![].into())).await.is_err() {
                                    debug!("ping failed, connection likely dead");
                                    break;
                                }
                            }
                            _ = ping_shutdown_rx.recv() => break,
                        }
                    }
                });

                let mut receiver_gone = false;
                loop {
                    let message = tokio::select! {
                        message = read.next() => message,
                        _ = shutdown_rx.changed() => break,
                    };
                    let Some(message) = message else {
                        break;
                    };

                    match message {
                        Ok(Message::Text(text)) => match decode(&text) {
                            Ok(tick) => {
                                if tick_tx.send(tick).await.is_err() {
                                    warn!("tick receiver dropped, stopping feed");
                                    receiver_gone = true;
                                    break;
                                }
                            }
                            Err(reason) => {
                                // Acks and heartbeats land here too, keep it quiet
                                debug!("dropping feed message: {}", reason);
                            }
                        },
                        Ok(Message::Close(_)) => {
                            warn!("feed closed the connection");
                            break;
                        }
                        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                            // Heartbeat, tungstenite replies automatically
                        }
                        Err(e) => {
                            error!("feed error: {}", e);
                            break;
                        }
                        _ => {}
                    }
                }

                let _ = ping_shutdown_tx.send(()).await;
                let _ = status_tx.send(ConnectionStatus::Disconnected);

                if receiver_gone {
                    break;
                }
            }
            Err(e) => {
                error!("failed to connect to {}: {}", config.url, e);
                let _ = status_tx.send(ConnectionStatus::Disconnected);
            }
        }

        if *shutdown_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            _ = shutdown_rx.changed() => break,
        }
    }

    let _ = status_tx.send(ConnectionStatus::Disconnected);
    info!("trade feed stopped");
}
