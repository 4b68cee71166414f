//! WebSocket client for Kalshi's orderbook channel.
//!
//! Subscribes to `orderbook_snapshot`/`orderbook_delta` for a set of
//! tickers and maintains an in-memory [`KalshiBook`] per ticker. Kalshi
//! caps a single connection at 24h; this client reconnects preemptively
//! at 23.5h so a forced disconnect never catches an open position with a
//! stale book.

use crate::book::{BookUpdate, KalshiBook};
use algo_trade_core::quote::Side;
use algo_trade_core::time::IntervalKey;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub const WS_URL: &str = "wss://trading-api.kalshi.com/trade-api/ws/v2";

/// Forces a reconnect well inside Kalshi's 24h connection cap.
const PREEMPTIVE_RECONNECT: Duration = Duration::from_secs(23 * 3600 + 30 * 60);

#[derive(Debug, Clone)]
pub enum QuoteEvent {
    Snapshot { ticker: String, book: KalshiBook },
    Delta { ticker: String, side: Side, price: Decimal, size: Decimal },
    Connected,
    Disconnected { reason: String },
    SequenceGap { ticker: String },
}

#[derive(Debug, Clone)]
pub struct KalshiWsConfig {
    pub url: String,
    pub initial_reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
    pub ping_interval: Duration,
    pub channel_buffer_size: usize,
}

impl Default for KalshiWsConfig {
    fn default() -> Self {
        Self {
            url: WS_URL.to_string(),
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            ping_interval: Duration::from_secs(10),
            channel_buffer_size: 1000,
        }
    }
}

#[derive(Error, Debug)]
pub enum KalshiWsError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct KalshiWebSocket {
    books: Arc<RwLock<HashMap<String, KalshiBook>>>,
    shutdown_tx: mpsc::Sender<()>,
}

impl KalshiWebSocket {
    pub async fn connect(
        tickers: Vec<String>,
        interval: IntervalKey,
        config: KalshiWsConfig,
    ) -> Result<(Self, mpsc::Receiver<QuoteEvent>), KalshiWsError> {
        let (event_tx, event_rx) = mpsc::channel(config.channel_buffer_size);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let books: Arc<RwLock<HashMap<String, KalshiBook>>> = Arc::new(RwLock::new(
            tickers
                .iter()
                .map(|t| (t.clone(), KalshiBook::new(t.clone(), interval)))
                .collect(),
        ));

        let books_clone = Arc::clone(&books);
        tokio::spawn(run_connection_loop(config, tickers, books_clone, event_tx, shutdown_rx));

        Ok((Self { books, shutdown_tx }, event_rx))
    }

    #[must_use]
    pub fn get_book(&self, ticker: &str) -> Option<KalshiBook> {
        self.books.read().get(ticker).cloned()
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[derive(Debug, Serialize)]
struct SubscribeMessage<'a> {
    id: u64,
    cmd: &'static str,
    params: SubscribeParams<'a>,
}

#[derive(Debug, Serialize)]
struct SubscribeParams<'a> {
    channels: [&'static str; 1],
    market_tickers: &'a [String],
}

#[derive(Debug, Deserialize)]
struct WsEnvelope {
    #[serde(rename = "type")]
    msg_type: String,
    #[serde(default)]
    seq: Option<u64>,
    #[serde(default)]
    msg: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OrderbookSnapshotMsg {
    market_ticker: String,
    #[serde(default)]
    yes: Vec<[i64; 2]>,
    #[serde(default)]
    no: Vec<[i64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OrderbookDeltaMsg {
    market_ticker: String,
    price: i64,
    delta: i64,
    side: String,
}

async fn run_connection_loop(
    config: KalshiWsConfig,
    tickers: Vec<String>,
    books: Arc<RwLock<HashMap<String, KalshiBook>>>,
    event_tx: mpsc::Sender<QuoteEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut reconnect_delay = config.initial_reconnect_delay;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            info!("kalshi websocket shutdown requested");
            break;
        }

        info!(url = %config.url, "connecting to kalshi orderbook feed");

        match connect_and_run(&config, &tickers, &books, &event_tx, &mut shutdown_rx).await {
            Ok(()) => {
                info!("kalshi websocket closed cleanly");
                reconnect_delay = config.initial_reconnect_delay;
            }
            Err(err) => {
                error!(error = %err, "kalshi websocket connection failed");
                let _ = event_tx
                    .send(QuoteEvent::Disconnected {
                        reason: err.to_string(),
                    })
                    .await;
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
            }
        }
    }
}

async fn connect_and_run(
    config: &KalshiWsConfig,
    tickers: &[String],
    books: &Arc<RwLock<HashMap<String, KalshiBook>>>,
    event_tx: &mpsc::Sender<QuoteEvent>,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> Result<(), KalshiWsError> {
    let (ws_stream, _response) = connect_async(&config.url)
        .await
        .map_err(|e| KalshiWsError::ConnectionFailed(e.to_string()))?;

    info!("kalshi websocket connected");
    let (mut write, mut read) = ws_stream.split();

    let subscribe = SubscribeMessage {
        id: 1,
        cmd: "subscribe",
        params: SubscribeParams {
            channels: ["orderbook_delta"],
            market_tickers: tickers,
        },
    };
    write.send(Message::Text(serde_json::to_string(&subscribe)?)).await?;
    let _ = event_tx.send(QuoteEvent::Connected).await;

    let mut ping_interval = tokio::time::interval(config.ping_interval);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let preemptive_reconnect = sleep(PREEMPTIVE_RECONNECT);
    tokio::pin!(preemptive_reconnect);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                let _ = write.close().await;
                return Ok(());
            }
            () = &mut preemptive_reconnect => {
                info!("pre-emptive reconnect ahead of 24h connection cap");
                let _ = write.close().await;
                return Ok(());
            }
            _ = ping_interval.tick() => {
                if let Err(e) = write.send(Message::Ping(vec![])).await {
                    warn!(error = %e, "kalshi ping failed");
                    return Err(KalshiWsError::WebSocket(e));
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = process_message(&text, books, event_tx).await {
                            warn!(error = %e, "failed to process kalshi message");
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        return Err(KalshiWsError::ConnectionFailed(
                            frame.map(|f| f.reason.to_string()).unwrap_or_else(|| "closed".to_string()),
                        ));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(KalshiWsError::WebSocket(e)),
                    None => return Err(KalshiWsError::ConnectionFailed("stream ended".to_string())),
                }
            }
        }
    }
}

async fn process_message(
    text: &str,
    books: &Arc<RwLock<HashMap<String, KalshiBook>>>,
    event_tx: &mpsc::Sender<QuoteEvent>,
) -> Result<(), KalshiWsError> {
    let envelope: WsEnvelope = serde_json::from_str(text)?;

    match envelope.msg_type.as_str() {
        "orderbook_snapshot" => {
            let snapshot: OrderbookSnapshotMsg = serde_json::from_value(envelope.msg)?;
            let seq = envelope.seq.unwrap_or(0);
            let yes = snapshot
                .yes
                .iter()
                .map(|[price, qty]| (cents_to_decimal(*price), Decimal::from(*qty)))
                .collect();
            let no = snapshot
                .no
                .iter()
                .map(|[price, qty]| (cents_to_decimal(*price), Decimal::from(*qty)))
                .collect();

            let mut guard = books.write();
            let book = guard
                .entry(snapshot.market_ticker.clone())
                .or_insert_with(|| {
                    KalshiBook::new(snapshot.market_ticker.clone(), IntervalKey { start_ts: 0, end_ts: 900 })
                });
            let _ = book.apply(BookUpdate::Snapshot { seq, yes, no });
            let emitted = book.clone();
            drop(guard);

            let _ = event_tx
                .send(QuoteEvent::Snapshot {
                    ticker: snapshot.market_ticker,
                    book: emitted,
                })
                .await;
        }
        "orderbook_delta" => {
            let delta: OrderbookDeltaMsg = serde_json::from_value(envelope.msg)?;
            let seq = envelope.seq.unwrap_or(0);
            let side = if delta.side == "yes" { Side::Yes } else { Side::No };
            let price = cents_to_decimal(delta.price);
            let size = Decimal::from(delta.delta);

            let mut guard = books.write();
            if let Some(book) = guard.get_mut(&delta.market_ticker) {
                if book
                    .apply(BookUpdate::Delta { seq, side, price, size })
                    .is_err()
                {
                    drop(guard);
                    let _ = event_tx
                        .send(QuoteEvent::SequenceGap {
                            ticker: delta.market_ticker,
                        })
                        .await;
                    return Ok(());
                }
            }
            drop(guard);

            let _ = event_tx
                .send(QuoteEvent::Delta {
                    ticker: delta.market_ticker,
                    side,
                    price,
                    size,
                })
                .await;
        }
        other => {
            debug!(msg_type = %other, "unhandled kalshi ws message type");
        }
    }

    Ok(())
}

fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::from_str(&format!("{}.{:02}", cents / 100, cents.rem_euclid(100))).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_uses_preemptive_reconnect_window() {
        let config = KalshiWsConfig::default();
        assert_eq!(config.url, WS_URL);
        assert!(PREEMPTIVE_RECONNECT < Duration::from_secs(24 * 3600));
        assert!(PREEMPTIVE_RECONNECT > Duration::from_secs(23 * 3600));
    }

    #[test]
    fn cents_to_decimal_formats_two_decimal_places() {
        assert_eq!(cents_to_decimal(45), Decimal::from_str("0.45").unwrap());
        assert_eq!(cents_to_decimal(5), Decimal::from_str("0.05").unwrap());
        assert_eq!(cents_to_decimal(100), Decimal::from_str("1.00").unwrap());
    }

    #[test]
    fn subscribe_message_serializes_expected_shape() {
        let tickers = vec!["KXBTC-TEST".to_string()];
        let msg = SubscribeMessage {
            id: 1,
            cmd: "subscribe",
            params: SubscribeParams {
                channels: ["orderbook_delta"],
                market_tickers: &tickers,
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""cmd":"subscribe""#));
        assert!(json.contains("KXBTC-TEST"));
    }
}
