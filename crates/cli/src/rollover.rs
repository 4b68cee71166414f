//! [`RolloverActions`] implementation wiring the coordinator's
//! cancel/subscribe hooks to the real venue WebSocket clients.

use std::sync::Arc;

use algo_trade_arbitrage_cross::coordinator::RolloverActions;
use algo_trade_arbitrage_cross::types::IntervalMapping;
use algo_trade_core::quote::Venue;
use algo_trade_core::time::IntervalKey;
use algo_trade_kalshi::{KalshiWebSocket, KalshiWsConfig};
use algo_trade_polymarket::websocket::{PolymarketWebSocket, WebSocketConfig};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::venues::LiveVenues;

/// Opens a fresh WS connection for the rolled-over interval's instruments
/// and hands it to [`LiveVenues`]; the previous interval's connection is
/// simply dropped, since Kalshi/Polymarket books are scoped to the tickers
/// subscribed at connect time.
pub struct LiveRolloverActions {
    venues: Arc<LiveVenues>,
}

impl LiveRolloverActions {
    #[must_use]
    pub fn new(venues: Arc<LiveVenues>) -> Self {
        Self { venues }
    }
}

#[async_trait]
impl RolloverActions for LiveRolloverActions {
    /// Every order this engine ever places is fill-or-kill or
    /// fill-and-kill (see `execution::ExecutionCore`); nothing rests on
    /// either book, so there is nothing to cancel on rollover.
    async fn cancel_open_orders(&self, venue: Venue, interval: IntervalKey) {
        info!(%venue, interval_start = interval.start_ts, "no resting orders to cancel (fok/fak only)");
    }

    async fn subscribe(&self, venue: Venue, interval: IntervalKey, mapping: &IntervalMapping) {
        self.venues.set_active_interval(interval, mapping.clone());

        match venue {
            Venue::Kalshi => {
                let Some(kalshi) = &mapping.kalshi else {
                    warn!("subscribe called for kalshi with no discovered market");
                    return;
                };
                match KalshiWebSocket::connect(
                    vec![kalshi.market_ticker.clone()],
                    interval,
                    KalshiWsConfig::default(),
                )
                .await
                {
                    Ok((ws, mut events)) => {
                        let ws = Arc::new(ws);
                        self.venues.set_kalshi_ws(ws);
                        tokio::spawn(async move { while events.recv().await.is_some() {} });
                        info!(ticker = %kalshi.market_ticker, "subscribed to kalshi orderbook feed");
                    }
                    Err(err) => warn!(error = %err, ticker = %kalshi.market_ticker, "kalshi ws connect failed"),
                }
            }
            Venue::Polymarket => {
                let Some(polymarket) = &mapping.polymarket else {
                    warn!("subscribe called for polymarket with no discovered market");
                    return;
                };
                if polymarket.up_token.is_empty() || polymarket.down_token.is_empty() {
                    warn!("polymarket tokens not yet resolved, skipping subscribe");
                    return;
                }
                match PolymarketWebSocket::connect(
                    vec![polymarket.up_token.clone(), polymarket.down_token.clone()],
                    WebSocketConfig::default(),
                )
                .await
                {
                    Ok((ws, mut events)) => {
                        let ws = Arc::new(ws);
                        self.venues.set_polymarket_ws(ws);
                        tokio::spawn(async move { while events.recv().await.is_some() {} });
                        info!(slug = %polymarket.slug, "subscribed to polymarket orderbook feed");
                    }
                    Err(err) => warn!(error = %err, slug = %polymarket.slug, "polymarket ws connect failed"),
                }
            }
        }
    }
}
