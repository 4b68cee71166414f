//! Live venue adapters wiring the box-arbitrage engine's venue-agnostic
//! traits to the real Kalshi and Polymarket clients.
//!
//! The execution core leaves [`OrderParams::market_id`] blank — it has no
//! notion of the live interval's mapping. This adapter resolves the real
//! ticker/token id from the coordinator's active mapping at submission
//! time, since only the composition root knows which interval is live.

use std::sync::Arc;

use algo_trade_arbitrage_cross::reconciler::{RemotePosition, VenuePositionSource};
use algo_trade_arbitrage_cross::settlement::{ResolvedSide, SettlementSource};
use algo_trade_arbitrage_cross::types::{IntervalMapping, OrderAction, OrderParams};
use algo_trade_arbitrage_cross::execution::{
    ExecutionError, OrderLifecycleStatus, OrderOutcome, VenueClients, VenueOrderStatus,
};
use algo_trade_core::quote::{NormalizedQuote, Side, Venue};
use algo_trade_core::time::IntervalKey;
use algo_trade_kalshi::{
    Action as KalshiAction, KalshiClient, KalshiWebSocket, MarketStatus as KalshiMarketStatus,
    OrderRequest as KalshiOrderRequest, OrderStatus as KalshiOrderStatus, OrderType as KalshiOrderType,
    Side as KalshiSide,
};
use algo_trade_polymarket::client::{ClobOrderType, PolymarketClient};
use algo_trade_polymarket::Side as PolySide;
use algo_trade_polymarket::websocket::PolymarketWebSocket;
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Everything the live adapter needs to resolve a market id for an order:
/// the active interval and its discovered mapping.
struct ActiveMarket {
    interval: IntervalKey,
    mapping: IntervalMapping,
}

/// Live [`VenueClients`]/[`VenuePositionSource`]/[`SettlementSource`]
/// implementation backed by the real REST/WS clients.
pub struct LiveVenues {
    kalshi: Arc<KalshiClient>,
    polymarket: Arc<PolymarketClient>,
    kalshi_ws: RwLock<Option<Arc<KalshiWebSocket>>>,
    polymarket_ws: RwLock<Option<Arc<PolymarketWebSocket>>>,
    active: RwLock<Option<ActiveMarket>>,
}

impl LiveVenues {
    #[must_use]
    pub fn new(kalshi: Arc<KalshiClient>, polymarket: Arc<PolymarketClient>) -> Self {
        Self {
            kalshi,
            polymarket,
            kalshi_ws: RwLock::new(None),
            polymarket_ws: RwLock::new(None),
            active: RwLock::new(None),
        }
    }

    pub fn set_kalshi_ws(&self, ws: Arc<KalshiWebSocket>) {
        *self.kalshi_ws.write() = Some(ws);
    }

    pub fn set_polymarket_ws(&self, ws: Arc<PolymarketWebSocket>) {
        *self.polymarket_ws.write() = Some(ws);
    }

    /// Called by the coordinator once a new interval's mapping is complete
    /// and subscriptions are live.
    pub fn set_active_interval(&self, interval: IntervalKey, mapping: IntervalMapping) {
        *self.active.write() = Some(ActiveMarket { interval, mapping });
    }

    fn kalshi_ticker(&self) -> Result<String, ExecutionError> {
        let active = self.active.read();
        let market = active
            .as_ref()
            .ok_or_else(|| ExecutionError::VenueCall("no active interval".to_string()))?;
        market
            .mapping
            .kalshi
            .as_ref()
            .map(|k| k.market_ticker.clone())
            .ok_or_else(|| ExecutionError::VenueCall("kalshi market not yet discovered".to_string()))
    }

    fn polymarket_token(&self, side: Side) -> Result<String, ExecutionError> {
        let active = self.active.read();
        let market = active
            .as_ref()
            .ok_or_else(|| ExecutionError::VenueCall("no active interval".to_string()))?;
        let poly = market
            .mapping
            .polymarket
            .as_ref()
            .ok_or_else(|| ExecutionError::VenueCall("polymarket market not yet discovered".to_string()))?;
        Ok(match side {
            Side::Yes => poly.up_token.clone(),
            Side::No => poly.down_token.clone(),
        })
    }
}

#[async_trait]
impl VenueClients for LiveVenues {
    async fn place_order(&self, params: &OrderParams) -> Result<OrderOutcome, ExecutionError> {
        match params.venue {
            Venue::Kalshi => {
                let ticker = self.kalshi_ticker()?;
                let count = params
                    .qty
                    .to_u32()
                    .ok_or_else(|| ExecutionError::Rejected("qty does not fit u32".to_string()))?;
                let side = match params.side {
                    Side::Yes => KalshiSide::Yes,
                    Side::No => KalshiSide::No,
                };
                let request = match (params.action, params.price) {
                    (OrderAction::Buy, Some(price)) => {
                        let cents = (price * Decimal::from(100))
                            .to_u32()
                            .ok_or_else(|| ExecutionError::Rejected("bad price".to_string()))?;
                        match side {
                            KalshiSide::Yes => KalshiOrderRequest::buy_yes(ticker, cents, count),
                            KalshiSide::No => KalshiOrderRequest::buy_no(ticker, cents, count),
                        }
                    }
                    (OrderAction::Buy, None) => KalshiOrderRequest::market_buy(ticker, side, count),
                    (OrderAction::Sell, price) => {
                        let cents = price.and_then(|p| (p * Decimal::from(100)).to_u32());
                        KalshiOrderRequest {
                            ticker,
                            side,
                            action: KalshiAction::Sell,
                            order_type: if cents.is_some() {
                                KalshiOrderType::Limit
                            } else {
                                KalshiOrderType::Market
                            },
                            count,
                            yes_price: matches!(side, KalshiSide::Yes).then_some(cents).flatten(),
                            no_price: matches!(side, KalshiSide::No).then_some(cents).flatten(),
                            client_order_id: None,
                            expiration_ts: None,
                        }
                    }
                }
                .with_client_order_id(params.client_order_id.clone());

                let order = self
                    .kalshi
                    .submit_order(&request)
                    .await
                    .map_err(|e| ExecutionError::VenueCall(e.to_string()))?;

                Ok(OrderOutcome {
                    order_id: order.order_id,
                    filled_qty: Decimal::from(order.filled_count),
                    fill_price: order.avg_fill_price.map(|p| p / Decimal::from(100)),
                })
            }
            Venue::Polymarket => {
                let token_id = self.polymarket_token(params.side)?;
                let side = match params.action {
                    OrderAction::Buy => PolySide::Buy,
                    OrderAction::Sell => PolySide::Sell,
                };
                let price = params.price.unwrap_or(Decimal::new(99, 2));
                let nonce = u64::try_from(params.client_order_id.len())
                    .unwrap_or(0)
                    .wrapping_add(params.qty.to_u64().unwrap_or(0));
                let result = self
                    .polymarket
                    .submit_order(&token_id, side, price, params.qty, ClobOrderType::Fok, nonce, 60)
                    .await
                    .map_err(|e| ExecutionError::VenueCall(e.to_string()))?;

                let filled = if result.status == "matched" {
                    params.qty
                } else {
                    Decimal::ZERO
                };
                Ok(OrderOutcome {
                    order_id: result.order_id,
                    filled_qty: filled,
                    fill_price: if filled.is_zero() { None } else { Some(price) },
                })
            }
        }
    }

    async fn cancel_order(&self, venue: Venue, order_id: &str) -> Result<bool, ExecutionError> {
        match venue {
            Venue::Kalshi => self
                .kalshi
                .cancel_order(order_id)
                .await
                .map(|()| true)
                .map_err(|e| ExecutionError::VenueCall(e.to_string())),
            Venue::Polymarket => self
                .polymarket
                .cancel_order(order_id)
                .await
                .map_err(|e| ExecutionError::VenueCall(e.to_string())),
        }
    }

    async fn get_order_status(
        &self,
        venue: Venue,
        order_id: &str,
    ) -> Result<VenueOrderStatus, ExecutionError> {
        match venue {
            Venue::Kalshi => {
                let order = self
                    .kalshi
                    .get_order(order_id)
                    .await
                    .map_err(|e| ExecutionError::VenueCall(e.to_string()))?;
                let status = match order.status {
                    KalshiOrderStatus::Filled => OrderLifecycleStatus::Filled,
                    KalshiOrderStatus::PartialFilled => OrderLifecycleStatus::PartiallyFilled,
                    KalshiOrderStatus::Cancelled => OrderLifecycleStatus::Cancelled,
                    KalshiOrderStatus::Rejected => OrderLifecycleStatus::Rejected,
                    KalshiOrderStatus::Pending | KalshiOrderStatus::Resting => {
                        OrderLifecycleStatus::Live
                    }
                };
                Ok(VenueOrderStatus {
                    status,
                    filled_qty: Decimal::from(order.filled_count),
                    fill_price: order.avg_fill_price.map(|p| p / Decimal::from(100)),
                })
            }
            Venue::Polymarket => {
                let response = self
                    .polymarket
                    .get_order_status(order_id)
                    .await
                    .map_err(|e| ExecutionError::VenueCall(e.to_string()))?;
                let filled_qty = response.filled_size();
                let status = match response.status.as_str() {
                    "matched" => OrderLifecycleStatus::Filled,
                    "canceled" => OrderLifecycleStatus::Cancelled,
                    _ if !filled_qty.is_zero() => OrderLifecycleStatus::PartiallyFilled,
                    _ => OrderLifecycleStatus::Live,
                };
                Ok(VenueOrderStatus {
                    status,
                    filled_qty,
                    fill_price: None,
                })
            }
        }
    }

    async fn get_quote(&self, venue: Venue) -> Option<NormalizedQuote> {
        let active = self.active.read();
        let market = active.as_ref()?;
        match venue {
            Venue::Kalshi => {
                let ws = self.kalshi_ws.read().clone()?;
                let ticker = market.mapping.kalshi.as_ref()?.market_ticker.clone();
                let book = ws.get_book(&ticker)?;
                book.normalize(market.interval.end_ts * 1000, market.interval.end_ts * 1000)
            }
            Venue::Polymarket => {
                let ws = self.polymarket_ws.read().clone()?;
                let poly = market.mapping.polymarket.as_ref()?;
                if poly.up_token.is_empty() || poly.down_token.is_empty() {
                    return None;
                }
                Some(ws.normalize_pair(&poly.up_token, &poly.down_token, market.interval, 0, 0))
            }
        }
    }
}

#[async_trait]
impl VenuePositionSource for LiveVenues {
    async fn fetch_position(&self, venue: Venue) -> Result<RemotePosition, ExecutionError> {
        match venue {
            Venue::Kalshi => {
                let ticker = self.kalshi_ticker().unwrap_or_default();
                let positions = self
                    .kalshi
                    .get_positions()
                    .await
                    .map_err(|e| ExecutionError::VenueCall(e.to_string()))?;
                let mut yes = Decimal::ZERO;
                let mut no = Decimal::ZERO;
                for position in positions.into_iter().filter(|p| p.ticker == ticker) {
                    match position.side {
                        KalshiSide::Yes => yes += Decimal::from(position.count),
                        KalshiSide::No => no += Decimal::from(position.count),
                    }
                }
                Ok(RemotePosition { yes, no })
            }
            Venue::Polymarket => {
                // Polymarket exposes no balance-query endpoint on this client; the
                // CLOB REST API only reports order history, not on-chain CTF token
                // balances. Until an indexer is wired up, the reconciler treats
                // this venue's locally tracked position as authoritative.
                Err(ExecutionError::VenueCall(
                    "polymarket has no position-query endpoint".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl SettlementSource for LiveVenues {
    async fn query_resolution(
        &self,
        venue: Venue,
        mapping: &IntervalMapping,
    ) -> Option<ResolvedSide> {
        match venue {
            Venue::Kalshi => {
                let ticker = &mapping.kalshi.as_ref()?.market_ticker;
                let market = self.kalshi.get_market(ticker).await.ok()?;
                if market.status != KalshiMarketStatus::Settled {
                    return None;
                }
                match market.last_price {
                    Some(p) if p >= Decimal::from(50) => Some(ResolvedSide::Yes),
                    Some(_) => Some(ResolvedSide::No),
                    None => None,
                }
            }
            Venue::Polymarket => {
                let poly = mapping.polymarket.as_ref()?;
                let market = self.polymarket.get_market(&poly.slug).await.ok()?;
                let up_token = market
                    .tokens
                    .iter()
                    .find(|t| t.outcome.eq_ignore_ascii_case("up") || t.outcome.eq_ignore_ascii_case("yes"))?;
                match up_token.winner {
                    Some(true) => Some(ResolvedSide::Yes),
                    Some(false) => Some(ResolvedSide::No),
                    None => None,
                }
            }
        }
    }
}
