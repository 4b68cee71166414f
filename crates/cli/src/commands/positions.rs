//! Read-only position reconciliation dump and manual liquidation commands.
//!
//! These bypass the box-arbitrage executor entirely: they place single-leg
//! market sells directly through [`LiveVenues`], for the operator to use
//! when something needs to be unwound outside the normal execution path.

use std::sync::Arc;

use algo_trade_arbitrage_cross::execution::VenueClients;
use algo_trade_arbitrage_cross::reconciler::VenuePositionSource;
use algo_trade_arbitrage_cross::types::{OrderAction, OrderParams, TimeInForce};
use algo_trade_core::quote::{Side, Venue};
use algo_trade_core::AppConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::setup;
use crate::venues::LiveVenues;

pub async fn check(config: AppConfig) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;

    for venue in [Venue::Kalshi, Venue::Polymarket] {
        let local = engine.positions.position(venue);
        match engine.venues.fetch_position(venue).await {
            Ok(remote) => {
                info!(
                    %venue,
                    local_yes = %local.yes,
                    local_no = %local.no,
                    remote_yes = %remote.yes,
                    remote_no = %remote.no,
                    "position check"
                );
            }
            Err(err) => {
                warn!(%venue, local_yes = %local.yes, local_no = %local.no, error = %err, "remote position unavailable");
            }
        }
    }

    Ok(())
}

pub async fn sell_all(config: AppConfig) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;
    engine.state.set_liquidation_in_progress(true);

    for venue in [Venue::Kalshi, Venue::Polymarket] {
        let snapshot = engine.positions.position(venue);
        for (side, qty) in [(Side::Yes, snapshot.yes), (Side::No, snapshot.no)] {
            if qty > Decimal::ZERO {
                if let Err(err) = sell_one(&engine.venues, venue, side, qty).await {
                    warn!(%venue, %side, %qty, error = %err, "liquidation leg failed");
                }
            }
        }
    }

    engine.state.set_liquidation_in_progress(false);
    Ok(())
}

pub async fn sell_one_position(config: AppConfig, venue: Venue, side: Side) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;
    let snapshot = engine.positions.position(venue);
    let qty = match side {
        Side::Yes => snapshot.yes,
        Side::No => snapshot.no,
    };
    if qty.is_zero() {
        info!(%venue, %side, "no position to sell");
        return Ok(());
    }
    sell_one(&engine.venues, venue, side, qty).await
}

async fn sell_one(venues: &Arc<LiveVenues>, venue: Venue, side: Side, qty: Decimal) -> Result<()> {
    let params = OrderParams {
        venue,
        side,
        action: OrderAction::Sell,
        price: None,
        qty,
        time_in_force: TimeInForce::FillAndKill,
        market_id: String::new(),
        client_order_id: format!("liq-{}", Uuid::new_v4()),
    };
    let outcome = venues
        .place_order(&params)
        .await
        .context("submitting liquidation sell")?;
    info!(%venue, %side, %qty, order_id = %outcome.order_id, filled = %outcome.filled_qty, "liquidation order submitted");
    Ok(())
}
