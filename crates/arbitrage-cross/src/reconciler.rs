//! Position reconciler.
//!
//! Periodically compares the locally tracked position against what each
//! venue reports and overrides the local view once a divergence survives a
//! stability check — guards against acting on a single stale or transient
//! venue read. Never runs while an execution is in flight, the kill switch
//! is tripped, a liquidation is underway, or we're inside the post-execution
//! grace period.

use std::collections::HashMap;
use std::sync::Arc;

use algo_trade_core::config::RiskConfig;
use algo_trade_core::quote::{Side, Venue};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::execution::{ExecutionError, VenueClients};
use crate::execution_state::ExecutionState;
use crate::position::PositionTracker;
use crate::types::{OrderAction, OrderParams, PositionSnapshot, TimeInForce};

/// One venue's authoritative position, as reported by the venue itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemotePosition {
    pub yes: Decimal,
    pub no: Decimal,
}

/// Queries venue-side position state. Separate from [`VenueClients`] since
/// fetching positions and placing orders are independently mockable.
#[async_trait]
pub trait VenuePositionSource: Send + Sync {
    async fn fetch_position(&self, venue: Venue) -> Result<RemotePosition, ExecutionError>;
}

/// What the reconciler decided to do about an aggregate YES/NO imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectiveAction {
    None,
    Complete,
    Unwind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideOverride {
    pub venue: Venue,
    pub side: Side,
    pub local_qty_before: Decimal,
    pub remote_qty: Decimal,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub overrides: Vec<SideOverride>,
    pub action: CorrectiveAction,
    pub action_qty: Decimal,
    pub action_venue: Option<Venue>,
}

impl TickReport {
    fn empty() -> Self {
        Self {
            overrides: Vec::new(),
            action: CorrectiveAction::None,
            action_qty: Decimal::ZERO,
            action_venue: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingDivergence {
    remote_qty: Decimal,
    seen_at_ms: i64,
}

type VenueSideKey = (Venue, Side);

pub struct PositionReconciler {
    state: Arc<ExecutionState>,
    positions: Arc<PositionTracker>,
    pending: Mutex<HashMap<VenueSideKey, PendingDivergence>>,
    corrective_cooldown_until_ms: Mutex<Option<i64>>,
    last_execution_ms: Mutex<Option<i64>>,
}

impl PositionReconciler {
    #[must_use]
    pub fn new(state: Arc<ExecutionState>, positions: Arc<PositionTracker>) -> Self {
        Self {
            state,
            positions,
            pending: Mutex::new(HashMap::new()),
            corrective_cooldown_until_ms: Mutex::new(None),
            last_execution_ms: Mutex::new(None),
        }
    }

    /// Called by the executor after every attempt, successful or not, to
    /// arm the post-execution grace period.
    pub fn note_execution(&self, now_ms: i64) {
        *self.last_execution_ms.lock() = Some(now_ms);
    }

    fn in_grace_period(&self, risk: &RiskConfig, now_ms: i64) -> bool {
        match *self.last_execution_ms.lock() {
            Some(t) => now_ms - t < risk.reconciler_post_exec_grace_period_ms as i64,
            None => false,
        }
    }

    fn in_corrective_cooldown(&self, now_ms: i64) -> bool {
        matches!(*self.corrective_cooldown_until_ms.lock(), Some(until) if now_ms < until)
    }

    /// One reconciliation pass. Returns an empty report if the reconciler
    /// should not act this tick at all.
    pub async fn tick(
        &self,
        sources: &dyn VenuePositionSource,
        clients: &dyn VenueClients,
        risk: &RiskConfig,
        now_ms: i64,
    ) -> TickReport {
        if self.state.is_busy()
            || self.state.kill_switch_triggered()
            || self.state.liquidation_in_progress()
            || self.in_grace_period(risk, now_ms)
            || self.in_corrective_cooldown(now_ms)
        {
            return TickReport::empty();
        }

        let (kalshi_result, polymarket_result) = tokio::join!(
            sources.fetch_position(Venue::Kalshi),
            sources.fetch_position(Venue::Polymarket),
        );

        let mut overrides = Vec::new();
        for (venue, result) in [
            (Venue::Kalshi, kalshi_result),
            (Venue::Polymarket, polymarket_result),
        ] {
            let Ok(remote) = result else { continue };
            let local = self.positions.position(venue);
            for (side, local_qty, remote_qty) in
                [(Side::Yes, local.yes, remote.yes), (Side::No, local.no, remote.no)]
            {
                if let Some(over) = self.reconcile_side(venue, side, local_qty, remote_qty, risk, now_ms) {
                    overrides.push(over);
                }
            }
        }

        if overrides.is_empty() {
            return TickReport::empty();
        }

        let imbalance = self.positions.total_imbalance();
        let (action, action_qty, action_venue) =
            self.plan_corrective_action(clients, imbalance, risk).await;

        if action != CorrectiveAction::None {
            self.execute_corrective_action(clients, action, action_qty, action_venue, imbalance)
                .await;
            *self.corrective_cooldown_until_ms.lock() =
                Some(now_ms + risk.reconciler_corrective_cooldown_ms as i64);
        }

        TickReport {
            overrides,
            action,
            action_qty,
            action_venue,
        }
    }

    /// Applies the noise-floor / stability-check rule for one venue/side and
    /// overrides the tracker if the divergence clears it.
    fn reconcile_side(
        &self,
        venue: Venue,
        side: Side,
        local_qty: Decimal,
        remote_qty: Decimal,
        risk: &RiskConfig,
        now_ms: i64,
    ) -> Option<SideOverride> {
        let divergence = (local_qty - remote_qty).abs();
        let key = (venue, side);

        if divergence.is_zero() {
            self.pending.lock().remove(&key);
            return None;
        }

        if divergence < risk.reconciler_noise_floor_contracts {
            self.pending.lock().remove(&key);
            self.positions.override_position(venue, side, remote_qty, now_ms);
            return Some(SideOverride {
                venue,
                side,
                local_qty_before: local_qty,
                remote_qty,
            });
        }

        let mut pending = self.pending.lock();
        match pending.get(&key) {
            Some(prev)
                if prev.seen_at_ms < now_ms
                    && (prev.remote_qty - remote_qty).abs()
                        <= risk.reconciler_stability_tolerance_contracts =>
            {
                pending.remove(&key);
                drop(pending);
                self.positions.override_position(venue, side, remote_qty, now_ms);
                Some(SideOverride {
                    venue,
                    side,
                    local_qty_before: local_qty,
                    remote_qty,
                })
            }
            _ => {
                pending.insert(
                    key,
                    PendingDivergence {
                        remote_qty,
                        seen_at_ms: now_ms,
                    },
                );
                None
            }
        }
    }

    /// Decides whether to complete the box (buy the deficient side) or
    /// unwind the excess side, checking top-of-book depth before committing.
    async fn plan_corrective_action(
        &self,
        clients: &dyn VenueClients,
        imbalance: PositionSnapshot,
        risk: &RiskConfig,
    ) -> (CorrectiveAction, Decimal, Option<Venue>) {
        let excess = imbalance.imbalance();
        if excess.is_zero() {
            return (CorrectiveAction::None, Decimal::ZERO, None);
        }
        let capped_qty = excess.min(risk.max_reconciler_action_qty);
        let deficient_side = if imbalance.yes > imbalance.no {
            Side::No
        } else {
            Side::Yes
        };
        let excess_side = deficient_side.opposite();

        for venue in [Venue::Kalshi, Venue::Polymarket] {
            if let Some(quote) = clients.get_quote(venue).await {
                let (ask_price, ask_size) = quote.best_ask(deficient_side);
                if ask_size >= capped_qty && ask_price < dec!(0.95) {
                    return (CorrectiveAction::Complete, capped_qty, Some(venue));
                }
            }
        }

        for venue in [Venue::Kalshi, Venue::Polymarket] {
            if let Some(quote) = clients.get_quote(venue).await {
                let (_, bid_size) = quote.best_bid(excess_side);
                if bid_size >= capped_qty {
                    return (CorrectiveAction::Unwind, capped_qty, Some(venue));
                }
            }
        }

        (CorrectiveAction::None, Decimal::ZERO, None)
    }

    async fn execute_corrective_action(
        &self,
        clients: &dyn VenueClients,
        action: CorrectiveAction,
        qty: Decimal,
        venue: Option<Venue>,
        imbalance: PositionSnapshot,
    ) {
        let Some(venue) = venue else { return };
        let deficient_side = if imbalance.yes > imbalance.no {
            Side::No
        } else {
            Side::Yes
        };
        let (side, order_action) = match action {
            CorrectiveAction::Complete => (deficient_side, OrderAction::Buy),
            CorrectiveAction::Unwind => (deficient_side.opposite(), OrderAction::Sell),
            CorrectiveAction::None => return,
        };

        let params = OrderParams {
            venue,
            side,
            action: order_action,
            price: None,
            qty,
            time_in_force: TimeInForce::FillAndKill,
            market_id: String::new(),
            client_order_id: format!("RECON-{venue}-{side}"),
        };
        if let Err(err) = clients.place_order(&params).await {
            tracing::warn!(?err, ?action, "reconciler corrective order failed");
        }
    }
}
