//! Two-phase commit execution core.
//!
//! The hardest subsystem: submits the onchain leg first (slower, cheaper to
//! abandon on a miss), then the CLOB leg within a tight deadline, and
//! unwinds the stranded leg through a price ladder if the second leg
//! doesn't land in time.

use std::time::Duration;

use algo_trade_core::config::RiskConfig;
use algo_trade_core::quote::{NormalizedQuote, Side, Venue};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::timeout;
use uuid::Uuid;

use crate::execution_state::{ExecutionState, KillSwitchReason};
use crate::guards::{self, GuardContext, GuardOutcome};
use crate::position::PositionTracker;
use crate::types::{
    ExecutionRecord, ExecutionStatus, LegExecution, OpenOrder, Opportunity, OpportunityLeg,
    OrderAction, OrderParams, PendingSettlement, TimeInForce, UnwindRecord, UnwindStep,
};

/// Outcome of submitting a single order.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    pub order_id: String,
    pub filled_qty: Decimal,
    pub fill_price: Option<Decimal>,
}

/// Point-in-time status of a previously submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLifecycleStatus {
    Live,
    Filled,
    PartiallyFilled,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct VenueOrderStatus {
    pub status: OrderLifecycleStatus,
    pub filled_qty: Decimal,
    pub fill_price: Option<Decimal>,
}

/// Error surfaced by a venue capability call.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("venue rejected order: {0}")]
    Rejected(String),
    #[error("venue call failed: {0}")]
    VenueCall(String),
}

/// The capability bundle the executor calls through. Passing `None` at the
/// call site means dry-run: no network I/O, a synthetic fill is simulated.
#[async_trait]
pub trait VenueClients: Send + Sync {
    async fn place_order(&self, params: &OrderParams) -> Result<OrderOutcome, ExecutionError>;
    async fn cancel_order(&self, venue: Venue, order_id: &str) -> Result<bool, ExecutionError>;
    async fn get_order_status(
        &self,
        venue: Venue,
        order_id: &str,
    ) -> Result<VenueOrderStatus, ExecutionError>;
    async fn get_quote(&self, venue: Venue) -> Option<NormalizedQuote>;
}

const MIN_PRICE: Decimal = dec!(0.01);
const MAX_PRICE: Decimal = dec!(0.99);

/// `ceil(max(5, 1/price))` — Polymarket's minimum order size in shares.
#[must_use]
pub fn polymarket_min_qty(price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return dec!(5);
    }
    let implied = Decimal::ONE / price;
    dec!(5).max(implied).ceil()
}

/// Clamps a qty to Polymarket's minima when the leg venue requires it.
fn enforce_venue_minima(venue: Venue, action: OrderAction, price: Decimal, qty: Decimal) -> Decimal {
    if venue == Venue::Polymarket && action == OrderAction::Buy {
        let min_qty = polymarket_min_qty(price);
        let min_value_qty = if price > Decimal::ZERO {
            Decimal::ONE / price
        } else {
            min_qty
        };
        qty.max(min_qty).max(min_value_qty)
    } else {
        qty
    }
}

/// Result of one `execute` call.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub record: ExecutionRecord,
    pub should_enter_cooldown: bool,
    pub should_trigger_kill_switch: Option<KillSwitchReason>,
    pub error: Option<String>,
}

/// Orders the two legs by venue speed: the onchain leg (Polymarket) commits
/// first since a miss there costs nothing; the CLOB leg (Kalshi) follows
/// within the deadline since its fills are effectively instantaneous.
fn plan_legs(opportunity: &Opportunity) -> (OpportunityLeg, OpportunityLeg) {
    if opportunity.leg_a.venue == Venue::Polymarket {
        (opportunity.leg_a, opportunity.leg_b)
    } else {
        (opportunity.leg_b, opportunity.leg_a)
    }
}

fn new_execution_id() -> String {
    format!("exec-{}", Uuid::new_v4())
}

struct BusyGuard<'a>(&'a ExecutionState);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.release_busy_lock();
    }
}

pub struct ExecutionCore {
    state: std::sync::Arc<ExecutionState>,
    positions: std::sync::Arc<PositionTracker>,
}

impl ExecutionCore {
    #[must_use]
    pub fn new(
        state: std::sync::Arc<ExecutionState>,
        positions: std::sync::Arc<PositionTracker>,
    ) -> Self {
        Self { state, positions }
    }

    /// Runs the full two-phase commit for one opportunity.
    pub async fn execute(
        &self,
        opportunity: Opportunity,
        risk: &RiskConfig,
        time_to_rollover_ms: i64,
        clients: Option<&dyn VenueClients>,
        now_ms: i64,
    ) -> ExecutionResult {
        if !self.state.acquire_busy_lock() {
            return self.abort(opportunity, now_ms, "busy lock held by another execution");
        }
        let _busy = BusyGuard(&self.state);

        self.state.roll_daily_if_needed(now_ms);

        let guard_ctx = GuardContext {
            opportunity: &opportunity,
            risk,
            in_cooldown: self.state.is_in_cooldown(now_ms),
            daily_realized_pnl: self.state.daily_realized_pnl(),
            total_notional: self.state.total_notional(),
            open_order_count: self.positions.open_order_count(),
            position: self.positions.total_imbalance(),
            time_to_rollover_ms,
        };
        if let GuardOutcome::Fail(reason) = guards::evaluate(&guard_ctx) {
            return self.abort(opportunity, now_ms, reason);
        }

        let execution_id = new_execution_id();
        let qty = (opportunity.max_size() * risk.book_depth_fraction).min(risk.max_qty_per_trade);
        let (first_leg, second_leg) = plan_legs(&opportunity);
        let mut record = ExecutionRecord::new(execution_id.clone(), opportunity.clone(), now_ms);
        record.status = ExecutionStatus::LegASubmitting;

        let first_qty = enforce_venue_minima(first_leg.venue, OrderAction::Buy, first_leg.price, qty);
        let first_outcome = self
            .submit_leg(
                clients,
                &first_leg,
                first_qty,
                format!("A-{execution_id}"),
                now_ms,
            )
            .await;

        let first_fill = match first_outcome {
            Some(outcome) if outcome.filled_qty >= first_qty * dec!(0.999) => outcome,
            _ => {
                record.status = ExecutionStatus::LegAFailed;
                record.end_ts = Some(now_ms);
                return ExecutionResult {
                    success: false,
                    record,
                    should_enter_cooldown: false,
                    should_trigger_kill_switch: None,
                    error: Some("leg A did not fill".to_string()),
                };
            }
        };

        record.status = ExecutionStatus::LegAFilled;
        record.leg_a = LegExecution {
            venue: Some(first_leg.venue),
            side: Some(first_leg.side),
            order_id: Some(first_fill.order_id.clone()),
            client_order_id: Some(format!("A-{execution_id}")),
            requested_price: first_leg.price,
            requested_qty: first_qty,
            filled_qty: first_fill.filled_qty,
            fill_price: first_fill.fill_price.or(Some(first_leg.price)),
            submitted_at_ms: now_ms,
            resolved_at_ms: Some(now_ms),
        };
        self.positions.record_fill(
            first_leg.venue,
            first_leg.side,
            true,
            first_fill.filled_qty,
            first_fill.fill_price.unwrap_or(first_leg.price),
            opportunity.interval,
            &format!("A-{execution_id}"),
            "",
            now_ms,
        );
        self.state
            .add_notional(first_fill.filled_qty * first_fill.fill_price.unwrap_or(first_leg.price));

        record.status = ExecutionStatus::LegBSubmitting;
        let second_qty =
            enforce_venue_minima(second_leg.venue, OrderAction::Buy, second_leg.price, first_fill.filled_qty);
        let leg_b_deadline = Duration::from_millis(risk.max_leg_delay_ms);
        let second_outcome = match clients {
            None => self
                .submit_leg(clients, &second_leg, second_qty, format!("B-{execution_id}"), now_ms)
                .await,
            Some(c) => timeout(
                leg_b_deadline,
                self.submit_leg(Some(c), &second_leg, second_qty, format!("B-{execution_id}"), now_ms),
            )
            .await
            .ok()
            .flatten(),
        };

        let second_fill = match second_outcome {
            Some(outcome) if outcome.filled_qty >= second_qty * dec!(0.999) => Some(outcome),
            _ => None,
        };

        if let Some(second_fill) = second_fill {
            record.status = ExecutionStatus::Success;
            record.leg_b = LegExecution {
                venue: Some(second_leg.venue),
                side: Some(second_leg.side),
                order_id: Some(second_fill.order_id.clone()),
                client_order_id: Some(format!("B-{execution_id}")),
                requested_price: second_leg.price,
                requested_qty: second_qty,
                filled_qty: second_fill.filled_qty,
                fill_price: second_fill.fill_price.or(Some(second_leg.price)),
                submitted_at_ms: now_ms,
                resolved_at_ms: Some(now_ms),
            };
            self.positions.record_fill(
                second_leg.venue,
                second_leg.side,
                true,
                second_fill.filled_qty,
                second_fill.fill_price.unwrap_or(second_leg.price),
                opportunity.interval,
                &format!("B-{execution_id}"),
                "",
                now_ms,
            );
            let leg_b_cost = second_fill.filled_qty * second_fill.fill_price.unwrap_or(second_leg.price);
            self.state.add_notional(leg_b_cost);

            let guaranteed_qty = record.leg_a.filled_qty.min(record.leg_b.filled_qty);
            let total_cost = record.leg_a.filled_qty * record.leg_a.fill_price.unwrap_or_default()
                + record.leg_b.filled_qty * record.leg_b.fill_price.unwrap_or_default();
            let realized_pnl = guaranteed_qty - total_cost;
            record.realized_pnl = Some(realized_pnl);
            record.end_ts = Some(now_ms);

            self.state.add_pending_settlement(PendingSettlement {
                execution_id: execution_id.clone(),
                interval: opportunity.interval,
                expected_pnl: realized_pnl,
                settles_at_ms: opportunity.interval.end_ts * 1000,
            });
            self.state.enter_cooldown(now_ms, risk.cooldown_ms_after_success);

            return ExecutionResult {
                success: true,
                record,
                should_enter_cooldown: false,
                should_trigger_kill_switch: None,
                error: None,
            };
        }

        // Leg B missed: unwind the stranded leg-A position.
        record.status = ExecutionStatus::Unwinding;
        let unwind = self
            .unwind_leg(clients, &first_leg, first_fill.filled_qty, risk, now_ms)
            .await;
        record.status = ExecutionStatus::Unwound;
        record.end_ts = Some(now_ms);
        let realized_loss = unwind.realized_loss;
        record.realized_pnl = Some(-realized_loss);
        record.unwind = Some(unwind);

        self.state.add_unwind_loss(realized_loss);
        self.state
            .remove_notional(first_fill.filled_qty * first_fill.fill_price.unwrap_or(first_leg.price));
        self.state.enter_cooldown(now_ms, risk.cooldown_ms_after_failure);

        let should_trigger_kill_switch = if -self.state.daily_realized_pnl() >= risk.max_daily_loss {
            self.state.trigger_kill_switch(KillSwitchReason::DailyLoss);
            Some(KillSwitchReason::DailyLoss)
        } else {
            None
        };

        ExecutionResult {
            success: false,
            record,
            should_enter_cooldown: true,
            should_trigger_kill_switch,
            error: Some("leg B missed deadline, leg A unwound".to_string()),
        }
    }

    fn abort(&self, opportunity: Opportunity, now_ms: i64, reason: &str) -> ExecutionResult {
        let mut record = ExecutionRecord::new(new_execution_id(), opportunity, now_ms);
        record.status = ExecutionStatus::Aborted;
        record.end_ts = Some(now_ms);
        ExecutionResult {
            success: false,
            record,
            should_enter_cooldown: false,
            should_trigger_kill_switch: None,
            error: Some(reason.to_string()),
        }
    }

    async fn submit_leg(
        &self,
        clients: Option<&dyn VenueClients>,
        leg: &OpportunityLeg,
        qty: Decimal,
        client_order_id: String,
        now_ms: i64,
    ) -> Option<OrderOutcome> {
        let params = OrderParams {
            venue: leg.venue,
            side: leg.side,
            action: OrderAction::Buy,
            price: Some(leg.price.clamp(MIN_PRICE, MAX_PRICE)),
            qty,
            time_in_force: TimeInForce::FillOrKill,
            market_id: String::new(),
            client_order_id: client_order_id.clone(),
        };

        match clients {
            None => {
                // Dry run: synthesize an immediate full FOK fill at the planned price.
                self.positions.record_open_order(OpenOrder {
                    client_order_id: client_order_id.clone(),
                    venue: leg.venue,
                    side: leg.side,
                    price: leg.price,
                    qty,
                    filled_qty: qty,
                    submitted_at_ms: now_ms,
                });
                self.positions.remove_open_order(&client_order_id);
                Some(OrderOutcome {
                    order_id: format!("dry-{client_order_id}"),
                    filled_qty: qty,
                    fill_price: Some(leg.price),
                })
            }
            Some(c) => {
                self.positions.record_open_order(OpenOrder {
                    client_order_id: client_order_id.clone(),
                    venue: leg.venue,
                    side: leg.side,
                    price: leg.price,
                    qty,
                    filled_qty: Decimal::ZERO,
                    submitted_at_ms: now_ms,
                });
                let result = c.place_order(&params).await.ok();
                self.positions.remove_open_order(&client_order_id);
                result
            }
        }
    }

    /// Sells a stranded leg-A position through a descending price ladder,
    /// with the final step a market order, bounded by a total time cap.
    async fn unwind_leg(
        &self,
        clients: Option<&dyn VenueClients>,
        leg: &OpportunityLeg,
        qty: Decimal,
        risk: &RiskConfig,
        now_ms: i64,
    ) -> UnwindRecord {
        let mut record = UnwindRecord {
            steps: Vec::new(),
            total_filled_qty: Decimal::ZERO,
            realized_loss: Decimal::ZERO,
            started_at_ms: now_ms,
            completed_at_ms: None,
        };

        let mut remaining = qty;
        for step_index in 0..risk.unwind_ladder_steps {
            if remaining <= Decimal::ZERO {
                break;
            }
            let is_final_step = step_index + 1 == risk.unwind_ladder_steps;
            let step_price = if is_final_step {
                MIN_PRICE
            } else {
                (leg.price - risk.unwind_ladder_step_size * Decimal::from(step_index + 1))
                    .max(MIN_PRICE)
            };

            let sell_params = OrderParams {
                venue: leg.venue,
                side: leg.side,
                action: OrderAction::Sell,
                price: if is_final_step { None } else { Some(step_price) },
                qty: remaining,
                time_in_force: TimeInForce::FillAndKill,
                market_id: String::new(),
                client_order_id: format!("unwind-{}-{step_index}", leg.venue),
            };

            let filled = match clients {
                None => remaining,
                Some(c) => {
                    let step_timeout = Duration::from_millis(risk.unwind_ladder_step_timeout_ms);
                    match timeout(step_timeout, c.place_order(&sell_params)).await {
                        Ok(Ok(outcome)) => outcome.filled_qty,
                        _ => Decimal::ZERO,
                    }
                }
            };

            record.steps.push(UnwindStep {
                step_index,
                price: step_price,
                is_market_order: is_final_step,
                filled_qty: filled,
                attempted_at_ms: now_ms,
            });
            record.total_filled_qty += filled;
            record.realized_loss += filled * (leg.price - step_price);
            remaining -= filled;
        }

        record.completed_at_ms = Some(now_ms);
        record
    }
}
