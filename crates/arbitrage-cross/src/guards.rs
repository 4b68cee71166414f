//! Pure pre-trade guard chain.
//!
//! Evaluated in a fixed order; the first failing predicate short-circuits
//! with a human-readable reason. Nothing here touches the network or a
//! clock other than the `now_ms`/`time_to_rollover_ms` passed in, so the
//! whole chain is unit-testable without a runtime.

use algo_trade_core::config::RiskConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Opportunity, PositionSnapshot};

/// Snapshot of process-wide state the guard chain needs to consult.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub opportunity: &'a Opportunity,
    pub risk: &'a RiskConfig,
    pub in_cooldown: bool,
    pub daily_realized_pnl: Decimal,
    pub total_notional: Decimal,
    pub open_order_count: u32,
    pub position: PositionSnapshot,
    pub time_to_rollover_ms: i64,
}

/// Result of running the full guard chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Pass,
    Fail(&'static str),
}

impl GuardOutcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

const MIN_VALID_PRICE: Decimal = dec!(0.01);
const MAX_VALID_PRICE: Decimal = dec!(0.99);

/// Runs every guard in the fixed contract order, returning the first failure.
#[must_use]
pub fn evaluate(ctx: &GuardContext<'_>) -> GuardOutcome {
    for guard in GUARD_CHAIN {
        let outcome = guard(ctx);
        if !outcome.is_pass() {
            return outcome;
        }
    }
    GuardOutcome::Pass
}

type GuardFn = fn(&GuardContext<'_>) -> GuardOutcome;

const GUARD_CHAIN: &[GuardFn] = &[
    valid_venue_prices,
    min_edge,
    sufficient_size,
    not_in_cooldown,
    daily_loss_under_cap,
    notional_under_cap,
    open_order_count_under_cap,
    position_balance,
    time_to_rollover_exceeds_cutoff,
];

fn valid_venue_prices(ctx: &GuardContext<'_>) -> GuardOutcome {
    let prices = [ctx.opportunity.leg_a.price, ctx.opportunity.leg_b.price];
    for price in prices {
        if price < MIN_VALID_PRICE || price > MAX_VALID_PRICE {
            return GuardOutcome::Fail("venue price outside $0.01-$0.99 bounds");
        }
    }
    GuardOutcome::Pass
}

fn min_edge(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.opportunity.edge_net < ctx.risk.min_edge_net {
        GuardOutcome::Fail("edge net below configured minimum")
    } else {
        GuardOutcome::Pass
    }
}

fn sufficient_size(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.opportunity.max_size() <= Decimal::ZERO {
        GuardOutcome::Fail("no available size on one or both legs")
    } else {
        GuardOutcome::Pass
    }
}

fn not_in_cooldown(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.in_cooldown {
        GuardOutcome::Fail("executor is in cooldown")
    } else {
        GuardOutcome::Pass
    }
}

fn daily_loss_under_cap(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.daily_realized_pnl < -ctx.risk.max_daily_loss {
        GuardOutcome::Fail("daily realized loss at or beyond cap")
    } else {
        GuardOutcome::Pass
    }
}

fn notional_under_cap(ctx: &GuardContext<'_>) -> GuardOutcome {
    let candidate_notional = ctx.opportunity.max_size() * ctx.opportunity.cost;
    if ctx.total_notional + candidate_notional > ctx.risk.max_notional {
        GuardOutcome::Fail("trade would exceed max notional")
    } else {
        GuardOutcome::Pass
    }
}

fn open_order_count_under_cap(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.open_order_count >= ctx.risk.max_open_orders {
        GuardOutcome::Fail("open order count at cap")
    } else {
        GuardOutcome::Pass
    }
}

fn position_balance(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.position.imbalance() > ctx.risk.max_position_imbalance_contracts {
        GuardOutcome::Fail("existing position imbalance exceeds tolerance")
    } else {
        GuardOutcome::Pass
    }
}

fn time_to_rollover_exceeds_cutoff(ctx: &GuardContext<'_>) -> GuardOutcome {
    if ctx.time_to_rollover_ms <= ctx.risk.no_new_positions_cutoff_ms as i64 {
        GuardOutcome::Fail("too close to interval rollover")
    } else {
        GuardOutcome::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algo_trade_core::quote::{Side, Venue};
    use algo_trade_core::time::IntervalKey;
    use crate::types::OpportunityLeg;
    use rust_decimal_macros::dec;

    fn opportunity() -> Opportunity {
        Opportunity {
            interval: IntervalKey {
                start_ts: 0,
                end_ts: 900,
            },
            leg_a: OpportunityLeg {
                venue: Venue::Kalshi,
                side: Side::Yes,
                price: dec!(0.40),
                size: dec!(25),
            },
            leg_b: OpportunityLeg {
                venue: Venue::Polymarket,
                side: Side::No,
                price: dec!(0.40),
                size: dec!(25),
            },
            cost: dec!(0.80),
            edge_gross: dec!(0.20),
            edge_net: dec!(0.185),
        }
    }

    fn base_ctx(opp: &Opportunity, risk: &RiskConfig) -> GuardContext<'_> {
        GuardContext {
            opportunity: opp,
            risk,
            in_cooldown: false,
            daily_realized_pnl: Decimal::ZERO,
            total_notional: Decimal::ZERO,
            open_order_count: 0,
            position: PositionSnapshot::default(),
            time_to_rollover_ms: 200_000,
        }
    }

    #[test]
    fn all_pass_for_healthy_opportunity() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        assert_eq!(evaluate(&base_ctx(&opp, &risk)), GuardOutcome::Pass);
    }

    #[test]
    fn fails_on_invalid_price() {
        let mut opp = opportunity();
        opp.leg_a.price = dec!(1.00);
        let risk = RiskConfig::default();
        let outcome = evaluate(&base_ctx(&opp, &risk));
        assert_eq!(
            outcome,
            GuardOutcome::Fail("venue price outside $0.01-$0.99 bounds")
        );
    }

    #[test]
    fn fails_on_edge_below_minimum() {
        let mut opp = opportunity();
        opp.edge_net = dec!(0.01);
        let risk = RiskConfig::default();
        let outcome = evaluate(&base_ctx(&opp, &risk));
        assert_eq!(outcome, GuardOutcome::Fail("edge net below configured minimum"));
    }

    #[test]
    fn fails_on_cooldown() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.in_cooldown = true;
        assert_eq!(evaluate(&ctx), GuardOutcome::Fail("executor is in cooldown"));
    }

    #[test]
    fn fails_on_daily_loss_cap() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.daily_realized_pnl = -risk.max_daily_loss;
        assert_eq!(
            evaluate(&ctx),
            GuardOutcome::Fail("daily realized loss at or beyond cap")
        );
    }

    #[test]
    fn fails_on_notional_cap() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.total_notional = risk.max_notional;
        assert_eq!(evaluate(&ctx), GuardOutcome::Fail("trade would exceed max notional"));
    }

    #[test]
    fn fails_on_open_order_cap() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.open_order_count = risk.max_open_orders;
        assert_eq!(evaluate(&ctx), GuardOutcome::Fail("open order count at cap"));
    }

    #[test]
    fn fails_on_position_imbalance() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.position = PositionSnapshot {
            yes: dec!(10),
            no: dec!(5),
            as_of_ms: 0,
        };
        assert_eq!(
            evaluate(&ctx),
            GuardOutcome::Fail("existing position imbalance exceeds tolerance")
        );
    }

    #[test]
    fn fails_when_too_close_to_rollover() {
        let opp = opportunity();
        let risk = RiskConfig::default();
        let mut ctx = base_ctx(&opp, &risk);
        ctx.time_to_rollover_ms = 10_000;
        assert_eq!(evaluate(&ctx), GuardOutcome::Fail("too close to interval rollover"));
    }

    #[test]
    fn price_check_short_circuits_before_edge_check() {
        let mut opp = opportunity();
        opp.leg_a.price = dec!(1.50);
        opp.edge_net = dec!(0.0);
        let risk = RiskConfig::default();
        let outcome = evaluate(&base_ctx(&opp, &risk));
        assert_eq!(
            outcome,
            GuardOutcome::Fail("venue price outside $0.01-$0.99 bounds")
        );
    }
}
