//! Interval-keyed data model for cross-venue box arbitrage.
//!
//! Reuses [`algo_trade_core::quote`]'s `Venue`/`Side`/`NormalizedQuote` as the
//! cross-venue invariant and [`algo_trade_core::time::IntervalKey`] as the
//! primary key threading through the mapping store, pending settlements, and
//! fill history.

use algo_trade_core::quote::{Side, Venue};
use algo_trade_core::time::IntervalKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One leg of a detected box: which venue/side to buy, at what price and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityLeg {
    pub venue: Venue,
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
}

/// A detected box-arbitrage opportunity for one interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub interval: IntervalKey,
    pub leg_a: OpportunityLeg,
    pub leg_b: OpportunityLeg,
    pub cost: Decimal,
    pub edge_gross: Decimal,
    pub edge_net: Decimal,
}

impl Opportunity {
    /// Size available for the box: capped by the thinner leg's top-of-book.
    #[must_use]
    pub fn max_size(&self) -> Decimal {
        self.leg_a.size.min(self.leg_b.size)
    }
}

/// Polymarket's half of a resolved interval mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymarketMapping {
    pub up_token: String,
    pub down_token: String,
    pub slug: String,
    pub end_ts: i64,
    pub reference_price: Option<Decimal>,
}

/// Kalshi's half of a resolved interval mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KalshiMapping {
    pub event_ticker: String,
    pub market_ticker: String,
    pub series_ticker: String,
    pub close_ts: i64,
    pub reference_price: Option<Decimal>,
}

/// Venue market identifiers resolved for one interval. Populated incrementally
/// by discovery — adding one venue never erases the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalMapping {
    pub polymarket: Option<PolymarketMapping>,
    pub kalshi: Option<KalshiMapping>,
    pub discovered_at_ms: i64,
}

impl IntervalMapping {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.polymarket.is_some() && self.kalshi.is_some()
    }

    /// Merges in a freshly discovered Kalshi half, preserving any existing Polymarket half.
    pub fn set_kalshi(&mut self, mapping: KalshiMapping, now_ms: i64) {
        self.kalshi = Some(mapping);
        self.discovered_at_ms = now_ms;
    }

    /// Merges in a freshly discovered Polymarket half, preserving any existing Kalshi half.
    pub fn set_polymarket(&mut self, mapping: PolymarketMapping, now_ms: i64) {
        self.polymarket = Some(mapping);
        self.discovered_at_ms = now_ms;
    }
}

/// Lifecycle status of an [`ExecutionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    LegASubmitting,
    LegAFilled,
    LegAFailed,
    LegBSubmitting,
    LegBFilled,
    Unwinding,
    Unwound,
    Success,
    Aborted,
}

impl ExecutionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Unwound | Self::Aborted | Self::LegAFailed
        )
    }
}

/// Record of one leg's submission and fill outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegExecution {
    pub venue: Option<Venue>,
    pub side: Option<Side>,
    pub order_id: Option<String>,
    pub client_order_id: Option<String>,
    pub requested_price: Decimal,
    pub requested_qty: Decimal,
    pub filled_qty: Decimal,
    pub fill_price: Option<Decimal>,
    pub submitted_at_ms: i64,
    pub resolved_at_ms: Option<i64>,
}

/// One step of the unwind ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwindStep {
    pub step_index: u32,
    pub price: Decimal,
    pub is_market_order: bool,
    pub filled_qty: Decimal,
    pub attempted_at_ms: i64,
}

/// Full unwind attempt record for a stranded leg-A position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnwindRecord {
    pub steps: Vec<UnwindStep>,
    pub total_filled_qty: Decimal,
    pub realized_loss: Decimal,
    pub started_at_ms: i64,
    pub completed_at_ms: Option<i64>,
}

/// Execution of a single opportunity through the two-phase commit state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub opportunity: Opportunity,
    pub status: ExecutionStatus,
    pub leg_a: LegExecution,
    pub leg_b: LegExecution,
    pub unwind: Option<UnwindRecord>,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    pub expected_edge_net: Decimal,
    pub realized_pnl: Option<Decimal>,
}

impl ExecutionRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, opportunity: Opportunity, start_ts: i64) -> Self {
        let expected_edge_net = opportunity.edge_net;
        Self {
            id: id.into(),
            opportunity,
            status: ExecutionStatus::Pending,
            leg_a: LegExecution::default(),
            leg_b: LegExecution::default(),
            unwind: None,
            start_ts,
            end_ts: None,
            expected_edge_net,
            realized_pnl: None,
        }
    }
}

/// Net contracts held per venue/side, as of a point in time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub yes: Decimal,
    pub no: Decimal,
    pub as_of_ms: i64,
}

impl PositionSnapshot {
    #[must_use]
    pub fn imbalance(&self) -> Decimal {
        (self.yes - self.no).abs()
    }
}

/// Cost-basis ledger entry keyed by `(venue, side, interval)`; average-cost
/// accounting. Pruned once `total_qty` falls below `0.001`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CostBasisEntry {
    pub total_cost: Decimal,
    pub total_qty: Decimal,
}

impl CostBasisEntry {
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        if self.total_qty.is_zero() {
            None
        } else {
            Some(self.total_cost / self.total_qty)
        }
    }

    pub fn add_buy(&mut self, qty: Decimal, price: Decimal) {
        self.total_cost += qty * price;
        self.total_qty += qty;
    }

    /// Removes `qty` at the current average cost; returns the realized cost removed.
    pub fn remove_sell(&mut self, qty: Decimal) -> Decimal {
        let avg = self.average_price().unwrap_or_default();
        let removed_cost = avg * qty;
        self.total_qty = (self.total_qty - qty).max(Decimal::ZERO);
        self.total_cost = (self.total_cost - removed_cost).max(Decimal::ZERO);
        removed_cost
    }

    #[must_use]
    pub fn is_prunable(&self) -> bool {
        self.total_qty < dec!(0.001)
    }
}

/// Bookkeeping for a completed box held through interval close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSettlement {
    pub execution_id: String,
    pub interval: IntervalKey,
    pub expected_pnl: Decimal,
    pub settles_at_ms: i64,
}

/// An order resting or recently submitted, keyed by client-order-id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    pub client_order_id: String,
    pub venue: Venue,
    pub side: Side,
    pub price: Decimal,
    pub qty: Decimal,
    pub filled_qty: Decimal,
    pub submitted_at_ms: i64,
}

/// One completed fill, stored in the bounded fill-history ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRecord {
    pub client_order_id: String,
    pub venue: Venue,
    pub side: Side,
    pub price: Decimal,
    pub qty: Decimal,
    pub filled_at_ms: i64,
    pub interval: IntervalKey,
}

/// Bounded ring buffer retaining the most recent [`FillHistory::CAPACITY`] fills.
#[derive(Debug, Clone, Default)]
pub struct FillHistory {
    entries: VecDeque<FillRecord>,
}

impl FillHistory {
    pub const CAPACITY: usize = 1000;

    pub fn push(&mut self, fill: FillRecord) {
        if self.entries.len() >= Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(fill);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FillRecord> {
        self.entries.iter()
    }
}

/// Time-in-force for a normalized order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    FillOrKill,
    FillAndKill,
    GoodTilCancelled,
}

/// Buy or sell, venue-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Buy,
    Sell,
}

/// Venue-normalized order planning shape emitted by the execution core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderParams {
    pub venue: Venue,
    pub side: Side,
    pub action: OrderAction,
    /// `None` signals a market order (worst-side bound applied by the caller).
    pub price: Option<Decimal>,
    pub qty: Decimal,
    pub time_in_force: TimeInForce,
    pub market_id: String,
    pub client_order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn interval() -> IntervalKey {
        IntervalKey {
            start_ts: 0,
            end_ts: 900,
        }
    }

    #[test]
    fn opportunity_max_size_is_thinner_leg() {
        let opp = Opportunity {
            interval: interval(),
            leg_a: OpportunityLeg {
                venue: Venue::Kalshi,
                side: Side::No,
                price: dec!(0.47),
                size: dec!(10),
            },
            leg_b: OpportunityLeg {
                venue: Venue::Polymarket,
                side: Side::Yes,
                price: dec!(0.48),
                size: dec!(25),
            },
            cost: dec!(0.95),
            edge_gross: dec!(0.05),
            edge_net: dec!(0.01),
        };
        assert_eq!(opp.max_size(), dec!(10));
    }

    #[test]
    fn interval_mapping_merges_without_erasing() {
        let mut mapping = IntervalMapping::default();
        mapping.set_kalshi(
            KalshiMapping {
                event_ticker: "KXBTCD-26JUL2615".into(),
                market_ticker: "KXBTCD-26JUL2615-B1".into(),
                series_ticker: "KXBTCD".into(),
                close_ts: 900,
                reference_price: None,
            },
            1000,
        );
        assert!(!mapping.is_complete());
        mapping.set_polymarket(
            PolymarketMapping {
                up_token: "up".into(),
                down_token: "down".into(),
                slug: "btc-15m".into(),
                end_ts: 900,
                reference_price: None,
            },
            2000,
        );
        assert!(mapping.is_complete());
        assert!(mapping.kalshi.is_some());
        assert_eq!(mapping.discovered_at_ms, 2000);
    }

    #[test]
    fn cost_basis_average_cost_accounting() {
        let mut entry = CostBasisEntry::default();
        entry.add_buy(dec!(10), dec!(0.40));
        entry.add_buy(dec!(10), dec!(0.60));
        assert_eq!(entry.average_price(), Some(dec!(0.50)));

        entry.remove_sell(dec!(15));
        assert_eq!(entry.total_qty, dec!(5));
        assert_eq!(entry.average_price(), Some(dec!(0.50)));
    }

    #[test]
    fn cost_basis_prunable_below_threshold() {
        let mut entry = CostBasisEntry::default();
        entry.add_buy(dec!(1), dec!(0.5));
        entry.remove_sell(dec!(0.9995));
        assert!(entry.is_prunable());
    }

    #[test]
    fn fill_history_bounded_ring() {
        let mut history = FillHistory::default();
        for i in 0..1500i64 {
            history.push(FillRecord {
                client_order_id: format!("A-{i}"),
                venue: Venue::Kalshi,
                side: Side::Yes,
                price: dec!(0.5),
                qty: dec!(1),
                filled_at_ms: i,
                interval: interval(),
            });
        }
        assert_eq!(history.len(), FillHistory::CAPACITY);
        assert_eq!(history.iter().next().unwrap().client_order_id, "A-500");
    }

    #[test]
    fn position_snapshot_imbalance() {
        let snap = PositionSnapshot {
            yes: dec!(10),
            no: dec!(7),
            as_of_ms: 0,
        };
        assert_eq!(snap.imbalance(), dec!(3));
    }
}
