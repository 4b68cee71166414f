//! Authoritative local position tracker.
//!
//! Tracks net contracts per `(venue, side)`, resting orders keyed by
//! client-order-id, a bounded fill-history ring, a per-interval cost-basis
//! ledger, and the last market identifier traded per venue/side so the
//! tracker can still sell after the mapping has rolled over.

use std::collections::HashMap;

use algo_trade_core::quote::{Side, Venue};
use algo_trade_core::time::IntervalKey;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::types::{CostBasisEntry, FillHistory, FillRecord, OpenOrder, PositionSnapshot};

type VenueSideKey = (Venue, Side);
type CostBasisKey = (Venue, Side, IntervalKey);

pub struct PositionTracker {
    positions: RwLock<HashMap<Venue, PositionSnapshot>>,
    open_orders: RwLock<HashMap<String, OpenOrder>>,
    fill_history: RwLock<FillHistory>,
    cost_basis: RwLock<HashMap<CostBasisKey, CostBasisEntry>>,
    last_known_market_id: RwLock<HashMap<VenueSideKey, String>>,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
            open_orders: RwLock::new(HashMap::new()),
            fill_history: RwLock::new(FillHistory::default()),
            cost_basis: RwLock::new(HashMap::new()),
            last_known_market_id: RwLock::new(HashMap::new()),
        }
    }

    pub fn record_open_order(&self, order: OpenOrder) {
        self.open_orders
            .write()
            .insert(order.client_order_id.clone(), order);
    }

    pub fn remove_open_order(&self, client_order_id: &str) -> Option<OpenOrder> {
        self.open_orders.write().remove(client_order_id)
    }

    #[must_use]
    pub fn open_order_count(&self) -> u32 {
        self.open_orders.read().len() as u32
    }

    /// Records a fill: updates the venue position, the per-interval cost
    /// basis ledger, the fill-history ring, and the last-known market id.
    #[allow(clippy::too_many_arguments)]
    pub fn record_fill(
        &self,
        venue: Venue,
        side: Side,
        is_buy: bool,
        qty: Decimal,
        price: Decimal,
        interval: IntervalKey,
        client_order_id: &str,
        market_id: &str,
        now_ms: i64,
    ) {
        {
            let mut positions = self.positions.write();
            let snapshot = positions.entry(venue).or_default();
            let signed_qty = if is_buy { qty } else { -qty };
            match side {
                Side::Yes => snapshot.yes += signed_qty,
                Side::No => snapshot.no += signed_qty,
            }
            snapshot.as_of_ms = now_ms;
        }

        {
            let mut ledger = self.cost_basis.write();
            let key = (venue, side, interval);
            let entry = ledger.entry(key).or_default();
            if is_buy {
                entry.add_buy(qty, price);
            } else {
                entry.remove_sell(qty);
            }
            if entry.is_prunable() {
                ledger.remove(&key);
            }
        }

        self.fill_history.write().push(FillRecord {
            client_order_id: client_order_id.to_string(),
            venue,
            side,
            price,
            qty,
            filled_at_ms: now_ms,
            interval,
        });

        self.last_known_market_id
            .write()
            .insert((venue, side), market_id.to_string());
    }

    #[must_use]
    pub fn position(&self, venue: Venue) -> PositionSnapshot {
        self.positions.read().get(&venue).copied().unwrap_or_default()
    }

    /// Overrides one venue/side's tracked quantity to a venue-reported value,
    /// bypassing the fill ledger. Used by the reconciler once a divergence
    /// survives its stability check.
    pub fn override_position(&self, venue: Venue, side: Side, qty: Decimal, now_ms: i64) {
        let mut positions = self.positions.write();
        let snapshot = positions.entry(venue).or_default();
        match side {
            Side::Yes => snapshot.yes = qty,
            Side::No => snapshot.no = qty,
        }
        snapshot.as_of_ms = now_ms;
    }

    /// Net YES/NO across both venues — the figure the guard chain and the
    /// reconciler's imbalance check operate on.
    #[must_use]
    pub fn total_imbalance(&self) -> PositionSnapshot {
        let positions = self.positions.read();
        let mut total = PositionSnapshot::default();
        for snapshot in positions.values() {
            total.yes += snapshot.yes;
            total.no += snapshot.no;
            total.as_of_ms = total.as_of_ms.max(snapshot.as_of_ms);
        }
        total
    }

    #[must_use]
    pub fn last_known_market_id(&self, venue: Venue, side: Side) -> Option<String> {
        self.last_known_market_id.read().get(&(venue, side)).cloned()
    }

    #[must_use]
    pub fn cost_basis(&self, venue: Venue, side: Side, interval: IntervalKey) -> Option<CostBasisEntry> {
        self.cost_basis.read().get(&(venue, side, interval)).copied()
    }

    /// Drops cost-basis entries for a terminating interval; positions and
    /// open orders are venue-scoped, not interval-scoped, and survive.
    pub fn clear_interval(&self, interval: IntervalKey) {
        self.cost_basis
            .write()
            .retain(|(_, _, key), _| *key != interval);
    }

    #[must_use]
    pub fn fill_count(&self) -> usize {
        self.fill_history.read().len()
    }
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
    fn record_fill_updates_position_and_cost_basis() {
        let tracker = PositionTracker::new();
        tracker.record_fill(
            Venue::Kalshi,
            Side::Yes,
            true,
            dec!(10),
            dec!(0.45),
            interval(),
            "A-1",
            "KXBTCD-TEST",
            1000,
        );
        let snap = tracker.position(Venue::Kalshi);
        assert_eq!(snap.yes, dec!(10));
        assert_eq!(snap.no, Decimal::ZERO);

        let basis = tracker
            .cost_basis(Venue::Kalshi, Side::Yes, interval())
            .unwrap();
        assert_eq!(basis.average_price(), Some(dec!(0.45)));
        assert_eq!(tracker.fill_count(), 1);
        assert_eq!(
            tracker.last_known_market_id(Venue::Kalshi, Side::Yes),
            Some("KXBTCD-TEST".to_string())
        );
    }

    #[test]
    fn sell_reduces_position_and_prunes_cost_basis() {
        let tracker = PositionTracker::new();
        tracker.record_fill(
            Venue::Polymarket,
            Side::No,
            true,
            dec!(5),
            dec!(0.50),
            interval(),
            "A-1",
            "up-token",
            1000,
        );
        tracker.record_fill(
            Venue::Polymarket,
            Side::No,
            false,
            dec!(5),
            dec!(0.55),
            interval(),
            "A-2",
            "up-token",
            2000,
        );
        let snap = tracker.position(Venue::Polymarket);
        assert_eq!(snap.no, Decimal::ZERO);
        assert!(tracker
            .cost_basis(Venue::Polymarket, Side::No, interval())
            .is_none());
    }

    #[test]
    fn total_imbalance_aggregates_across_venues() {
        let tracker = PositionTracker::new();
        tracker.record_fill(
            Venue::Kalshi,
            Side::Yes,
            true,
            dec!(10),
            dec!(0.45),
            interval(),
            "A-1",
            "k",
            1000,
        );
        tracker.record_fill(
            Venue::Polymarket,
            Side::No,
            true,
            dec!(7),
            dec!(0.50),
            interval(),
            "B-1",
            "p",
            1000,
        );
        let total = tracker.total_imbalance();
        assert_eq!(total.yes, dec!(10));
        assert_eq!(total.no, dec!(7));
        assert_eq!(total.imbalance(), dec!(3));
    }

    #[test]
    fn clear_interval_drops_only_matching_entries() {
        let tracker = PositionTracker::new();
        let next_interval = interval().next();
        tracker.record_fill(
            Venue::Kalshi,
            Side::Yes,
            true,
            dec!(10),
            dec!(0.45),
            interval(),
            "A-1",
            "k",
            1000,
        );
        tracker.record_fill(
            Venue::Kalshi,
            Side::Yes,
            true,
            dec!(5),
            dec!(0.40),
            next_interval,
            "A-2",
            "k",
            2000,
        );
        tracker.clear_interval(interval());
        assert!(tracker.cost_basis(Venue::Kalshi, Side::Yes, interval()).is_none());
        assert!(tracker
            .cost_basis(Venue::Kalshi, Side::Yes, next_interval)
            .is_some());
        // Position itself is venue-scoped and unaffected by interval clearing.
        assert_eq!(tracker.position(Venue::Kalshi).yes, dec!(15));
    }

    #[test]
    fn override_position_replaces_tracked_qty_directly() {
        let tracker = PositionTracker::new();
        tracker.record_fill(
            Venue::Kalshi,
            Side::No,
            true,
            dec!(425),
            dec!(0.45),
            interval(),
            "A-1",
            "k",
            1000,
        );
        tracker.override_position(Venue::Kalshi, Side::No, dec!(420), 5000);
        let snap = tracker.position(Venue::Kalshi);
        assert_eq!(snap.no, dec!(420));
        assert_eq!(snap.as_of_ms, 5000);
    }

    #[test]
    fn open_order_lifecycle() {
        let tracker = PositionTracker::new();
        tracker.record_open_order(OpenOrder {
            client_order_id: "A-1".into(),
            venue: Venue::Kalshi,
            side: Side::Yes,
            price: dec!(0.45),
            qty: dec!(10),
            filled_qty: Decimal::ZERO,
            submitted_at_ms: 1000,
        });
        assert_eq!(tracker.open_order_count(), 1);
        tracker.remove_open_order("A-1");
        assert_eq!(tracker.open_order_count(), 0);
    }
}
