//! Process-wide execution state: the busy lock, cooldown clock, daily P&L
//! roll, kill switch, and pending-settlement ledger.
//!
//! Built as an explicitly constructed component held behind `Arc` and
//! injected into the executor/reconciler/CLI — not a module-level static —
//! so tests can spin up independent instances side by side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::types::PendingSettlement;

/// Why the kill switch tripped. Only `DailyLoss` is terminal; the others
/// allow automatic recovery once conditions clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSwitchReason {
    DailyLoss,
    ConsecutiveUnwindFailures,
    Manual,
}

impl KillSwitchReason {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::DailyLoss)
    }
}

#[derive(Debug, Default)]
struct DailyLedger {
    realized_pnl: Decimal,
    unwind_loss: Decimal,
    start_ts_ms: i64,
}

/// Shared, lock-guarded execution state for the whole process.
pub struct ExecutionState {
    busy: AtomicBool,
    cooldown: Mutex<Option<(i64, u64)>>,
    daily: Mutex<DailyLedger>,
    kill_switch_reason: Mutex<Option<KillSwitchReason>>,
    total_notional: Mutex<Decimal>,
    pending_settlements: Mutex<HashMap<String, PendingSettlement>>,
    liquidation_in_progress: AtomicBool,
}

impl ExecutionState {
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        Self {
            busy: AtomicBool::new(false),
            cooldown: Mutex::new(None),
            daily: Mutex::new(DailyLedger {
                realized_pnl: Decimal::ZERO,
                unwind_loss: Decimal::ZERO,
                start_ts_ms: day_start_ms(now_ms),
            }),
            kill_switch_reason: Mutex::new(None),
            total_notional: Mutex::new(Decimal::ZERO),
            pending_settlements: Mutex::new(HashMap::new()),
            liquidation_in_progress: AtomicBool::new(false),
        }
    }

    /// Attempts to take the exclusive busy lock. Returns `false` if another
    /// execution already holds it.
    #[must_use]
    pub fn acquire_busy_lock(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release_busy_lock(&self) {
        self.busy.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn enter_cooldown(&self, now_ms: i64, duration_ms: u64) {
        *self.cooldown.lock() = Some((now_ms, duration_ms));
    }

    pub fn clear_cooldown(&self) {
        *self.cooldown.lock() = None;
    }

    #[must_use]
    pub fn is_in_cooldown(&self, now_ms: i64) -> bool {
        match *self.cooldown.lock() {
            Some((armed_at, duration_ms)) => now_ms - armed_at < duration_ms as i64,
            None => false,
        }
    }

    /// Rolls the daily ledger forward at UTC midnight, losing its accumulated
    /// P&L the same way a fresh trading day would.
    pub fn roll_daily_if_needed(&self, now_ms: i64) {
        let mut daily = self.daily.lock();
        let current_day_start = day_start_ms(now_ms);
        if current_day_start != daily.start_ts_ms {
            daily.realized_pnl = Decimal::ZERO;
            daily.unwind_loss = Decimal::ZERO;
            daily.start_ts_ms = current_day_start;
        }
    }

    pub fn add_realized_pnl(&self, amount: Decimal) {
        self.daily.lock().realized_pnl += amount;
    }

    pub fn add_unwind_loss(&self, amount: Decimal) {
        let mut daily = self.daily.lock();
        daily.unwind_loss += amount;
        daily.realized_pnl -= amount;
    }

    #[must_use]
    pub fn daily_realized_pnl(&self) -> Decimal {
        self.daily.lock().realized_pnl
    }

    #[must_use]
    pub fn daily_unwind_loss(&self) -> Decimal {
        self.daily.lock().unwind_loss
    }

    pub fn add_notional(&self, amount: Decimal) {
        *self.total_notional.lock() += amount;
    }

    /// Removes notional, floored at zero so rounding slop never goes negative.
    pub fn remove_notional(&self, amount: Decimal) {
        let mut total = self.total_notional.lock();
        *total = (*total - amount).max(Decimal::ZERO);
    }

    #[must_use]
    pub fn total_notional(&self) -> Decimal {
        *self.total_notional.lock()
    }

    pub fn trigger_kill_switch(&self, reason: KillSwitchReason) {
        tracing::warn!(?reason, "kill switch triggered");
        *self.kill_switch_reason.lock() = Some(reason);
    }

    #[must_use]
    pub fn kill_switch_reason(&self) -> Option<KillSwitchReason> {
        *self.kill_switch_reason.lock()
    }

    #[must_use]
    pub fn kill_switch_triggered(&self) -> bool {
        self.kill_switch_reason.lock().is_some()
    }

    /// Clears the kill switch if the trip reason is non-terminal, current
    /// daily loss sits below the cap, and no liquidation is in flight.
    #[must_use]
    pub fn attempt_recovery(&self, max_daily_loss: Decimal) -> bool {
        let mut reason_guard = self.kill_switch_reason.lock();
        let Some(reason) = *reason_guard else {
            return true;
        };
        if reason.is_terminal() {
            return false;
        }
        if self.liquidation_in_progress.load(Ordering::Acquire) {
            return false;
        }
        if -self.daily_realized_pnl() >= max_daily_loss {
            return false;
        }
        *reason_guard = None;
        true
    }

    pub fn set_liquidation_in_progress(&self, in_progress: bool) {
        self.liquidation_in_progress
            .store(in_progress, Ordering::Release);
    }

    #[must_use]
    pub fn liquidation_in_progress(&self) -> bool {
        self.liquidation_in_progress.load(Ordering::Acquire)
    }

    pub fn add_pending_settlement(&self, settlement: PendingSettlement) {
        self.pending_settlements
            .lock()
            .insert(settlement.execution_id.clone(), settlement);
    }

    /// Drains and returns every pending settlement whose interval matches
    /// the one rolling over, folding their expected P&L into realized P&L.
    pub fn settle_pending(
        &self,
        interval_end_ts: i64,
    ) -> Vec<PendingSettlement> {
        let mut pending = self.pending_settlements.lock();
        let (settled, remaining): (Vec<_>, HashMap<_, _>) = std::mem::take(&mut *pending)
            .into_iter()
            .partition(|(_, s)| s.interval.end_ts == interval_end_ts);
        *pending = remaining;
        let settled: Vec<PendingSettlement> = settled.into_values().collect();
        for s in &settled {
            self.add_realized_pnl(s.expected_pnl);
        }
        settled
    }

    #[must_use]
    pub fn pending_settlement_count(&self) -> usize {
        self.pending_settlements.lock().len()
    }
}

fn day_start_ms(now_ms: i64) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    now_ms.div_euclid(DAY_MS) * DAY_MS
}
