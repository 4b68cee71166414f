//! Settlement tracker.
//!
//! Captures a snapshot of interval-close market state at rollover, then
//! polls each venue's resolution endpoint on a delayed schedule (+15s,
//! +2m, +5m) until both venues agree or the schedule runs out. Every
//! confirmed or exhausted outcome is appended to the settlements CSV.

use std::collections::HashMap;

use algo_trade_core::csv_log::{SettlementCsvRow, SettlementCsvWriter};
use algo_trade_core::quote::Venue;
use algo_trade_core::time::IntervalKey;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::IntervalMapping;

const TWO: Decimal = dec!(2);

const CHECK_OFFSETS_MS: [i64; 3] = [15_000, 120_000, 300_000];

/// How an interval resolved at a single venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSide {
    Yes,
    No,
}

/// Queries a venue's resolution endpoint for one interval's outcome.
/// Returns `None` while the venue hasn't settled the market yet.
#[async_trait]
pub trait SettlementSource: Send + Sync {
    async fn query_resolution(
        &self,
        venue: Venue,
        mapping: &IntervalMapping,
    ) -> Option<ResolvedSide>;
}

/// Market state captured the moment an interval rolls over, before either
/// venue has confirmed resolution.
#[derive(Debug, Clone)]
pub struct IntervalCloseSnapshot {
    pub interval: IntervalKey,
    pub twap: Decimal,
    pub spot_at_close: Decimal,
    pub crossing_count: u32,
    pub range_low: Decimal,
    pub range_high: Decimal,
    pub mapping: IntervalMapping,
    pub captured_at_ms: i64,
}

impl IntervalCloseSnapshot {
    /// Each venue's own settlement reference price, as discovered for this interval.
    fn kalshi_reference_price(&self) -> Option<Decimal> {
        self.mapping.kalshi.as_ref().and_then(|m| m.reference_price)
    }

    fn polymarket_reference_price(&self) -> Option<Decimal> {
        self.mapping.polymarket.as_ref().and_then(|m| m.reference_price)
    }
}

/// Whether the two venues' resolutions line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleAgreement {
    Agree,
    Disagree,
    /// The check schedule ran out before one or both venues resolved.
    Incomplete,
}

#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub interval: IntervalKey,
    pub kalshi_resolution: Option<ResolvedSide>,
    pub polymarket_resolution: Option<ResolvedSide>,
    pub agreement: OracleAgreement,
    /// True when the two venues' own reference prices straddle the close
    /// price, so each venue's oracle resolves the interval in an opposite
    /// direction (one UP, one DOWN).
    pub is_dead_zone: bool,
    pub confirmed_at_ms: i64,
}

/// Which way a single reference price implies an interval resolves.
fn resolution_from_price(spot: Decimal, reference: Decimal) -> ResolvedSide {
    if spot >= reference {
        ResolvedSide::Yes
    } else {
        ResolvedSide::No
    }
}

/// A dead zone is when the two venues' own reference prices sit on opposite
/// sides of the close price, so each venue's oracle resolves the interval
/// the opposite way. Unknown when either venue's reference price hasn't
/// been discovered.
fn dead_zone_hit(spot_at_close: Decimal, kalshi_ref: Option<Decimal>, polymarket_ref: Option<Decimal>) -> bool {
    match (kalshi_ref, polymarket_ref) {
        (Some(k), Some(p)) => resolution_from_price(spot_at_close, k) != resolution_from_price(spot_at_close, p),
        _ => false,
    }
}

/// Distance of the close price from the venues' settlement reference,
/// averaged across both venues when both discovered one.
fn dist_from_ref_at_close(spot_at_close: Decimal, kalshi_ref: Option<Decimal>, polymarket_ref: Option<Decimal>) -> Option<Decimal> {
    match (kalshi_ref, polymarket_ref) {
        (Some(k), Some(p)) => Some(spot_at_close - (k + p) / TWO),
        (Some(r), None) | (None, Some(r)) => Some(spot_at_close - r),
        (None, None) => None,
    }
}

struct PendingInterval {
    snapshot: IntervalCloseSnapshot,
    attempts_done: usize,
    next_check_ms: i64,
}

/// Tracks every interval awaiting settlement confirmation.
pub struct SettlementTracker {
    pending: Mutex<HashMap<IntervalKey, PendingInterval>>,
}

impl Default for SettlementTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Captures interval-close state and arms the first delayed check.
    /// Each venue's settlement reference price comes from `mapping` itself
    /// (discovery already recorded it per-venue), not as a separate input.
    #[allow(clippy::too_many_arguments)]
    pub fn capture_close(
        &self,
        interval: IntervalKey,
        twap: Decimal,
        spot_at_close: Decimal,
        crossing_count: u32,
        range_low: Decimal,
        range_high: Decimal,
        mapping: IntervalMapping,
        now_ms: i64,
    ) {
        let snapshot = IntervalCloseSnapshot {
            interval,
            twap,
            spot_at_close,
            crossing_count,
            range_low,
            range_high,
            mapping,
            captured_at_ms: now_ms,
        };
        self.pending.lock().insert(
            interval,
            PendingInterval {
                snapshot,
                attempts_done: 0,
                next_check_ms: now_ms + CHECK_OFFSETS_MS[0],
            },
        );
    }

    /// Intervals with a check due at or before `now_ms`.
    #[must_use]
    pub fn due_checks(&self, now_ms: i64) -> Vec<IntervalKey> {
        self.pending
            .lock()
            .iter()
            .filter(|(_, p)| p.next_check_ms <= now_ms)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Runs one scheduled check for `interval`. Returns `Some(outcome)` once
    /// the interval is settled (both venues agree, disagree, or the
    /// schedule is exhausted) and persists the row via `csv` if given.
    pub async fn perform_check(
        &self,
        interval: IntervalKey,
        source: &dyn SettlementSource,
        csv: Option<&SettlementCsvWriter>,
        now_ms: i64,
    ) -> Option<SettlementOutcome> {
        let mapping = {
            let pending = self.pending.lock();
            pending.get(&interval)?.snapshot.mapping.clone()
        };

        let (kalshi_resolution, polymarket_resolution) = tokio::join!(
            source.query_resolution(Venue::Kalshi, &mapping),
            source.query_resolution(Venue::Polymarket, &mapping),
        );

        let both_resolved = kalshi_resolution.is_some() && polymarket_resolution.is_some();

        let mut pending = self.pending.lock();
        let entry = pending.get_mut(&interval)?;

        if !both_resolved {
            entry.attempts_done += 1;
            if entry.attempts_done < CHECK_OFFSETS_MS.len() {
                entry.next_check_ms = now_ms + CHECK_OFFSETS_MS[entry.attempts_done];
                return None;
            }
        }

        let snapshot = entry.snapshot.clone();
        let agreement = match (kalshi_resolution, polymarket_resolution) {
            (Some(a), Some(b)) if a == b => OracleAgreement::Agree,
            (Some(_), Some(_)) => OracleAgreement::Disagree,
            _ => OracleAgreement::Incomplete,
        };
        let is_dead_zone = dead_zone_hit(
            snapshot.spot_at_close,
            snapshot.kalshi_reference_price(),
            snapshot.polymarket_reference_price(),
        );

        pending.remove(&interval);
        drop(pending);

        let outcome = SettlementOutcome {
            interval,
            kalshi_resolution,
            polymarket_resolution,
            agreement,
            is_dead_zone,
            confirmed_at_ms: now_ms,
        };

        if let Some(writer) = csv {
            let row = to_csv_row(&snapshot, &outcome);
            if let Err(err) = writer.append(&row) {
                tracing::warn!(?err, "failed to persist settlement row");
            }
        }

        Some(outcome)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

fn resolution_label(resolution: Option<ResolvedSide>) -> &'static str {
    match resolution {
        Some(ResolvedSide::Yes) => "yes",
        Some(ResolvedSide::No) => "no",
        None => "unresolved",
    }
}

fn to_csv_row(snapshot: &IntervalCloseSnapshot, outcome: &SettlementOutcome) -> SettlementCsvRow {
    let kalshi_ref = snapshot.kalshi_reference_price();
    let polymarket_ref = snapshot.polymarket_reference_price();

    SettlementCsvRow {
        interval_start_ts: outcome.interval.start_ts,
        interval_end_ts: outcome.interval.end_ts,
        btc_ref_price_kalshi: kalshi_ref,
        btc_ref_price_polymarket: polymarket_ref,
        btc_spot_at_close: snapshot.spot_at_close,
        btc_twap_60s_at_close: snapshot.twap,
        kalshi_resolution: resolution_label(outcome.kalshi_resolution).to_string(),
        polymarket_resolution: resolution_label(outcome.polymarket_resolution).to_string(),
        oracles_agree: !outcome.is_dead_zone,
        dead_zone_hit: outcome.is_dead_zone,
        btc_crossing_count: snapshot.crossing_count,
        btc_range_usd: snapshot.range_high - snapshot.range_low,
        btc_dist_from_ref_at_close: dist_from_ref_at_close(snapshot.spot_at_close, kalshi_ref, polymarket_ref),
        checked_at: outcome.confirmed_at_ms,
    }
}
