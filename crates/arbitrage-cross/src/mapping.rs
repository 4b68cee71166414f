//! Mapping store and deterministic market-id construction.
//!
//! Every interval needs both venues' market identifiers resolved before the
//! coordinator can subscribe. Resolution prefers constructing the ticker
//! deterministically from the interval's Eastern-time close; the venue's
//! list endpoint (queried by the concrete venue client, not here) is the
//! fallback when the constructed id doesn't exist.

use std::collections::HashMap;

use algo_trade_core::time::{is_us_dst, to_eastern, IntervalKey};
use chrono::Datelike;
use parking_lot::RwLock;

use crate::types::{IntervalMapping, KalshiMapping, PolymarketMapping};

const PRUNE_AGE_SECS: i64 = 86_400;

/// Deterministically constructs the Kalshi event/market/series tickers for
/// one interval from its Eastern-time close. `KXBTCD` is the 15-minute
/// BTC-direction series; the date/hour suffix mirrors Kalshi's own
/// dated-event ticker convention.
#[must_use]
pub fn kalshi_mapping_for_interval(interval: IntervalKey) -> KalshiMapping {
    let eastern = to_eastern(interval.end_datetime());
    let date_part = eastern.format("%d%b%y").to_string().to_uppercase();
    let hour_part = format!("{:02}", eastern.hour());
    let event_ticker = format!("KXBTCD-{date_part}{hour_part}");
    KalshiMapping {
        market_ticker: format!("{event_ticker}-B1"),
        event_ticker,
        series_ticker: "KXBTCD".to_string(),
        close_ts: interval.end_ts,
        reference_price: None,
    }
}

/// Deterministically constructs the Polymarket up/down slug for one
/// interval, keyed by its UTC start timestamp the way Polymarket's own
/// 15-minute event slugs are windowed.
#[must_use]
pub fn polymarket_mapping_for_interval(interval: IntervalKey) -> PolymarketMapping {
    let slug = format!("bitcoin-up-or-down-{}", interval.start_ts);
    PolymarketMapping {
        up_token: String::new(),
        down_token: String::new(),
        slug,
        end_ts: interval.end_ts,
        reference_price: None,
    }
}

/// Whether `interval`'s close falls in US daylight time, for callers that
/// need to branch on the ET offset used to build the Kalshi ticker.
#[must_use]
pub fn interval_observes_dst(interval: IntervalKey) -> bool {
    let eastern = to_eastern(interval.end_datetime());
    is_us_dst(eastern.year(), eastern.month(), eastern.day())
}

/// Bounded store of `IntervalKey -> IntervalMapping`. Setters merge rather
/// than replace, so Kalshi discovery completing before Polymarket (or vice
/// versa) never erases the other venue's half.
#[derive(Default)]
pub struct MappingStore {
    entries: RwLock<HashMap<IntervalKey, IntervalMapping>>,
}

impl MappingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, interval: IntervalKey) -> Option<IntervalMapping> {
        self.entries.read().get(&interval).cloned()
    }

    pub fn set_kalshi(&self, interval: IntervalKey, mapping: KalshiMapping, now_ms: i64) {
        self.entries
            .write()
            .entry(interval)
            .or_default()
            .set_kalshi(mapping, now_ms);
    }

    pub fn set_polymarket(&self, interval: IntervalKey, mapping: PolymarketMapping, now_ms: i64) {
        self.entries
            .write()
            .entry(interval)
            .or_default()
            .set_polymarket(mapping, now_ms);
    }

    #[must_use]
    pub fn is_complete(&self, interval: IntervalKey) -> bool {
        self.entries
            .read()
            .get(&interval)
            .is_some_and(IntervalMapping::is_complete)
    }

    /// Drops entries for intervals that closed more than a day ago.
    pub fn prune(&self, now_ts: i64) {
        self.entries
            .write()
            .retain(|interval, _| now_ts - interval.end_ts < PRUNE_AGE_SECS);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
