//! Coordinator: owns the quote cache, the active mapping, and rollover.
//!
//! Venue WS clients and order placement live outside this crate behind
//! [`RolloverActions`]; the coordinator only decides *when* to cancel,
//! settle, clear, and resubscribe, not *how*.

use std::collections::HashMap;

use algo_trade_core::quote::{NormalizedQuote, Venue};
use algo_trade_core::time::IntervalKey;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::execution_state::ExecutionState;
use crate::mapping::MappingStore;
use crate::position::PositionTracker;
use crate::types::IntervalMapping;

/// Per-venue cancel/subscribe hooks, implemented by the concrete venue
/// client adapters that own the WS connections and order placement.
#[async_trait]
pub trait RolloverActions: Send + Sync {
    async fn cancel_open_orders(&self, venue: Venue, interval: IntervalKey);
    async fn subscribe(&self, venue: Venue, interval: IntervalKey, mapping: &IntervalMapping);
}

#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    MarketDiscovered {
        interval: IntervalKey,
    },
    PrefetchCompleted {
        interval: IntervalKey,
        success: bool,
    },
    QuoteUpdate {
        venue: Venue,
        interval: IntervalKey,
    },
    RolloverStarted {
        interval: IntervalKey,
    },
    RolloverCompleted {
        interval: IntervalKey,
    },
    SubscriptionActive {
        venue: Venue,
        interval: IntervalKey,
    },
    ConnectionState {
        venue: Venue,
        connected: bool,
    },
    Error {
        message: String,
    },
}

/// Latest normalized quote per venue. One live interval's worth of state at
/// a time — cleared on rollover.
#[derive(Default)]
pub struct QuoteCache {
    quotes: Mutex<HashMap<Venue, NormalizedQuote>>,
}

impl QuoteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, quote: NormalizedQuote) {
        self.quotes.lock().insert(quote.venue, quote);
    }

    #[must_use]
    pub fn get(&self, venue: Venue) -> Option<NormalizedQuote> {
        self.quotes.lock().get(&venue).copied()
    }

    pub fn clear(&self) {
        self.quotes.lock().clear();
    }

    #[must_use]
    pub fn both_sides(&self) -> Option<(NormalizedQuote, NormalizedQuote)> {
        let quotes = self.quotes.lock();
        Some((
            *quotes.get(&Venue::Kalshi)?,
            *quotes.get(&Venue::Polymarket)?,
        ))
    }
}

/// Owns the quote cache and the active interval, and drives rollover.
pub struct Coordinator {
    quotes: QuoteCache,
    active_interval: Mutex<Option<IntervalKey>>,
    mappings: MappingStore,
    state: std::sync::Arc<ExecutionState>,
    positions: std::sync::Arc<PositionTracker>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        state: std::sync::Arc<ExecutionState>,
        positions: std::sync::Arc<PositionTracker>,
    ) -> Self {
        Self {
            quotes: QuoteCache::new(),
            active_interval: Mutex::new(None),
            mappings: MappingStore::new(),
            state,
            positions,
        }
    }

    #[must_use]
    pub fn quotes(&self) -> &QuoteCache {
        &self.quotes
    }

    #[must_use]
    pub fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    #[must_use]
    pub fn active_interval(&self) -> Option<IntervalKey> {
        *self.active_interval.lock()
    }

    /// Normalizes and caches a fresh quote, reporting the interval it
    /// belongs to so callers can emit `quote-update`.
    pub fn ingest_quote(&self, quote: NormalizedQuote) -> CoordinatorEvent {
        let interval = quote.interval;
        self.quotes.update(quote);
        CoordinatorEvent::QuoteUpdate {
            venue: quote.venue,
            interval,
        }
    }

    /// Waits for discovery to have populated `interval`'s mapping, then
    /// marks it active and subscribes both venues.
    pub async fn start_interval(
        &self,
        interval: IntervalKey,
        actions: &dyn RolloverActions,
    ) -> Result<(), CoordinatorEvent> {
        let mapping = self.mappings.get(interval).ok_or_else(|| CoordinatorEvent::Error {
            message: format!("no mapping for interval starting at {}", interval.start_ts),
        })?;
        if !mapping.is_complete() {
            return Err(CoordinatorEvent::Error {
                message: format!(
                    "incomplete mapping for interval starting at {}",
                    interval.start_ts
                ),
            });
        }

        actions.subscribe(Venue::Kalshi, interval, &mapping).await;
        actions
            .subscribe(Venue::Polymarket, interval, &mapping)
            .await;
        *self.active_interval.lock() = Some(interval);
        Ok(())
    }

    /// Runs the four-step rollover sequence for `old_interval`, then
    /// activates `next_interval`. Returns the events to emit, in order.
    pub async fn rollover(
        &self,
        old_interval: IntervalKey,
        next_interval: IntervalKey,
        actions: &dyn RolloverActions,
    ) -> Vec<CoordinatorEvent> {
        let mut events = vec![CoordinatorEvent::RolloverStarted {
            interval: old_interval,
        }];

        actions
            .cancel_open_orders(Venue::Kalshi, old_interval)
            .await;
        actions
            .cancel_open_orders(Venue::Polymarket, old_interval)
            .await;

        self.state.settle_pending(old_interval.end_ts);

        self.quotes.clear();
        self.positions.clear_interval(old_interval);

        if let Ok(()) = self.start_interval(next_interval, actions).await {
            events.push(CoordinatorEvent::SubscriptionActive {
                venue: Venue::Kalshi,
                interval: next_interval,
            });
            events.push(CoordinatorEvent::SubscriptionActive {
                venue: Venue::Polymarket,
                interval: next_interval,
            });
        } else {
            events.push(CoordinatorEvent::Error {
                message: format!(
                    "no mapping ready for interval starting at {}",
                    next_interval.start_ts
                ),
            });
        }

        events.push(CoordinatorEvent::RolloverCompleted {
            interval: old_interval,
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{kalshi_mapping_for_interval, polymarket_mapping_for_interval};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn interval() -> IntervalKey {
        IntervalKey {
            start_ts: 0,
            end_ts: 900,
        }
    }

    fn next_interval() -> IntervalKey {
        IntervalKey {
            start_ts: 900,
            end_ts: 1800,
        }
    }

    fn quote(venue: Venue, interval: IntervalKey) -> NormalizedQuote {
        NormalizedQuote {
            venue,
            interval,
            yes_bid: dec!(0.40),
            yes_bid_size: dec!(100),
            yes_ask: dec!(0.42),
            yes_ask_size: dec!(100),
            no_bid: dec!(0.56),
            no_bid_size: dec!(100),
            no_ask: dec!(0.58),
            no_ask_size: dec!(100),
            ts_exchange: 0,
            ts_local: 0,
        }
    }

    #[derive(Default)]
    struct RecordingActions {
        cancels: AtomicUsize,
        subscribes: AtomicUsize,
    }

    #[async_trait]
    impl RolloverActions for RecordingActions {
        async fn cancel_open_orders(&self, _venue: Venue, _interval: IntervalKey) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }

        async fn subscribe(
            &self,
            _venue: Venue,
            _interval: IntervalKey,
            _mapping: &IntervalMapping,
        ) {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(
            Arc::new(ExecutionState::new(0)),
            Arc::new(PositionTracker::new()),
        )
    }

    #[test]
    fn ingest_quote_caches_and_reports_interval() {
        let coordinator = coordinator();
        let event = coordinator.ingest_quote(quote(Venue::Kalshi, interval()));
        match event {
            CoordinatorEvent::QuoteUpdate { venue, interval: i } => {
                assert_eq!(venue, Venue::Kalshi);
                assert_eq!(i, interval());
            }
            _ => panic!("expected QuoteUpdate"),
        }
        assert!(coordinator.quotes().get(Venue::Kalshi).is_some());
    }

    #[tokio::test]
    async fn start_interval_fails_without_complete_mapping() {
        let coordinator = coordinator();
        let actions = RecordingActions::default();
        let result = coordinator.start_interval(interval(), &actions).await;
        assert!(result.is_err());
        assert_eq!(actions.subscribes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rollover_runs_full_sequence_and_activates_next_interval() {
        let coordinator = coordinator();
        coordinator.mappings.set_kalshi(
            interval(),
            kalshi_mapping_for_interval(interval()),
            0,
        );
        coordinator.mappings.set_polymarket(
            interval(),
            polymarket_mapping_for_interval(interval()),
            0,
        );
        coordinator.mappings.set_kalshi(
            next_interval(),
            kalshi_mapping_for_interval(next_interval()),
            0,
        );
        coordinator.mappings.set_polymarket(
            next_interval(),
            polymarket_mapping_for_interval(next_interval()),
            0,
        );

        let actions = RecordingActions::default();
        coordinator
            .start_interval(interval(), &actions)
            .await
            .unwrap();
        coordinator.ingest_quote(quote(Venue::Kalshi, interval()));

        let events = coordinator
            .rollover(interval(), next_interval(), &actions)
            .await;

        assert!(matches!(events[0], CoordinatorEvent::RolloverStarted { .. }));
        assert!(matches!(
            events.last().unwrap(),
            CoordinatorEvent::RolloverCompleted { .. }
        ));
        assert_eq!(actions.cancels.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.active_interval(), Some(next_interval()));
        assert!(coordinator.quotes().get(Venue::Kalshi).is_none());
    }
}
