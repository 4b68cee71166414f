//! Bid-only orderbook ladder with implied-ask normalization.
//!
//! Kalshi's market-data feed only ever publishes bids: a YES bid ladder and
//! a NO bid ladder. There is no directly quoted ask on either side — the
//! YES ask is implied by the best NO bid (`1 - best_no_bid`) and vice
//! versa. This is a distinct structural convention from the REST
//! [`crate::types::Orderbook`], which is a descending-sorted two-sided
//! book assembled from a single snapshot call; this module instead models
//! the live snapshot+delta ladder the websocket feed pushes, and keeps its
//! levels sorted **ascending by price so the best bid is the last
//! element** — that ordering is a deliberate convention callers rely on
//! when walking the ladder from best price outward.

use algo_trade_core::quote::{NormalizedQuote, Side, Venue};
use algo_trade_core::time::IntervalKey;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

/// One side's bid ladder, keyed by price in dollars (0 < price < 1),
/// ascending. `BTreeMap` iteration order is the sort we want for free;
/// `last_key_value` gives the best bid in O(log n).
#[derive(Debug, Clone, Default)]
pub struct BidLadder {
    levels: BTreeMap<PriceKey, Decimal>,
}

/// Wraps `Decimal` so it can key a `BTreeMap` with the ordering the ladder
/// needs — `Decimal` already implements `Ord`, this exists purely for a
/// descriptive type name at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PriceKey(Decimal);

impl BidLadder {
    pub fn set_level(&mut self, price: Decimal, size: Decimal) {
        if size.is_zero() {
            self.levels.remove(&PriceKey(price));
        } else {
            self.levels.insert(PriceKey(price), size);
        }
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Best bid is the highest price, i.e. the last entry in ascending
    /// order.
    pub fn best(&self) -> Option<(Decimal, Decimal)> {
        self.levels
            .iter()
            .next_back()
            .map(|(PriceKey(price), size)| (*price, *size))
    }

    /// Levels ascending by price, best bid last, matching the venue's
    /// documented ladder convention.
    pub fn levels_ascending(&self) -> Vec<(Decimal, Decimal)> {
        self.levels
            .iter()
            .map(|(PriceKey(price), size)| (*price, *size))
            .collect()
    }

    pub fn total_size(&self) -> Decimal {
        self.levels.values().copied().sum()
    }
}

/// A single market's live two-sided bid book (YES bids, NO bids), tracked
/// via Kalshi's snapshot+delta sequence-numbered protocol.
#[derive(Debug, Clone)]
pub struct KalshiBook {
    pub ticker: String,
    pub interval: IntervalKey,
    pub yes_bids: BidLadder,
    pub no_bids: BidLadder,
    last_seq: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum BookUpdate {
    Snapshot {
        seq: u64,
        yes: Vec<(Decimal, Decimal)>,
        no: Vec<(Decimal, Decimal)>,
    },
    Delta {
        seq: u64,
        side: Side,
        price: Decimal,
        size: Decimal,
    },
}

/// Returned when a delta's sequence number does not follow the last
/// applied one — the caller must resubscribe and wait for a fresh
/// snapshot rather than trust the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceGap {
    pub expected: u64,
    pub received: u64,
}

impl KalshiBook {
    pub fn new(ticker: impl Into<String>, interval: IntervalKey) -> Self {
        Self {
            ticker: ticker.into(),
            interval,
            yes_bids: BidLadder::default(),
            no_bids: BidLadder::default(),
            last_seq: None,
        }
    }

    /// Applies an update, returning `Err(SequenceGap)` if a delta arrived
    /// out of order. A snapshot always resets sequence tracking and
    /// succeeds.
    pub fn apply(&mut self, update: BookUpdate) -> Result<(), SequenceGap> {
        match update {
            BookUpdate::Snapshot { seq, yes, no } => {
                self.yes_bids.clear();
                self.no_bids.clear();
                for (price, size) in yes {
                    self.yes_bids.set_level(price, size);
                }
                for (price, size) in no {
                    self.no_bids.set_level(price, size);
                }
                self.last_seq = Some(seq);
                Ok(())
            }
            BookUpdate::Delta {
                seq,
                side,
                price,
                size,
            } => {
                if let Some(last) = self.last_seq {
                    if seq != last + 1 {
                        warn!(ticker = %self.ticker, expected = last + 1, received = seq, "sequence gap in book delta");
                        return Err(SequenceGap {
                            expected: last + 1,
                            received: seq,
                        });
                    }
                }
                match side {
                    Side::Yes => self.yes_bids.set_level(price, size),
                    Side::No => self.no_bids.set_level(price, size),
                }
                self.last_seq = Some(seq);
                Ok(())
            }
        }
    }

    /// Derives a [`NormalizedQuote`] by reading both bid ladders directly
    /// and deriving each implied ask from the opposite side's best bid:
    /// `yes_ask = 1 - best_no_bid`, `no_ask = 1 - best_yes_bid`.
    pub fn normalize(&self, ts_exchange: i64, ts_local: i64) -> Option<NormalizedQuote> {
        let (yes_bid, yes_bid_size) = self.yes_bids.best()?;
        let (no_bid, no_bid_size) = self.no_bids.best()?;
        let one = Decimal::ONE;
        Some(NormalizedQuote {
            venue: Venue::Kalshi,
            interval: self.interval,
            yes_bid,
            yes_bid_size,
            yes_ask: one - no_bid,
            yes_ask_size: no_bid_size,
            no_bid,
            no_bid_size,
            no_ask: one - yes_bid,
            no_ask_size: yes_bid_size,
            ts_exchange,
            ts_local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key() -> IntervalKey {
        IntervalKey {
            start_ts: 0,
            end_ts: 900,
        }
    }

    #[test]
    fn ladder_best_is_highest_price_last_in_ascending_iteration() {
        let mut ladder = BidLadder::default();
        ladder.set_level(dec!(0.40), dec!(10));
        ladder.set_level(dec!(0.45), dec!(20));
        ladder.set_level(dec!(0.42), dec!(5));

        assert_eq!(ladder.best(), Some((dec!(0.45), dec!(20))));
        let levels = ladder.levels_ascending();
        assert_eq!(levels.last().copied(), Some((dec!(0.45), dec!(20))));
        assert_eq!(levels[0], (dec!(0.40), dec!(10)));
    }

    #[test]
    fn zero_size_level_removes_entry() {
        let mut ladder = BidLadder::default();
        ladder.set_level(dec!(0.40), dec!(10));
        ladder.set_level(dec!(0.40), dec!(0));
        assert!(ladder.best().is_none());
    }

    #[test]
    fn implied_ask_derives_from_opposite_best_bid() {
        let mut book = KalshiBook::new("KXBTC-TEST", key());
        book.apply(BookUpdate::Snapshot {
            seq: 1,
            yes: vec![(dec!(0.44), dec!(50))],
            no: vec![(dec!(0.53), dec!(40))],
        })
        .unwrap();

        let quote = book.normalize(1000, 1005).unwrap();
        assert_eq!(quote.yes_bid, dec!(0.44));
        assert_eq!(quote.no_bid, dec!(0.53));
        assert_eq!(quote.yes_ask, dec!(0.47));
        assert_eq!(quote.no_ask, dec!(0.56));
    }

    #[test]
    fn delta_out_of_sequence_reports_gap_and_does_not_apply() {
        let mut book = KalshiBook::new("KXBTC-TEST", key());
        book.apply(BookUpdate::Snapshot {
            seq: 5,
            yes: vec![(dec!(0.44), dec!(50))],
            no: vec![],
        })
        .unwrap();

        let result = book.apply(BookUpdate::Delta {
            seq: 8,
            side: Side::Yes,
            price: dec!(0.45),
            size: dec!(10),
        });

        assert_eq!(
            result,
            Err(SequenceGap {
                expected: 6,
                received: 8
            })
        );
        assert_eq!(book.yes_bids.best(), Some((dec!(0.44), dec!(50))));
    }

    #[test]
    fn contiguous_delta_applies_cleanly() {
        let mut book = KalshiBook::new("KXBTC-TEST", key());
        book.apply(BookUpdate::Snapshot {
            seq: 1,
            yes: vec![(dec!(0.44), dec!(50))],
            no: vec![(dec!(0.53), dec!(40))],
        })
        .unwrap();
        book.apply(BookUpdate::Delta {
            seq: 2,
            side: Side::Yes,
            price: dec!(0.46),
            size: dec!(15),
        })
        .unwrap();

        assert_eq!(book.yes_bids.best(), Some((dec!(0.46), dec!(15))));
    }
}
