//! Shared quote and venue types consumed by both venue crates and the
//! cross-venue arbitrage crate. Living here instead of in either venue
//! crate keeps `exchange-kalshi` and `exchange-polymarket` free of a
//! dependency on each other.

use crate::time::IntervalKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Kalshi,
    Polymarket,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Kalshi => write!(f, "kalshi"),
            Venue::Polymarket => write!(f, "polymarket"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yes => write!(f, "yes"),
            Side::No => write!(f, "no"),
        }
    }
}

/// A venue's best-of-book view of a single 15-minute market, normalized to
/// a common representation regardless of whether the venue exposes a
/// bid-only ladder (implied asks derived) or two separate YES/NO books
/// (asks read directly).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub venue: Venue,
    pub interval: IntervalKey,
    pub yes_bid: Decimal,
    pub yes_bid_size: Decimal,
    pub yes_ask: Decimal,
    pub yes_ask_size: Decimal,
    pub no_bid: Decimal,
    pub no_bid_size: Decimal,
    pub no_ask: Decimal,
    pub no_ask_size: Decimal,
    /// Exchange-reported event time, milliseconds since epoch.
    pub ts_exchange: i64,
    /// Local receipt time, milliseconds since epoch.
    pub ts_local: i64,
}

impl NormalizedQuote {
    pub fn best_ask(&self, side: Side) -> (Decimal, Decimal) {
        match side {
            Side::Yes => (self.yes_ask, self.yes_ask_size),
            Side::No => (self.no_ask, self.no_ask_size),
        }
    }

    pub fn best_bid(&self, side: Side) -> (Decimal, Decimal) {
        match side {
            Side::Yes => (self.yes_bid, self.yes_bid_size),
            Side::No => (self.no_bid, self.no_bid_size),
        }
    }

    pub fn staleness_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.ts_local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(Side::Yes.opposite(), Side::No);
        assert_eq!(Side::No.opposite(), Side::Yes);
        assert_eq!(Side::Yes.opposite().opposite(), Side::Yes);
    }

    #[test]
    fn venue_display_is_lowercase() {
        assert_eq!(Venue::Kalshi.to_string(), "kalshi");
        assert_eq!(Venue::Polymarket.to_string(), "polymarket");
    }
}
