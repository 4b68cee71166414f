//! Order book and order-side types for the onchain venue.
//!
//! - [`L2OrderBook`]: Level 2 order book with incremental update support
//! - [`FillSimulation`]: Result of simulating a fill through the order book

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// L2 order book with incremental update support.
///
/// Maintains sorted price levels for bids (descending) and asks (ascending).
/// Supports both full snapshots and incremental delta updates.
#[derive(Debug, Clone)]
pub struct L2OrderBook {
    /// Token ID this order book represents
    pub token_id: String,
    /// Bid levels: price -> size (sorted descending by price)
    pub bids: BTreeMap<Reverse<Decimal>, Decimal>,
    /// Ask levels: price -> size (sorted ascending by price)
    pub asks: BTreeMap<Decimal, Decimal>,
    /// Timestamp of last update in milliseconds
    pub last_update_ms: Option<i64>,
}

impl L2OrderBook {
    /// Creates a new empty order book for the given token.
    #[must_use]
    pub fn new(token_id: String) -> Self {
        Self {
            token_id,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_ms: None,
        }
    }

    /// Returns the best (highest) bid price.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Returns the best (lowest) ask price.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Best bid price and size, for callers that need both in one lookup.
    #[must_use]
    pub fn best_bid_with_size(&self) -> Option<(Decimal, Decimal)> {
        self.bids.iter().next().map(|(r, size)| (r.0, *size))
    }

    /// Best ask price and size, for callers that need both in one lookup.
    #[must_use]
    pub fn best_ask_with_size(&self) -> Option<(Decimal, Decimal)> {
        self.asks.iter().next().map(|(price, size)| (*price, *size))
    }

    /// Returns the bid-ask spread, if both sides have liquidity.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Returns the mid price, if both sides have liquidity.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Applies a full snapshot, replacing all existing levels.
    pub fn apply_snapshot(&mut self, bids: Vec<(Decimal, Decimal)>, asks: Vec<(Decimal, Decimal)>) {
        self.bids.clear();
        self.asks.clear();
        for (price, size) in bids {
            if size > Decimal::ZERO {
                self.bids.insert(Reverse(price), size);
            }
        }
        for (price, size) in asks {
            if size > Decimal::ZERO {
                self.asks.insert(price, size);
            }
        }
    }

    /// Applies a delta update to a single price level.
    ///
    /// If size is zero or negative, the level is removed.
    pub fn apply_delta(&mut self, side: Side, price: Decimal, size: Decimal) {
        match side {
            Side::Buy => {
                if size <= Decimal::ZERO {
                    self.bids.remove(&Reverse(price));
                } else {
                    self.bids.insert(Reverse(price), size);
                }
            }
            Side::Sell => {
                if size <= Decimal::ZERO {
                    self.asks.remove(&price);
                } else {
                    self.asks.insert(price, size);
                }
            }
        }
    }

    /// Returns total bid depth (sum of all bid sizes).
    #[must_use]
    pub fn total_bid_depth(&self) -> Decimal {
        self.bids.values().copied().sum()
    }

    /// Returns total ask depth (sum of all ask sizes).
    #[must_use]
    pub fn total_ask_depth(&self) -> Decimal {
        self.asks.values().copied().sum()
    }

    /// Returns the number of bid levels.
    #[must_use]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Returns the number of ask levels.
    #[must_use]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Checks if the order book has any liquidity.
    #[must_use]
    pub fn has_liquidity(&self) -> bool {
        !self.bids.is_empty() || !self.asks.is_empty()
    }
}

impl Default for L2OrderBook {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Result of walking the order book for a given size.
///
/// Contains fill statistics including VWAP, worst price, and whether
/// sufficient depth exists to fill the entire order.
#[derive(Debug, Clone)]
pub struct FillSimulation {
    /// Amount that could be filled
    pub filled: Decimal,
    /// Total cost of the fill (sum of price * size at each level)
    pub total_cost: Decimal,
    /// Volume-weighted average price
    pub vwap: Decimal,
    /// Worst (least favorable) price encountered
    pub worst_price: Decimal,
    /// Best (most favorable) price encountered
    pub best_price: Decimal,
    /// Whether there was sufficient depth to fill the entire target size
    pub sufficient_depth: bool,
}

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Buying (taking from asks)
    Buy,
    /// Selling (taking from bids)
    Sell,
}

/// Order type for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Fill-or-Kill: Must fill entirely or cancel (required for arbitrage)
    FOK,
    /// Fill-and-Kill: Fill what's available, cancel rest (for unwinding)
    FAK,
    /// Good-til-Cancelled: Rests on book until filled or cancelled
    GTC,
}
