//! Pure box-arbitrage scanner: no I/O, no clock reads, no locks.
//!
//! Compares both possible orientations of the box (YES on Kalshi + NO on
//! Polymarket, or the reverse) and returns the cheaper one if its net edge
//! clears the configured floor.

use algo_trade_core::quote::{NormalizedQuote, Side, Venue};
use algo_trade_core::time::IntervalKey;
use rust_decimal::Decimal;

use crate::types::{Opportunity, OpportunityLeg};

/// Scans one pair of venue quotes for a box-arbitrage opportunity.
///
/// `fee_buffer` and `slippage_buffer` are supplied by the caller (the fee
/// buffer is computed against the candidate size via [`crate::fees`]) so
/// this function stays pure and side-effect free.
#[must_use]
pub fn scan(
    kalshi_quote: &NormalizedQuote,
    polymarket_quote: &NormalizedQuote,
    interval: IntervalKey,
    fee_buffer: Decimal,
    slippage_buffer: Decimal,
    min_edge_net: Decimal,
) -> Option<Opportunity> {
    debug_assert_eq!(kalshi_quote.venue, Venue::Kalshi);
    debug_assert_eq!(polymarket_quote.venue, Venue::Polymarket);
    debug_assert_eq!(kalshi_quote.interval, interval);
    debug_assert_eq!(polymarket_quote.interval, interval);

    let (kalshi_yes_ask, kalshi_yes_ask_size) = kalshi_quote.best_ask(Side::Yes);
    let (kalshi_no_ask, kalshi_no_ask_size) = kalshi_quote.best_ask(Side::No);
    let (poly_yes_ask, poly_yes_ask_size) = polymarket_quote.best_ask(Side::Yes);
    let (poly_no_ask, poly_no_ask_size) = polymarket_quote.best_ask(Side::No);

    // Orientation 1: YES on Kalshi, NO on Polymarket.
    let cost_kalshi_yes = kalshi_yes_ask + poly_no_ask;
    // Orientation 2: YES on Polymarket, NO on Kalshi.
    let cost_poly_yes = poly_yes_ask + kalshi_no_ask;

    let (cost, leg_a, leg_b) = if cost_kalshi_yes <= cost_poly_yes {
        (
            cost_kalshi_yes,
            OpportunityLeg {
                venue: Venue::Kalshi,
                side: Side::Yes,
                price: kalshi_yes_ask,
                size: kalshi_yes_ask_size,
            },
            OpportunityLeg {
                venue: Venue::Polymarket,
                side: Side::No,
                price: poly_no_ask,
                size: poly_no_ask_size,
            },
        )
    } else {
        (
            cost_poly_yes,
            OpportunityLeg {
                venue: Venue::Polymarket,
                side: Side::Yes,
                price: poly_yes_ask,
                size: poly_yes_ask_size,
            },
            OpportunityLeg {
                venue: Venue::Kalshi,
                side: Side::No,
                price: kalshi_no_ask,
                size: kalshi_no_ask_size,
            },
        )
    };

    let edge_gross = Decimal::ONE - cost;
    let edge_net = edge_gross - fee_buffer - slippage_buffer;

    if edge_net < min_edge_net {
        return None;
    }

    Some(Opportunity {
        interval,
        leg_a,
        leg_b,
        cost,
        edge_gross,
        edge_net,
    })
}
