//! Per-leg fee formulas for the two venues.
//!
//! Both formulas are exact and deterministic, applied before edge
//! computation so the scanner always sees a fee-aware cost. Rounding mode
//! is part of the contract: both venues round their fee up, never down.

use algo_trade_core::quote::Venue;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Rounds up to whole cents (2 decimal places).
fn ceil_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
}

/// Rounds up to 4 decimal places.
fn ceil_4dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::ToPositiveInfinity)
}

/// CLOB-venue (Kalshi) per-leg fee: `ceilCents(0.07 * qty * p * (1 - p))`.
#[must_use]
pub fn clob_leg_fee(qty: Decimal, price: Decimal) -> Decimal {
    ceil_cents(dec!(0.07) * qty * price * (Decimal::ONE - price))
}

/// Onchain-venue (Polymarket) per-leg fee:
/// `ceil4dp(qty * p * 0.25 * (p * (1 - p))^2)`.
#[must_use]
pub fn onchain_leg_fee(qty: Decimal, price: Decimal) -> Decimal {
    let variance_term = price * (Decimal::ONE - price);
    ceil_4dp(qty * price * dec!(0.25) * variance_term * variance_term)
}

/// Dispatches to the venue-appropriate leg-fee formula.
#[must_use]
pub fn leg_fee(venue: Venue, qty: Decimal, price: Decimal) -> Decimal {
    match venue {
        Venue::Kalshi => clob_leg_fee(qty, price),
        Venue::Polymarket => onchain_leg_fee(qty, price),
    }
}

/// Total fee buffer for a 2-leg box: the sum of both legs' fees at their
/// intended fill prices.
#[must_use]
pub fn box_fee_buffer(
    venue_a: Venue,
    qty_a: Decimal,
    price_a: Decimal,
    venue_b: Venue,
    qty_b: Decimal,
    price_b: Decimal,
) -> Decimal {
    leg_fee(venue_a, qty_a, price_a) + leg_fee(venue_b, qty_b, price_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clob_fee_rounds_up_to_cents() {
        // 0.07 * 10 * 0.48 * 0.52 = 0.174720 -> ceil to 0.18
        let fee = clob_leg_fee(dec!(10), dec!(0.48));
        assert_eq!(fee, dec!(0.18));
    }

    #[test]
    fn onchain_fee_rounds_up_to_4dp() {
        // p=0.47, variance = 0.47*0.53 = 0.2491, variance^2 = 0.06205081
        // qty=10, fee = 10 * 0.47 * 0.25 * 0.06205081 = 0.07290970175 -> ceil to 0.0730
        let fee = onchain_leg_fee(dec!(10), dec!(0.47));
        assert_eq!(fee, dec!(0.0730));
    }

    #[test]
    fn clob_fee_zero_at_price_boundary() {
        assert_eq!(clob_leg_fee(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(clob_leg_fee(dec!(10), Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn leg_fee_dispatches_by_venue() {
        let qty = dec!(5);
        let price = dec!(0.5);
        assert_eq!(leg_fee(Venue::Kalshi, qty, price), clob_leg_fee(qty, price));
        assert_eq!(
            leg_fee(Venue::Polymarket, qty, price),
            onchain_leg_fee(qty, price)
        );
    }

    #[test]
    fn box_fee_buffer_sums_both_legs() {
        let total = box_fee_buffer(
            Venue::Kalshi,
            dec!(10),
            dec!(0.48),
            Venue::Polymarket,
            dec!(10),
            dec!(0.47),
        );
        assert_eq!(
            total,
            clob_leg_fee(dec!(10), dec!(0.48)) + onchain_leg_fee(dec!(10), dec!(0.47))
        );
    }
}
