//! End-to-end checks across the collaborators the `run` command wires
//! together: discovery's deterministic mappings feeding the coordinator,
//! and the scanner/fee-engine pipeline the live loop drives on every tick.

use algo_trade_arbitrage_cross::coordinator::Coordinator;
use algo_trade_arbitrage_cross::execution_state::ExecutionState;
use algo_trade_arbitrage_cross::fees::box_fee_buffer;
use algo_trade_arbitrage_cross::mapping::{kalshi_mapping_for_interval, polymarket_mapping_for_interval};
use algo_trade_arbitrage_cross::position::PositionTracker;
use algo_trade_arbitrage_cross::scanner::scan;
use algo_trade_core::quote::{NormalizedQuote, Venue};
use algo_trade_core::time::IntervalKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn interval() -> IntervalKey {
    IntervalKey::containing(1_785_970_000)
}

fn quote(venue: Venue, interval: IntervalKey, yes_ask: Decimal, no_ask: Decimal) -> NormalizedQuote {
    NormalizedQuote {
        venue,
        interval,
        yes_bid: yes_ask - dec!(0.01),
        yes_bid_size: dec!(100),
        yes_ask,
        yes_ask_size: dec!(100),
        no_bid: no_ask - dec!(0.01),
        no_bid_size: dec!(100),
        no_ask,
        no_ask_size: dec!(100),
        ts_exchange: 0,
        ts_local: 0,
    }
}

#[test]
fn discovered_mappings_make_the_coordinator_start_interval_ready() {
    let coordinator = Coordinator::new(
        Arc::new(ExecutionState::new(0)),
        Arc::new(PositionTracker::new()),
    );
    let window = interval();

    assert!(!coordinator.mappings().is_complete(window));
    coordinator
        .mappings()
        .set_kalshi(window, kalshi_mapping_for_interval(window), 1000);
    assert!(!coordinator.mappings().is_complete(window));
    coordinator
        .mappings()
        .set_polymarket(window, polymarket_mapping_for_interval(window), 2000);
    assert!(coordinator.mappings().is_complete(window));
}

#[test]
fn scanner_finds_a_box_when_combined_cost_undercuts_one_dollar_minus_fees() {
    let window = interval();
    // Kalshi YES cheap, Polymarket NO cheap: buying both sides nets well
    // under $1, clearing the fee buffer and the minimum-edge floor.
    let kalshi = quote(Venue::Kalshi, window, dec!(0.40), dec!(0.62));
    let polymarket = quote(Venue::Polymarket, window, dec!(0.63), dec!(0.39));

    let fee_buffer = box_fee_buffer(Venue::Kalshi, dec!(1), dec!(0.5), Venue::Polymarket, dec!(1), dec!(0.5));
    let opportunity = scan(&kalshi, &polymarket, window, fee_buffer, dec!(0.01), dec!(0.04));

    let opportunity = opportunity.expect("a profitable box should be detected");
    assert_eq!(opportunity.interval, window);
    assert_eq!(opportunity.leg_a.venue, Venue::Kalshi);
    assert_eq!(opportunity.leg_b.venue, Venue::Polymarket);
    assert!(opportunity.edge_net >= dec!(0.04));
}

#[test]
fn scanner_rejects_a_box_inside_the_minimum_edge() {
    let window = interval();
    let kalshi = quote(Venue::Kalshi, window, dec!(0.50), dec!(0.50));
    let polymarket = quote(Venue::Polymarket, window, dec!(0.50), dec!(0.50));

    let fee_buffer = box_fee_buffer(Venue::Kalshi, dec!(1), dec!(0.5), Venue::Polymarket, dec!(1), dec!(0.5));
    let opportunity = scan(&kalshi, &polymarket, window, fee_buffer, dec!(0.01), dec!(0.04));

    assert!(opportunity.is_none());
}
