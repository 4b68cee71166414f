//! Resolves live market identifiers for an interval on both venues and
//! populates a [`MappingStore`].
//!
//! [`mapping::kalshi_mapping_for_interval`]/[`mapping::polymarket_mapping_for_interval`]
//! construct the ticker/slug deterministically, but only Kalshi's ticker
//! convention is reliable enough to trade against blind. Polymarket's token
//! ids can't be guessed at all — they're assigned per-market by the Gamma
//! API — so discovery always queries Gamma for the live market and fills
//! `up_token`/`down_token` from its response. Kalshi is queried too, both to
//! confirm the deterministic ticker actually exists and to pick up a
//! reference price if the market already has one.
use algo_trade_arbitrage_cross::mapping::{
    kalshi_mapping_for_interval, polymarket_mapping_for_interval, MappingStore,
};
use algo_trade_arbitrage_cross::types::{KalshiMapping, PolymarketMapping};
use algo_trade_core::time::IntervalKey;
use algo_trade_kalshi::KalshiClient;
use algo_trade_polymarket::{Coin, GammaClient};
use tracing::{debug, warn};

/// Attempts to resolve both venues' market ids for `interval` and records
/// whatever succeeds into `mappings` (the coordinator's own store, so a
/// subsequent `start_interval`/`rollover` call sees it immediately). Each
/// venue's failure is independent: a Polymarket outage does not block
/// recording Kalshi's half.
pub async fn discover_interval(
    kalshi: &KalshiClient,
    gamma: &GammaClient,
    mappings: &MappingStore,
    interval: IntervalKey,
    now_ms: i64,
) {
    let kalshi_guess = kalshi_mapping_for_interval(interval);
    match kalshi.get_market(&kalshi_guess.market_ticker).await {
        Ok(market) => {
            let reference_price = market.last_price.map(|p| p / rust_decimal::Decimal::from(100));
            mappings.set_kalshi(
                interval,
                KalshiMapping {
                    reference_price,
                    ..kalshi_guess
                },
                now_ms,
            );
        }
        Err(err) => {
            debug!(
                ticker = %kalshi_guess.market_ticker,
                error = %err,
                "deterministic kalshi ticker not found, falling back to event listing"
            );
            match kalshi.get_markets(Some(&kalshi_guess.event_ticker)).await {
                Ok(markets) => {
                    if let Some(market) = markets.into_iter().next() {
                        mappings.set_kalshi(
                            interval,
                            KalshiMapping {
                                event_ticker: market.event_ticker,
                                market_ticker: market.ticker,
                                series_ticker: kalshi_guess.series_ticker,
                                close_ts: interval.end_ts,
                                reference_price: market
                                    .last_price
                                    .map(|p| p / rust_decimal::Decimal::from(100)),
                            },
                            now_ms,
                        );
                    } else {
                        warn!(interval_start = interval.start_ts, "no kalshi market found for interval");
                    }
                }
                Err(err) => {
                    warn!(error = %err, "kalshi market listing failed during discovery");
                }
            }
        }
    }

    match gamma.get_current_15min_market(Coin::Btc).await {
        Ok(market) => {
            let up = market.tokens.iter().find(|t| t.outcome.eq_ignore_ascii_case("up") || t.outcome.eq_ignore_ascii_case("yes"));
            let down = market.tokens.iter().find(|t| t.outcome.eq_ignore_ascii_case("down") || t.outcome.eq_ignore_ascii_case("no"));
            if let (Some(up), Some(down)) = (up, down) {
                let guess = polymarket_mapping_for_interval(interval);
                mappings.set_polymarket(
                    interval,
                    PolymarketMapping {
                        up_token: up.token_id.clone(),
                        down_token: down.token_id.clone(),
                        slug: guess.slug,
                        end_ts: interval.end_ts,
                        reference_price: up.price.into(),
                    },
                    now_ms,
                );
            } else {
                warn!(condition_id = %market.condition_id, "polymarket market missing up/down tokens");
            }
        }
        Err(err) => {
            warn!(error = %err, "gamma market discovery failed");
        }
    }
}
