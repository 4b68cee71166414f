//! One-shot and continuous market-discovery commands, useful for checking
//! what the engine would trade against before starting a live run.

use std::time::Duration;

use algo_trade_core::time::IntervalKey;
use algo_trade_core::AppConfig;
use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::discovery::discover_interval;

use super::setup;

pub async fn discover(config: AppConfig) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;
    let current = IntervalKey::containing(now_ms / 1000);

    discover_interval(&engine.kalshi, &engine.gamma, engine.coordinator.mappings(), current, now_ms).await;
    let mapping = engine.coordinator.mappings().get(current);

    match mapping {
        Some(mapping) => {
            info!(
                interval_start = current.start_ts,
                interval_end = current.end_ts,
                kalshi = ?mapping.kalshi,
                polymarket = ?mapping.polymarket,
                complete = mapping.is_complete(),
                "discovered interval"
            );
        }
        None => info!(interval_start = current.start_ts, "no mapping discovered"),
    }

    Ok(())
}

pub async fn watch(config: AppConfig, poll_ms: u64) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;
    let mut tick = tokio::time::interval(Duration::from_millis(poll_ms));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now_ms = Utc::now().timestamp_millis();
                let current = IntervalKey::containing(now_ms / 1000);
                let next = current.next();
                discover_interval(&engine.kalshi, &engine.gamma, engine.coordinator.mappings(), current, now_ms).await;
                discover_interval(&engine.kalshi, &engine.gamma, engine.coordinator.mappings(), next, now_ms).await;

                for interval in [current, next] {
                    if let Some(mapping) = engine.coordinator.mappings().get(interval) {
                        info!(
                            interval_start = interval.start_ts,
                            complete = mapping.is_complete(),
                            "watch tick"
                        );
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping discovery watch");
                break;
            }
        }
    }

    Ok(())
}
