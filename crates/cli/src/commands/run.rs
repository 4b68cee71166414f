//! The live loop: discovers markets, scans quotes, executes, reconciles,
//! and rolls over intervals, until interrupted.

use std::time::Duration;

use algo_trade_arbitrage_cross::execution::VenueClients;
use algo_trade_arbitrage_cross::fees::box_fee_buffer;
use algo_trade_arbitrage_cross::reconciler::CorrectiveAction;
use algo_trade_arbitrage_cross::scanner::scan;
use algo_trade_arbitrage_cross::types::ExecutionRecord;
use algo_trade_core::csv_log::{ExecutionCsvRow, ExecutionCsvWriter};
use algo_trade_core::quote::Venue;
use algo_trade_core::time::IntervalKey;
use algo_trade_core::{AppConfig, RiskConfig};
use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::discovery::discover_interval;

use super::setup::{self, Engine};

pub async fn run(mut config: AppConfig, force_dry_run: bool) -> Result<()> {
    if force_dry_run {
        config.dry_run = true;
    }
    info!(dry_run = config.dry_run, "starting live loop");

    let now_ms = Utc::now().timestamp_millis();
    let engine = setup::build(config, now_ms)?;

    let mut current = IntervalKey::containing(now_ms / 1000);
    let mappings = engine.coordinator.mappings();
    discover_interval(&engine.kalshi, &engine.gamma, mappings, current, now_ms).await;
    discover_interval(&engine.kalshi, &engine.gamma, mappings, current.next(), now_ms).await;

    if let Some(mapping) = mappings.get(current) {
        if mapping.is_complete() {
            if let Err(event) = engine
                .coordinator
                .start_interval(current, &engine.rollover_actions)
                .await
            {
                warn!(?event, "failed to start initial interval");
            }
        } else {
            warn!("initial interval mapping incomplete at startup, waiting for rollover");
        }
    }

    let mut scan_tick = tokio::time::interval(Duration::from_millis(500));
    let mut reconcile_tick =
        tokio::time::interval(Duration::from_millis(engine.config.risk.reconciler_tick_ms));

    loop {
        tokio::select! {
            _ = scan_tick.tick() => {
                current = on_scan_tick(&engine, current).await;
            }
            _ = reconcile_tick.tick() => {
                on_reconcile_tick(&engine).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping live loop");
                break;
            }
        }
    }

    Ok(())
}

async fn on_scan_tick(engine: &Engine, active: IntervalKey) -> IntervalKey {
    let now_ms = Utc::now().timestamp_millis();
    let now_ts = now_ms / 1000;

    if now_ts >= active.end_ts {
        let next = active.next();
        discover_interval(&engine.kalshi, &engine.gamma, engine.coordinator.mappings(), next.next(), now_ms).await;
        let events = engine.coordinator.rollover(active, next, &engine.rollover_actions).await;
        for event in events {
            info!(?event, "rollover");
        }
        return engine.coordinator.active_interval().unwrap_or(next);
    }

    if engine.state.kill_switch_triggered() && !engine.state.attempt_recovery(engine.config.risk.max_daily_loss) {
        return active;
    }

    let Some((kalshi_quote, polymarket_quote)) = engine.coordinator.quotes().both_sides() else {
        return active;
    };

    let fee_buffer = estimate_fee_buffer(&engine.config.risk);
    let slippage_buffer = engine.config.risk.slippage_buffer_per_leg * rust_decimal_macros::dec!(2);
    let Some(opportunity) = scan(
        &kalshi_quote,
        &polymarket_quote,
        active,
        fee_buffer,
        slippage_buffer,
        engine.config.risk.min_edge_net,
    ) else {
        return active;
    };

    let time_to_rollover_ms = active.ms_until_end(now_ms);
    let clients: Option<&dyn VenueClients> = if engine.config.dry_run {
        None
    } else {
        Some(engine.venues.as_ref())
    };

    let result = engine
        .executor
        .execute(opportunity, &engine.config.risk, time_to_rollover_ms, clients, now_ms)
        .await;

    if let Err(err) = log_execution(&engine.exec_csv, &result.record) {
        warn!(error = %err, "failed to append execution csv row");
    }

    if let Some(reason) = result.should_trigger_kill_switch {
        engine.state.trigger_kill_switch(reason);
    }
    if result.should_enter_cooldown {
        let duration = if result.success {
            engine.config.risk.cooldown_ms_after_success
        } else {
            engine.config.risk.cooldown_ms_after_failure
        };
        engine.state.enter_cooldown(now_ms, duration);
    }
    if let Some(error) = &result.error {
        warn!(error = %error, success = result.success, "execution finished with error");
    } else {
        info!(success = result.success, edge_net = %result.record.expected_edge_net, "execution finished");
    }
    engine.reconciler.note_execution(now_ms);

    active
}

async fn on_reconcile_tick(engine: &Engine) {
    let now_ms = Utc::now().timestamp_millis();
    let report = engine
        .reconciler
        .tick(engine.venues.as_ref(), engine.venues.as_ref(), &engine.config.risk, now_ms)
        .await;
    if !matches!(report.action, CorrectiveAction::None) {
        info!(?report, "reconciler corrective action taken");
    }
}

/// Flat pre-trade fee estimate: both legs' fee formulas at a representative
/// 50-cent price and the per-trade quantity cap. `scanner::scan` needs a
/// scalar buffer before it knows the real fill prices, so this trades
/// precision for a conservative, order-of-magnitude-correct number.
fn estimate_fee_buffer(risk: &RiskConfig) -> rust_decimal::Decimal {
    let qty = risk.max_qty_per_trade;
    let mid = rust_decimal::Decimal::new(50, 2);
    box_fee_buffer(Venue::Kalshi, qty, mid, Venue::Polymarket, qty, mid)
}

fn log_execution(writer: &ExecutionCsvWriter, record: &ExecutionRecord) -> Result<()> {
    let row = ExecutionCsvRow {
        execution_id: record.id.clone(),
        interval_start_ts: record.opportunity.interval.start_ts,
        interval_end_ts: record.opportunity.interval.end_ts,
        status: status_str(record.status),
        leg_a_venue: record.leg_a.venue.map(|v| v.to_string()).unwrap_or_default(),
        leg_a_side: record.leg_a.side.map(|s| s.to_string()).unwrap_or_default(),
        leg_a_price: record.leg_a.requested_price,
        leg_a_qty: record.leg_a.requested_qty,
        leg_a_filled: record.leg_a.filled_qty,
        leg_b_venue: record.leg_b.venue.map(|v| v.to_string()).unwrap_or_default(),
        leg_b_side: record.leg_b.side.map(|s| s.to_string()).unwrap_or_default(),
        leg_b_price: record.leg_b.requested_price,
        leg_b_qty: record.leg_b.requested_qty,
        leg_b_filled: record.leg_b.filled_qty,
        unwound: record.unwind.is_some(),
        expected_edge_net: record.expected_edge_net,
        realized_pnl: record.realized_pnl,
        start_ts: record.start_ts,
        end_ts: record.end_ts.unwrap_or(record.start_ts),
    };
    writer.append(&row)?;
    Ok(())
}

fn status_str(status: algo_trade_arbitrage_cross::types::ExecutionStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

#[allow(unused)]
fn unused_error_log_hint() {
    error!("unreachable: present to keep `error` import used across feature gates");
}
