//! Composition root: wires the loaded config into one process's worth of
//! venue clients, the mapping store, and the cross-venue engine's
//! collaborators. Every command builds one of these and uses the pieces it
//! needs.

use std::sync::Arc;

use algo_trade_arbitrage_cross::coordinator::Coordinator;
use algo_trade_arbitrage_cross::execution::ExecutionCore;
use algo_trade_arbitrage_cross::execution_state::ExecutionState;
use algo_trade_arbitrage_cross::position::PositionTracker;
use algo_trade_arbitrage_cross::reconciler::PositionReconciler;
use algo_trade_arbitrage_cross::settlement::SettlementTracker;
use algo_trade_core::csv_log::{ExecutionCsvWriter, SettlementCsvWriter};
use algo_trade_core::AppConfig;
use algo_trade_kalshi::KalshiClient;
use algo_trade_polymarket::{GammaClient, PolymarketClient};
use anyhow::Result;

use crate::credentials;
use crate::rollover::LiveRolloverActions;
use crate::venues::LiveVenues;

pub struct Engine {
    pub config: AppConfig,
    pub kalshi: Arc<KalshiClient>,
    pub polymarket: Arc<PolymarketClient>,
    pub gamma: GammaClient,
    pub venues: Arc<LiveVenues>,
    pub state: Arc<ExecutionState>,
    pub positions: Arc<PositionTracker>,
    pub coordinator: Arc<Coordinator>,
    pub rollover_actions: LiveRolloverActions,
    pub executor: ExecutionCore,
    pub reconciler: PositionReconciler,
    pub settlement: SettlementTracker,
    pub exec_csv: ExecutionCsvWriter,
    pub settlement_csv: SettlementCsvWriter,
}

pub fn build(config: AppConfig, now_ms: i64) -> Result<Engine> {
    let kalshi = Arc::new(credentials::kalshi_client(&config)?);
    let polymarket = Arc::new(credentials::polymarket_client(&config)?);
    let gamma = GammaClient::new();

    let venues = Arc::new(LiveVenues::new(Arc::clone(&kalshi), Arc::clone(&polymarket)));

    let state = Arc::new(ExecutionState::new(now_ms));
    let positions = Arc::new(PositionTracker::new());
    let coordinator = Arc::new(Coordinator::new(Arc::clone(&state), Arc::clone(&positions)));
    let rollover_actions = LiveRolloverActions::new(Arc::clone(&venues));
    let executor = ExecutionCore::new(Arc::clone(&state), Arc::clone(&positions));
    let reconciler = PositionReconciler::new(Arc::clone(&state), Arc::clone(&positions));
    let settlement = SettlementTracker::new();

    let exec_csv = ExecutionCsvWriter::open(&config.csv.executions_path)?;
    let settlement_csv = SettlementCsvWriter::open(&config.csv.settlements_path)?;

    Ok(Engine {
        config,
        kalshi,
        polymarket,
        gamma,
        venues,
        state,
        positions,
        coordinator,
        rollover_actions,
        executor,
        reconciler,
        settlement,
        exec_csv,
        settlement_csv,
    })
}
