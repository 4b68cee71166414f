//! Application configuration for the cross-venue arbitrage engine.
//!
//! Credentials (RSA private key, L2 secret, signer key) never live in this
//! tree — they are loaded directly from environment variables by each
//! venue's auth module so they can never be hot-reloaded or accidentally
//! dumped alongside risk parameters.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub kalshi: KalshiEndpointConfig,
    #[serde(default)]
    pub polymarket: PolymarketEndpointConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub csv: CsvConfig,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KalshiEndpointConfig {
    pub base_url: String,
}

impl Default for KalshiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trading-api.kalshi.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketEndpointConfig {
    pub base_url: String,
    pub ws_url: String,
}

impl Default for PolymarketEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://clob.polymarket.com".to_string(),
            ws_url: "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string(),
        }
    }
}

/// Risk parameters, frozen in a single config tree so every limit the
/// executor and guards consult is in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub min_edge_net: Decimal,
    pub slippage_buffer_per_leg: Decimal,
    pub max_leg_delay_ms: u64,
    pub cooldown_ms_after_failure: u64,
    pub cooldown_ms_after_success: u64,
    pub max_daily_loss: Decimal,
    pub max_notional: Decimal,
    pub max_qty_per_trade: Decimal,
    pub book_depth_fraction: Decimal,
    pub unwind_ladder_steps: u32,
    pub unwind_ladder_step_size: Decimal,
    pub unwind_ladder_step_timeout_ms: u64,
    pub unwind_max_total_time_ms: u64,
    pub min_venue_balance: Decimal,
    pub no_new_positions_cutoff_ms: u64,
    pub pre_close_unwind_ms: u64,
    pub reconciler_post_exec_grace_period_ms: u64,
    pub reconciler_tick_ms: u64,
    pub max_reconciler_action_qty: Decimal,
    pub reconciler_noise_floor_contracts: Decimal,
    pub reconciler_stability_tolerance_contracts: Decimal,
    pub reconciler_corrective_cooldown_ms: u64,
    pub max_open_orders: u32,
    pub max_position_imbalance_contracts: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_edge_net: dec!(0.04),
            slippage_buffer_per_leg: dec!(0.005),
            max_leg_delay_ms: 500,
            cooldown_ms_after_failure: 3000,
            cooldown_ms_after_success: 1000,
            max_daily_loss: dec!(20),
            max_notional: dec!(200),
            max_qty_per_trade: dec!(25),
            book_depth_fraction: dec!(0.80),
            unwind_ladder_steps: 3,
            unwind_ladder_step_size: dec!(0.01),
            unwind_ladder_step_timeout_ms: 500,
            unwind_max_total_time_ms: 3000,
            min_venue_balance: dec!(10),
            no_new_positions_cutoff_ms: 75_000,
            pre_close_unwind_ms: 70_000,
            reconciler_post_exec_grace_period_ms: 30_000,
            reconciler_tick_ms: 60_000,
            max_reconciler_action_qty: dec!(50),
            reconciler_noise_floor_contracts: dec!(5),
            reconciler_stability_tolerance_contracts: dec!(2),
            reconciler_corrective_cooldown_ms: 120_000,
            max_open_orders: 10,
            max_position_imbalance_contracts: dec!(2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    pub executions_path: String,
    pub settlements_path: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            executions_path: "data/executions.csv".to_string(),
            settlements_path: "data/settlements.csv".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            log_level: default_log_level(),
            kalshi: KalshiEndpointConfig::default(),
            polymarket: PolymarketEndpointConfig::default(),
            risk: RiskConfig::default(),
            csv: CsvConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_risk_config_matches_frozen_parameters() {
        let risk = RiskConfig::default();
        assert_eq!(risk.min_edge_net, dec!(0.04));
        assert_eq!(risk.max_daily_loss, dec!(20));
        assert_eq!(risk.unwind_ladder_steps, 3);
        assert_eq!(risk.no_new_positions_cutoff_ms, 75_000);
    }

    #[test]
    fn default_app_config_is_dry_run() {
        let config = AppConfig::default();
        assert!(config.dry_run);
    }
}
