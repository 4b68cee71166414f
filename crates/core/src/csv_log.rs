//! Append-only CSV persistence for execution and settlement records.
//!
//! Each writer owns a single file handle behind a `parking_lot::Mutex` and
//! flushes after every row — these logs are the audit trail for a live
//! trading process, not a buffered bulk-export path.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionCsvRow {
    pub execution_id: String,
    pub interval_start_ts: i64,
    pub interval_end_ts: i64,
    pub status: String,
    pub leg_a_venue: String,
    pub leg_a_side: String,
    pub leg_a_price: Decimal,
    pub leg_a_qty: Decimal,
    pub leg_a_filled: Decimal,
    pub leg_b_venue: String,
    pub leg_b_side: String,
    pub leg_b_price: Decimal,
    pub leg_b_qty: Decimal,
    pub leg_b_filled: Decimal,
    pub unwound: bool,
    pub expected_edge_net: Decimal,
    pub realized_pnl: Option<Decimal>,
    pub start_ts: i64,
    pub end_ts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementCsvRow {
    pub interval_start_ts: i64,
    pub interval_end_ts: i64,
    pub btc_ref_price_kalshi: Option<Decimal>,
    pub btc_ref_price_polymarket: Option<Decimal>,
    pub btc_spot_at_close: Decimal,
    pub btc_twap_60s_at_close: Decimal,
    pub kalshi_resolution: String,
    pub polymarket_resolution: String,
    pub oracles_agree: bool,
    pub dead_zone_hit: bool,
    pub btc_crossing_count: u32,
    pub btc_range_usd: Decimal,
    pub btc_dist_from_ref_at_close: Option<Decimal>,
    pub checked_at: i64,
}

/// Thin wrapper around a `csv::Writer` that appends to an existing file
/// without rewriting the header on every process restart.
pub struct CsvLogWriter {
    writer: Mutex<csv::Writer<std::fs::File>>,
}

impl CsvLogWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating parent dir for {}", path.display()))?;
        }
        let write_header = !path.exists() || std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening csv log {}", path.display()))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    pub fn append<T: Serialize>(&self, row: &T) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.serialize(row).context("serializing csv row")?;
        if let Err(err) = writer.flush() {
            warn!(error = %err, "csv flush failed");
            return Err(err).context("flushing csv log");
        }
        Ok(())
    }
}

pub struct ExecutionCsvWriter(CsvLogWriter);

impl ExecutionCsvWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self(CsvLogWriter::open(path)?))
    }

    pub fn append(&self, row: &ExecutionCsvRow) -> Result<()> {
        self.0.append(row)
    }
}

pub struct SettlementCsvWriter(CsvLogWriter);

impl SettlementCsvWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self(CsvLogWriter::open(path)?))
    }

    pub fn append(&self, row: &SettlementCsvRow) -> Result<()> {
        self.0.append(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn execution_writer_creates_file_and_appends_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("executions.csv");
        let writer = ExecutionCsvWriter::open(&path).unwrap();
        let row = ExecutionCsvRow {
            execution_id: "exec-1".to_string(),
            interval_start_ts: 0,
            interval_end_ts: 900,
            status: "completed".to_string(),
            leg_a_venue: "kalshi".to_string(),
            leg_a_side: "yes".to_string(),
            leg_a_price: dec!(0.45),
            leg_a_qty: dec!(10),
            leg_a_filled: dec!(10),
            leg_b_venue: "polymarket".to_string(),
            leg_b_side: "no".to_string(),
            leg_b_price: dec!(0.50),
            leg_b_qty: dec!(10),
            leg_b_filled: dec!(10),
            unwound: false,
            expected_edge_net: dec!(0.04),
            realized_pnl: Some(dec!(0.40)),
            start_ts: 0,
            end_ts: 1,
        };
        writer.append(&row).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("exec-1"));
        assert!(contents.contains("execution_id"));
    }

    #[test]
    fn reopening_existing_file_does_not_duplicate_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("executions.csv");
        {
            let writer = ExecutionCsvWriter::open(&path).unwrap();
            writer
                .append(&ExecutionCsvRow {
                    execution_id: "exec-1".to_string(),
                    interval_start_ts: 0,
                    interval_end_ts: 900,
                    status: "completed".to_string(),
                    leg_a_venue: "kalshi".to_string(),
                    leg_a_side: "yes".to_string(),
                    leg_a_price: dec!(0.45),
                    leg_a_qty: dec!(10),
                    leg_a_filled: dec!(10),
                    leg_b_venue: "polymarket".to_string(),
                    leg_b_side: "no".to_string(),
                    leg_b_price: dec!(0.50),
                    leg_b_qty: dec!(10),
                    leg_b_filled: dec!(10),
                    unwound: false,
                    expected_edge_net: dec!(0.04),
                    realized_pnl: Some(dec!(0.40)),
                    start_ts: 0,
                    end_ts: 1,
                })
                .unwrap();
        }
        {
            let writer = ExecutionCsvWriter::open(&path).unwrap();
            writer
                .append(&ExecutionCsvRow {
                    execution_id: "exec-2".to_string(),
                    interval_start_ts: 900,
                    interval_end_ts: 1800,
                    status: "completed".to_string(),
                    leg_a_venue: "kalshi".to_string(),
                    leg_a_side: "no".to_string(),
                    leg_a_price: dec!(0.40),
                    leg_a_qty: dec!(5),
                    leg_a_filled: dec!(5),
                    leg_b_venue: "polymarket".to_string(),
                    leg_b_side: "yes".to_string(),
                    leg_b_price: dec!(0.55),
                    leg_b_qty: dec!(5),
                    leg_b_filled: dec!(5),
                    unwound: false,
                    expected_edge_net: dec!(0.05),
                    realized_pnl: Some(dec!(0.25)),
                    start_ts: 900,
                    end_ts: 901,
                })
                .unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("execution_id").count(), 1);
        assert!(contents.contains("exec-1"));
        assert!(contents.contains("exec-2"));
    }

    #[test]
    fn settlement_writer_emits_one_row_per_interval_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settlements.csv");
        let writer = SettlementCsvWriter::open(&path).unwrap();
        writer
            .append(&SettlementCsvRow {
                interval_start_ts: 0,
                interval_end_ts: 900,
                btc_ref_price_kalshi: Some(dec!(97330)),
                btc_ref_price_polymarket: Some(dec!(97300)),
                btc_spot_at_close: dec!(97315),
                btc_twap_60s_at_close: dec!(97315),
                kalshi_resolution: "no".to_string(),
                polymarket_resolution: "yes".to_string(),
                oracles_agree: false,
                dead_zone_hit: true,
                btc_crossing_count: 1,
                btc_range_usd: dec!(50),
                btc_dist_from_ref_at_close: Some(dec!(0)),
                checked_at: 15_000,
            })
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("dead_zone_hit"));
        assert!(contents.contains("97330"));
    }
}
