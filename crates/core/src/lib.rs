pub mod config;
pub mod config_loader;
pub mod config_watcher;
pub mod csv_log;
pub mod error;
pub mod quote;
pub mod time;

pub use config::{AppConfig, CsvConfig, KalshiEndpointConfig, PolymarketEndpointConfig, RiskConfig};
pub use config_loader::ConfigLoader;
pub use config_watcher::ConfigWatcher;
pub use csv_log::{ExecutionCsvRow, ExecutionCsvWriter, SettlementCsvRow, SettlementCsvWriter};
pub use error::CoreError;
pub use quote::{NormalizedQuote, Side, Venue};
pub use time::{is_us_dst, to_eastern, IntervalClock, IntervalKey, INTERVAL_WIDTH_SECS};
