//! Error types for the shared core crate. Venue and strategy crates
//! mostly propagate `anyhow::Error`; this enum exists for the handful of
//! core-level failures callers may want to match on (config loading,
//! stale quotes) rather than just log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(#[from] figment::Error),

    #[error("config watcher error: {0}")]
    Watch(#[source] notify::Error),

    #[error("csv persistence error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("quote for {venue} interval {interval_start} is stale by {staleness_ms}ms")]
    StaleQuote {
        venue: String,
        interval_start: i64,
        staleness_ms: i64,
    },
}

impl From<notify::Error> for CoreError {
    fn from(err: notify::Error) -> Self {
        CoreError::Watch(err)
    }
}
