//! Interval clock and Eastern Time helpers.
//!
//! The engine keys every piece of state — quotes, mappings, pending
//! settlements, fills — off the current 15-minute UTC-aligned window.
//! `IntervalKey` is that key; `IntervalClock` derives it from wall-clock
//! time and dispatches rollover callbacks.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Duration as TokioDuration, Instant};
use tracing::{debug, trace};

pub const INTERVAL_WIDTH_SECS: i64 = 900;

/// A 15-minute UTC-aligned window, identified by its start and end epoch
/// seconds. `end_ts - start_ts` is always [`INTERVAL_WIDTH_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct IntervalKey {
    pub start_ts: i64,
    pub end_ts: i64,
}

impl IntervalKey {
    /// Builds the interval containing `ts` (epoch seconds). A tick that
    /// lands exactly on a boundary belongs to the interval it opens, not
    /// the one it closes.
    pub fn containing(ts: i64) -> Self {
        let start_ts = ts.div_euclid(INTERVAL_WIDTH_SECS) * INTERVAL_WIDTH_SECS;
        Self {
            start_ts,
            end_ts: start_ts + INTERVAL_WIDTH_SECS,
        }
    }

    pub fn next(self) -> Self {
        Self {
            start_ts: self.end_ts,
            end_ts: self.end_ts + INTERVAL_WIDTH_SECS,
        }
    }

    pub fn ms_until_end(self, now_ts_ms: i64) -> i64 {
        self.end_ts * 1000 - now_ts_ms
    }

    pub fn start_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.start_ts, 0).single().expect("valid interval start")
    }

    pub fn end_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.end_ts, 0).single().expect("valid interval end")
    }
}

type RolloverCallback = Box<dyn Fn(IntervalKey, IntervalKey) + Send + Sync>;

/// Drives rollover callbacks off a periodic tick. Callbacks run in
/// registration order on a single dispatcher task, so none can observe a
/// partially-rolled-over interval key.
pub struct IntervalClock {
    callbacks: Arc<Mutex<Vec<RolloverCallback>>>,
    current: Arc<Mutex<IntervalKey>>,
}

impl IntervalClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(Vec::new())),
            current: Arc::new(Mutex::new(IntervalKey::containing(now.timestamp()))),
        }
    }

    pub async fn current(&self) -> IntervalKey {
        *self.current.lock().await
    }

    pub async fn on_rollover<F>(&self, callback: F)
    where
        F: Fn(IntervalKey, IntervalKey) + Send + Sync + 'static,
    {
        self.callbacks.lock().await.push(Box::new(callback));
    }

    /// Spawns the dispatcher. Polls once a second; cheap relative to the
    /// 900s interval width and keeps rollover latency under a second.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now(), TokioDuration::from_secs(1));
            loop {
                ticker.tick().await;
                let now = Utc::now();
                let observed = IntervalKey::containing(now.timestamp());
                let mut current = self.current.lock().await;
                if observed != *current {
                    let previous = *current;
                    *current = observed;
                    drop(current);
                    debug!(?previous, ?observed, "interval rollover");
                    let callbacks = self.callbacks.lock().await;
                    for cb in callbacks.iter() {
                        cb(previous, observed);
                    }
                } else {
                    trace!(?observed, "interval tick, no rollover");
                }
            }
        })
    }
}

/// True if `date` (in US Eastern civil time) observes daylight time, per
/// the 2nd-Sunday-of-March through 1st-Sunday-of-November US rule.
/// `chrono-tz` already encodes this offset table; this helper exists so
/// ticker construction can reason about the transition dates directly
/// instead of round-tripping through a `DateTime<Tz>` comparison.
pub fn is_us_dst(year: i32, month: u32, day: u32) -> bool {
    let dst_start = nth_sunday_of_month(year, 3, 2);
    let dst_end = nth_sunday_of_month(year, 11, 1);
    let date = (month, day);
    let start = (dst_start.month(), dst_start.day());
    let end = (dst_end.month(), dst_end.day());
    date >= start && date <= end
}

fn nth_sunday_of_month(year: i32, month: u32, n: u32) -> chrono::NaiveDate {
    let first = chrono::NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let offset = (7 - first.weekday().num_days_from_sunday()) % 7;
    let first_sunday = first + Duration::days(offset as i64);
    debug_assert_eq!(first_sunday.weekday(), Weekday::Sun);
    first_sunday + Duration::weeks((n - 1) as i64)
}

/// Converts a UTC timestamp to its US Eastern civil-time representation,
/// used to derive deterministic ticker/slug components that are phrased
/// in Eastern wall-clock time.
pub fn to_eastern(ts: DateTime<Utc>) -> DateTime<Tz> {
    ts.with_timezone(&New_York)
}
