//! Clock abstraction for time-dependent operations.
//!
//! Expiry and cooldown checks read time through an injected [`Clock`]
//! rather than calling `Utc::now()` directly, so tests can move time
//! forward deterministically.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Trait for clock implementations.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Return the current Unix timestamp in seconds.
    fn now_ts(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System clock that uses the real system time.
///
/// This is the default clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Adjustable clock for testing.
///
/// Starts at a fixed timestamp and can be advanced (or rewound) by a
/// signed number of seconds, which makes expiry-boundary tests
/// deterministic.
#[derive(Debug)]
pub struct ManualClock {
    now_ts: AtomicI64,
}

impl ManualClock {
    /// Create a manual clock fixed at the given Unix timestamp.
    pub fn new(timestamp: i64) -> Self {
        Self {
            now_ts: AtomicI64::new(timestamp),
        }
    }

    /// Shift the clock by the given number of seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.now_ts.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ts = self.now_ts.load(Ordering::SeqCst);
        Utc.timestamp_opt(ts, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}
