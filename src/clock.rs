//! Clock Module
//!
//! Injectable time source shared by the token codec and the article cache.

use chrono::{DateTime, Utc};

// == Clock Trait ==
/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current Unix timestamp in milliseconds.
    fn now_millis(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Mock Clock ==
/// Manually driven clock for tests.
///
/// Uses an atomic so a test can advance time while the cache holds a shared
/// reference to the same clock.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockClock {
    millis: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
impl MockClock {
    /// Creates a clock frozen at the given Unix millisecond timestamp.
    pub fn at_millis(millis: i64) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(millis),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: chrono::Duration) {
        self.millis.fetch_add(
            duration.num_milliseconds(),
            std::sync::atomic::Ordering::SeqCst,
        );
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}
