//! Cache Statistics Module
//!
//! Counts how article reads were satisfied, so stale fallbacks stay visible in
//! logs and health output even though readers get the same payload.

use serde::Serialize;

// == Cache Stats ==
/// Article cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Successful upstream fetches that replaced the entry
    pub refills: u64,
    /// Reads served from an expired entry after a failed fetch
    pub stale_serves: u64,
    /// Failed upstream fetches
    pub upstream_failures: u64,
    /// Articles in the current entry
    pub articles: usize,
    /// Age of the current entry in milliseconds, if any
    pub entry_age_ms: Option<i64>,
    /// Share of reads that did not need an upstream call
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Recomputes `hit_rate` as hits / (hits + refills + stale_serves),
    /// or 0.0 before any read.
    pub fn update_hit_rate(&mut self) {
        let total = self.hits + self.refills + self.stale_serves;
        self.hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the refill counter.
    pub fn record_refill(&mut self) {
        self.refills += 1;
    }

    /// Increments the stale-serve counter.
    pub fn record_stale_serve(&mut self) {
        self.stale_serves += 1;
    }

    /// Increments the upstream failure counter.
    pub fn record_upstream_failure(&mut self) {
        self.upstream_failures += 1;
    }
}
