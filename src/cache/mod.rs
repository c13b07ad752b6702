//! Cache Module
//!
//! Time-boxed, single-entry article cache with stale fallback on upstream failure.

mod entry;
mod stats;
mod store;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{ArticleCache, Freshness, Snapshot, DEFAULT_TTL};
