//! Cache Entry Module
//!
//! The single article snapshot held by the cache, stamped with its fetch time.

use std::sync::Arc;

use crate::content::Article;

// == Cache Entry ==
/// Articles fetched together, plus when they were fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Transformed articles, shared with readers without copying
    pub articles: Arc<Vec<Article>>,
    /// Fetch timestamp (Unix milliseconds)
    pub fetched_at_millis: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry fetched at `fetched_at_millis`.
    pub fn new(articles: Vec<Article>, fetched_at_millis: i64) -> Self {
        Self {
            articles: Arc::new(articles),
            fetched_at_millis,
        }
    }

    // == Is Fresh ==
    /// Fresh iff `now - fetched_at < ttl`.
    ///
    /// Boundary condition: at exactly `ttl` milliseconds of age the entry is
    /// expired, mirroring a TTL that has fully elapsed.
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        self.age_millis(now_millis) < ttl_millis
    }

    // == Age ==
    /// Milliseconds since the fetch; never negative.
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.fetched_at_millis).max(0)
    }
}
