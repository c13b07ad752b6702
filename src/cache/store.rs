//! Article Cache Store
//!
//! Single-entry, time-boxed cache of transformed articles in front of the
//! rate-limited newsletter platform.
//!
//! Refills are single-flight: a mutex serializes fetch + transform + swap and
//! keeps the outcome of the last refill. Every completed refill bumps a
//! generation counter; a caller that finds the generation moved while it waited
//! for the mutex takes that outcome (fresh, stale or error) instead of fetching
//! again. The refill itself runs on a spawned task, so a caller that disconnects
//! mid-fetch does not cancel work other readers are waiting on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::Clock;
use crate::content::{transform_posts, Article};
use crate::error::{AppError, Result};
use crate::platform::PostSource;

/// Default time an entry stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == Freshness ==
/// How a read was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served from an entry younger than the TTL
    Fresh,
    /// Fetched from upstream for this read
    Refreshed,
    /// Upstream failed; served from an expired entry
    Stale,
}

/// Articles returned by a read, with how they were obtained.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub articles: Arc<Vec<Article>>,
    pub freshness: Freshness,
}

impl Snapshot {
    fn of(entry: &CacheEntry, freshness: Freshness) -> Self {
        Self {
            articles: entry.articles.clone(),
            freshness,
        }
    }
}

// == Article Cache ==
/// Process-wide article cache. Cloning shares the same entry.
#[derive(Clone)]
pub struct ArticleCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    source: Arc<dyn PostSource>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    /// Completed refills, successful or not
    generation: AtomicU64,
    /// Held for the whole refill; stores its outcome for queued callers
    last_refill: Mutex<Option<Result<Snapshot>>>,
    stats: StdMutex<CacheStats>,
}

impl ArticleCache {
    // == Constructor ==
    /// Creates an empty cache over `source`.
    pub fn new(source: Arc<dyn PostSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                clock,
                ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
                entry: RwLock::new(None),
                generation: AtomicU64::new(0),
                last_refill: Mutex::new(None),
                stats: StdMutex::new(CacheStats::new()),
            }),
        }
    }

    // == Reads ==
    /// All published articles.
    pub async fn get_articles(&self) -> Result<Arc<Vec<Article>>> {
        Ok(self.snapshot().await?.articles)
    }

    /// One article by id. An unknown id is `NotFound`, never an upstream error.
    pub async fn get_article_by_id(&self, id: &str) -> Result<Article> {
        let snapshot = self.snapshot().await?;
        snapshot
            .articles
            .iter()
            .find(|article| article.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    /// Current articles and whether they were fresh, refreshed or stale.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        // Read before the freshness check so a refill finishing in between is noticed.
        let seen = self.inner.generation();
        if let Some(snapshot) = self.inner.fresh_snapshot().await {
            self.inner.stats().record_hit();
            return Ok(snapshot);
        }
        self.spawn_refill(seen).await
    }

    // == Refresh ==
    /// Fetches from upstream even if the entry is fresh. Falls back to the
    /// existing entry on failure, like a read does. A refresh queued behind a
    /// refill in flight takes that refill's outcome.
    pub async fn refresh(&self) -> Result<Snapshot> {
        let seen = self.inner.generation();
        self.spawn_refill(seen).await
    }

    // == Stats ==
    /// Counters plus the size and age of the current entry.
    pub async fn stats(&self) -> CacheStats {
        let now = self.inner.clock.now_millis();
        let entry = self.inner.entry.read().await.clone();

        let mut stats = self.inner.stats().clone();
        stats.articles = entry.as_ref().map_or(0, |e| e.articles.len());
        stats.entry_age_ms = entry.map(|e| e.age_millis(now));
        stats.update_hit_rate();
        stats
    }

    async fn spawn_refill(&self, seen: u64) -> Result<Snapshot> {
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.refill(seen).await })
            .await
            .map_err(|e| AppError::Internal(format!("Cache refill task failed: {}", e)))?
    }
}

impl CacheInner {
    fn stats(&self) -> MutexGuard<'_, CacheStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    async fn current(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().await.clone()
    }

    async fn fresh_snapshot(&self) -> Option<Snapshot> {
        let now = self.clock.now_millis();
        self.current()
            .await
            .filter(|entry| entry.is_fresh(now, self.ttl_millis))
            .map(|entry| Snapshot::of(&entry, Freshness::Fresh))
    }

    /// Runs one refill unless another completed after generation `seen`.
    async fn refill(&self, seen: u64) -> Result<Snapshot> {
        let mut last_refill = self.last_refill.lock().await;

        if self.generation() != seen {
            if let Some(outcome) = last_refill.clone() {
                debug!("reusing article refill completed while waiting");
                return self.shared_outcome(outcome);
            }
        }

        let outcome = self.fetch_and_swap().await;
        *last_refill = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Accounts for a caller served by someone else's refill.
    fn shared_outcome(&self, outcome: Result<Snapshot>) -> Result<Snapshot> {
        match outcome {
            Ok(snapshot) if snapshot.freshness == Freshness::Stale => {
                self.stats().record_stale_serve();
                Ok(snapshot)
            }
            Ok(snapshot) => {
                self.stats().record_hit();
                Ok(Snapshot {
                    freshness: Freshness::Fresh,
                    ..snapshot
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_and_swap(&self) -> Result<Snapshot> {
        match self.source.fetch_posts().await {
            Ok(posts) => {
                let total = posts.len();
                let entry = Arc::new(CacheEntry::new(
                    transform_posts(posts),
                    self.clock.now_millis(),
                ));
                *self.entry.write().await = Some(entry.clone());
                self.stats().record_refill();

                info!(
                    posts = total,
                    articles = entry.articles.len(),
                    "article cache refilled"
                );
                Ok(Snapshot::of(&entry, Freshness::Refreshed))
            }
            Err(err) => {
                self.stats().record_upstream_failure();

                match self.current().await {
                    Some(previous) => {
                        self.stats().record_stale_serve();
                        warn!(
                            error = %err,
                            age_ms = previous.age_millis(self.clock.now_millis()),
                            "article fetch failed, serving stale cache"
                        );
                        Ok(Snapshot::of(&previous, Freshness::Stale))
                    }
                    None => {
                        error!(error = %err, "article fetch failed with no cached data");
                        Err(err)
                    }
                }
            }
        }
    }
}
