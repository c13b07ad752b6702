//! Article Refresh Task
//!
//! Background task that warms the article cache at startup and refreshes it
//! before readers find it expired.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::{ArticleCache, Freshness};

/// Spawns a background task that refreshes the article cache periodically.
///
/// The first refresh runs immediately. Failed refreshes leave the previous
/// entry in place; the next tick tries again.
///
/// # Arguments
/// * `cache` - Shared article cache
/// * `refresh_interval_secs` - Interval in seconds between refreshes
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_refresh_task(cache: ArticleCache, refresh_interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(refresh_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting article refresh task with interval of {} seconds",
            period.as_secs()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match cache.refresh().await {
                Ok(snapshot) if snapshot.freshness == Freshness::Stale => {
                    warn!("Article refresh failed, keeping previous articles");
                }
                Ok(snapshot) => {
                    debug!(articles = snapshot.articles.len(), "Article refresh complete");
                }
                Err(err) => {
                    warn!(error = %err, "Article refresh failed with nothing cached");
                }
            }
        }
    })
}
