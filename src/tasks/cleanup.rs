//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so
//! entries that are fetched once and never read again do not pile up.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::DataCache;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The first sweep runs one full interval after spawning.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = DataCache::default();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), paid_cache::cache::CLEANUP_INTERVAL);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: DataCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting TTL cleanup task");

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
