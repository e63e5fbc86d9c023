//! Clean Task
//!
//! Background task that periodically runs `clean()` on a cache, which evicts
//! the memory tier down to capacity and removes expired disk entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that calls [`Cache::clean`] every interval.
///
/// The first clean runs one interval after spawning. Abort the returned
/// handle to stop the task.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(TieredCache::from_config(&config));
/// let clean_handle = spawn_clean_task(cache.clone(), 3600);
/// // Later, during shutdown:
/// clean_handle.abort();
/// ```
pub fn spawn_clean_task<C>(cache: Arc<C>, clean_interval_secs: u64) -> JoinHandle<()>
where
    C: Cache + ?Sized + 'static,
{
    // A zero interval would spin
    let interval = Duration::from_secs(clean_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting clean task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;
            debug!("Running scheduled cache clean");
            cache.clean();
        }
    })
}
