//! Cache Module
//!
//! Two-tier content cache: a bounded in-memory LRU tier in front of a
//! TTL-expiring disk tier, composed by [`TieredCache`].

mod disk;
mod entry;
mod key;
mod list;
mod memory;
mod pressure;
mod stats;
mod tiered;


use async_trait::async_trait;
use bytes::Bytes;

// Re-export public types
pub use disk::{DiskCache, DiskCacheConfig};
pub use entry::{CacheEntry, NodeId};
pub use key::CacheKey;
pub use list::LinkedList;
pub use memory::MemoryCache;
pub use pressure::{MemoryPressure, PressureSubscription};
pub use stats::{CacheStats, DiskStats, DiskStatsSnapshot};
pub use tiered::TieredCache;

// == Public Constants ==
/// Maximum accepted resource identifier length in bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 2048;

// == Cache Contract ==
/// Contract shared by every tier and by the composite cache.
///
/// No method reports failure. A tier that cannot serve a key behaves as if
/// the key were absent; writes and deletions are best-effort.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Looks up a payload. Resolves to `None` on a miss, an expired entry,
    /// or any underlying failure.
    async fn get(&self, key: CacheKey) -> Option<Bytes>;

    /// Stores a payload. Tiers backed by slow storage may complete this
    /// after returning.
    fn save(&self, key: CacheKey, value: Bytes);

    /// Removes data the tier no longer considers worth keeping.
    fn clean(&self);

    /// Removes everything.
    fn purge(&self);
}
