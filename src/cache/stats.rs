//! Cache Statistics Module
//!
//! Tracks per-tier metrics. The tiers never surface errors to callers, so
//! these counters are the only place failures become visible.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Memory tier metrics. Updated under the tier's lock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Current number of entries
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.hits, self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Disk Stats ==
/// Disk tier metrics, shared with background tasks.
#[derive(Debug, Default)]
pub struct DiskStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    writes: AtomicU64,
    removed: AtomicU64,
    io_errors: AtomicU64,
}

/// Point-in-time copy of [`DiskStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskStatsSnapshot {
    /// Reads that returned a fresh entry
    pub hits: u64,
    /// Reads that found nothing usable (missing, expired or unreadable)
    pub misses: u64,
    /// Subset of misses caused by an entry older than the TTL
    pub expired: u64,
    /// Successful writes
    pub writes: u64,
    /// Files deleted by clean or purge
    pub removed: u64,
    /// Swallowed file system failures
    pub io_errors: u64,
}

impl DiskStatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.hits, self.misses)
    }
}

impl DiskStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an expired read. Also counted as a miss.
    pub fn record_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removed(&self, count: usize) {
        self.removed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> DiskStatsSnapshot {
        DiskStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
