//! Memory Cache Module
//!
//! Bounded LRU tier: a hash map from key to list handle plus the linked list
//! that keeps recency order, both behind one mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{
    Cache, CacheKey, CacheStats, LinkedList, MemoryPressure, NodeId, PressureSubscription,
};
use crate::config::DEFAULT_MEMORY_CAPACITY;

/// Map and list are only ever touched together under the same guard.
#[derive(Debug, Default)]
struct LruState {
    map: HashMap<CacheKey, NodeId>,
    list: LinkedList<CacheKey, Bytes>,
    stats: CacheStats,
}

impl LruState {
    /// Pops tail nodes until the entry count is within `capacity`.
    fn evict_to(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.map.len() > capacity {
            let Some(node) = self.list.pop() else {
                break;
            };
            self.map.remove(&node.key);
            self.stats.record_eviction();
            evicted += 1;
        }
        self.stats.set_total_entries(self.map.len());
        evicted
    }
}

// == Memory Cache ==
/// Fixed-capacity in-memory LRU cache.
#[derive(Debug)]
pub struct MemoryCache {
    state: Mutex<LruState>,
    capacity: AtomicUsize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a memory cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            capacity: AtomicUsize::new(capacity),
        }
    }

    // == Lookup ==
    /// Returns the value and marks the entry most recently used.
    pub fn lookup(&self, key: CacheKey) -> Option<Bytes> {
        let mut state = self.state.lock();
        let Some(id) = state.map.get(&key).copied() else {
            state.stats.record_miss();
            return None;
        };
        state.list.move_to_front(id);
        let value = state.list.get(id).map(|node| node.value.clone());
        match value {
            Some(_) => state.stats.record_hit(),
            None => state.stats.record_miss(),
        }
        value
    }

    // == Insert ==
    /// Stores a value, then evicts down to capacity.
    ///
    /// An existing key is only touched: its stored bytes are kept as they
    /// were. Purge first to replace a payload.
    pub fn insert(&self, key: CacheKey, value: Bytes) {
        let capacity = self.capacity();
        let mut state = self.state.lock();
        if let Some(id) = state.map.get(&key).copied() {
            state.list.move_to_front(id);
            return;
        }
        let id = state.list.append(key, value);
        state.map.insert(key, id);
        let evicted = state.evict_to(capacity);
        if evicted > 0 {
            debug!(key = %key, evicted, "Memory tier evicted entries");
        }
    }

    // == Prune ==
    /// Runs an eviction pass against the current capacity.
    ///
    /// Returns the number of evicted entries.
    pub fn prune(&self) -> usize {
        let capacity = self.capacity();
        self.state.lock().evict_to(capacity)
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.list.remove_all();
        state.map.clear();
        state.stats.set_total_entries(0);
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Changes the capacity. The next save or clean evicts down to it.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    // == Introspection ==
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks presence without touching recency or stats.
    pub fn contains(&self, key: CacheKey) -> bool {
        self.state.lock().map.contains_key(&key)
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.state.lock().list.keys().copied().collect()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.map.len());
        stats
    }

    // == Memory Pressure ==
    /// Purges this cache whenever `pressure` fires.
    ///
    /// The subscription holds only a weak reference; it ends when the cache
    /// is dropped or when the returned handle is dropped.
    pub fn purge_on_pressure(self: &Arc<Self>, pressure: &MemoryPressure) -> PressureSubscription {
        let cache = Arc::downgrade(self);
        pressure.register(move || match cache.upgrade() {
            Some(cache) => {
                info!("Low memory signal received, purging memory tier");
                cache.clear();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: CacheKey) -> Option<Bytes> {
        self.lookup(key)
    }

    fn save(&self, key: CacheKey, value: Bytes) {
        self.insert(key, value);
    }

    fn clean(&self) {
        self.prune();
    }

    fn purge(&self) {
        self.clear();
    }
}
