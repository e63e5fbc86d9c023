//! Tiered Cache Module
//!
//! Composes a fast tier and a backing tier behind the [`Cache`] contract.
//! Lookups fall through from the first to the second, and hits in the
//! second are promoted into the first.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::cache::{Cache, CacheKey, DiskCache, DiskCacheConfig, MemoryCache};
use crate::config::Config;

static SHARED: OnceCell<Arc<TieredCache>> = OnceCell::new();

// == Tiered Cache ==
/// Memory tier in front of a disk tier.
///
/// Both tiers are injected at construction; any [`Cache`] implementation,
/// including `dyn Cache`, can stand in for either.
#[derive(Debug)]
pub struct TieredCache<M: ?Sized = MemoryCache, D: ?Sized = DiskCache> {
    memory: Arc<M>,
    disk: Arc<D>,
}

impl<M: ?Sized, D: ?Sized> Clone for TieredCache<M, D> {
    fn clone(&self) -> Self {
        Self {
            memory: self.memory.clone(),
            disk: self.disk.clone(),
        }
    }
}

impl<M: Cache, D: Cache> TieredCache<M, D> {
    // == Constructor ==
    pub fn new(memory: M, disk: D) -> Self {
        Self::from_shared(Arc::new(memory), Arc::new(disk))
    }
}

impl<M: Cache + ?Sized, D: Cache + ?Sized> TieredCache<M, D> {
    /// Builds over tiers that are also held elsewhere.
    pub fn from_shared(memory: Arc<M>, disk: Arc<D>) -> Self {
        Self { memory, disk }
    }

    pub fn memory(&self) -> &Arc<M> {
        &self.memory
    }

    pub fn disk(&self) -> &Arc<D> {
        &self.disk
    }

    // == Identifier Helpers ==
    /// Looks up a payload by resource identifier.
    pub async fn get_identifier(&self, identifier: &str) -> Option<Bytes> {
        self.get(CacheKey::from_identifier(identifier)).await
    }

    /// Saves a payload by resource identifier.
    pub fn save_identifier(&self, identifier: &str, value: Bytes) {
        self.save(CacheKey::from_identifier(identifier), value);
    }
}

impl TieredCache {
    /// Builds the default memory and disk tiers from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MemoryCache::new(config.memory_capacity),
            DiskCache::new(DiskCacheConfig::from_config(config)),
        )
    }

    // == Shared Instance ==
    /// Process-wide cache built from the environment on first use.
    ///
    /// Convenience only: nothing in this crate depends on it, and it lives
    /// until the process exits.
    pub fn shared() -> Arc<TieredCache> {
        SHARED
            .get_or_init(|| Arc::new(TieredCache::from_config(&Config::from_env())))
            .clone()
    }
}

#[async_trait]
impl<M: Cache + ?Sized, D: Cache + ?Sized> Cache for TieredCache<M, D> {
    async fn get(&self, key: CacheKey) -> Option<Bytes> {
        if let Some(value) = self.memory.get(key).await {
            debug!(key = %key, "Memory tier hit");
            return Some(value);
        }
        let value = self.disk.get(key).await?;
        debug!(key = %key, "Promoting disk hit into memory tier");
        self.memory.save(key, value.clone());
        Some(value)
    }

    /// Writes to both tiers. There is no rollback if one of them fails.
    fn save(&self, key: CacheKey, value: Bytes) {
        self.memory.save(key, value.clone());
        self.disk.save(key, value);
    }

    fn clean(&self) {
        self.memory.clean();
        self.disk.clean();
    }

    /// Empties the memory tier now and the disk tier in the background.
    fn purge(&self) {
        self.memory.purge();
        self.disk.purge();
    }
}
