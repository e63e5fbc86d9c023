//! Tiered Cache - a two-tier content cache
//!
//! A bounded in-memory LRU tier in front of a TTL-expiring disk tier, keyed
//! by a stable hash of a resource identifier, plus an HTTP service over it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheKey, DiskCache, DiskCacheConfig, MemoryCache, TieredCache};
pub use config::Config;
pub use tasks::spawn_clean_task;
