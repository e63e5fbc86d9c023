//! Integration Tests for the Tiered Cache
//!
//! Exercises the memory and disk tiers together through the public API,
//! using temporary directories for disk state.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use tempfile::TempDir;
use tiered_cache::cache::MemoryPressure;
use tiered_cache::{Cache, CacheKey, DiskCache, DiskCacheConfig, MemoryCache, TieredCache};

// == Helper Functions ==

fn tiered(dir: &TempDir, capacity: usize, ttl: Duration) -> TieredCache {
    TieredCache::new(
        MemoryCache::new(capacity),
        DiskCache::new(DiskCacheConfig::new(dir.path(), ttl)),
    )
}

fn backdate(path: &Path, age: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

fn key(name: &str) -> CacheKey {
    CacheKey::from_identifier(name)
}

// == Scenarios ==

#[tokio::test]
async fn test_capacity_two_eviction_scenario() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 2, Duration::from_secs(300));
    let memory = cache.memory();

    cache.save(key("A"), Bytes::from_static(b"a"));
    cache.save(key("B"), Bytes::from_static(b"b"));
    cache.save(key("C"), Bytes::from_static(b"c"));

    assert!(!memory.contains(key("A")));
    assert!(memory.lookup(key("B")).is_some());
    assert!(memory.lookup(key("C")).is_some());

    memory.lookup(key("B"));
    cache.save(key("D"), Bytes::from_static(b"d"));

    assert!(!memory.contains(key("C")));
    assert!(memory.contains(key("B")));
    assert!(memory.contains(key("D")));
}

#[tokio::test]
async fn test_evicted_entry_is_served_from_disk() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 1, Duration::from_secs(300));

    cache.save(key("first"), Bytes::from_static(b"1"));
    cache.save(key("second"), Bytes::from_static(b"2"));
    cache.disk().flush().await;
    assert!(!cache.memory().contains(key("first")));

    assert_eq!(cache.get(key("first")).await, Some(Bytes::from_static(b"1")));
    // Promotion pushed "second" out of the one-slot memory tier
    assert!(cache.memory().contains(key("first")));
    assert!(!cache.memory().contains(key("second")));
}

#[tokio::test]
async fn test_disk_ttl_scenario() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 10, Duration::from_secs(1));
    let x = key("X");

    cache.save(x, Bytes::from_static(b"hello"));
    cache.disk().flush().await;
    cache.memory().clear();

    // Within TTL
    assert_eq!(cache.get(x).await, Some(Bytes::from_static(b"hello")));

    // Past TTL: absent even though the file is still there
    cache.memory().clear();
    let path = cache.disk().path_for(x);
    backdate(&path, Duration::from_secs(2));
    assert_eq!(cache.get(x).await, None);
    assert!(path.exists());
    assert!(!cache.memory().contains(x), "stale data must not be promoted");

    cache.clean();
    cache.disk().flush().await;
    assert!(!path.exists());
}

#[tokio::test]
async fn test_purge_then_get_is_absent() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 10, Duration::from_secs(300));
    for name in ["a", "b", "c"] {
        cache.save(key(name), Bytes::from_static(b"v"));
    }
    cache.disk().flush().await;

    cache.purge();
    assert_eq!(cache.memory().len(), 0);
    cache.disk().flush().await;

    for name in ["a", "b", "c"] {
        assert_eq!(cache.get(key(name)).await, None);
    }
}

#[tokio::test]
async fn test_resave_updates_disk_but_not_cached_memory_bytes() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 10, Duration::from_secs(300));

    cache.save(key("k"), Bytes::from_static(b"old"));
    cache.save(key("k"), Bytes::from_static(b"new"));
    cache.disk().flush().await;

    assert_eq!(cache.get(key("k")).await, Some(Bytes::from_static(b"old")));
    assert_eq!(
        cache.disk().read(key("k")).await.unwrap(),
        Some(Bytes::from_static(b"new"))
    );

    // Purging memory exposes the newer bytes
    cache.memory().clear();
    assert_eq!(cache.get(key("k")).await, Some(Bytes::from_static(b"new")));
}

#[tokio::test]
async fn test_entries_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let cache = tiered(&dir, 10, Duration::from_secs(300));
        cache.save_identifier("https://example.com/a.gif", Bytes::from_static(b"GIF89a"));
        cache.disk().flush().await;
    }

    let reopened = tiered(&dir, 10, Duration::from_secs(300));
    assert_eq!(
        reopened.get_identifier("https://example.com/a.gif").await,
        Some(Bytes::from_static(b"GIF89a"))
    );
}

#[tokio::test]
async fn test_low_memory_purges_memory_only() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 10, Duration::from_secs(300));
    let pressure = MemoryPressure::new();
    let _subscription = cache.memory().purge_on_pressure(&pressure);

    cache.save(key("a"), Bytes::from_static(b"1"));
    cache.disk().flush().await;
    pressure.notify();

    for _ in 0..100 {
        if cache.memory().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(cache.memory().is_empty());
    assert_eq!(cache.get(key("a")).await, Some(Bytes::from_static(b"1")));
}

#[tokio::test]
async fn test_concurrent_callers() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(tiered(&dir, 8, Duration::from_secs(300)));

    let tasks: Vec<_> = (0..16u64)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let k = CacheKey::from_raw(i);
                cache.save(k, Bytes::from(i.to_be_bytes().to_vec()));
                cache.get(k).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    cache.disk().flush().await;

    assert!(cache.memory().len() <= 8);
    for i in 0..16u64 {
        assert_eq!(
            cache.get(CacheKey::from_raw(i)).await,
            Some(Bytes::from(i.to_be_bytes().to_vec()))
        );
    }
}

#[tokio::test]
async fn test_save_from_plain_thread_survives_eviction() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(tiered(&dir, 1, Duration::from_secs(300)));

    let writer = cache.clone();
    std::thread::spawn(move || writer.save(key("one"), Bytes::from_static(b"one")))
        .join()
        .unwrap();
    cache.disk().flush().await;

    cache.save(key("two"), Bytes::from_static(b"two"));
    cache.disk().flush().await;
    assert!(!cache.memory().contains(key("one")));

    assert_eq!(cache.get(key("one")).await, Some(Bytes::from_static(b"one")));
    assert!(cache.disk().path_for(key("one")).exists());
}

#[test]
fn test_save_outside_runtime_reaches_disk() {
    let dir = TempDir::new().unwrap();
    let cache = tiered(&dir, 1, Duration::from_secs(300));

    cache.save(key("one"), Bytes::from_static(b"one"));
    cache.save(key("two"), Bytes::from_static(b"two"));
    tokio_test::block_on(cache.disk().flush());

    assert!(!cache.memory().contains(key("one")));
    assert_eq!(
        tokio_test::block_on(cache.get(key("one"))),
        Some(Bytes::from_static(b"one"))
    );
}

#[test]
fn test_shared_instance_is_singleton() {
    let first = TieredCache::shared();
    let second = TieredCache::shared();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_dyn_tiers() {
    let dir = TempDir::new().unwrap();
    let memory: Arc<dyn Cache> = Arc::new(MemoryCache::new(4));
    let disk: Arc<dyn Cache> = Arc::new(DiskCache::new(DiskCacheConfig::new(
        dir.path(),
        Duration::from_secs(60),
    )));
    let cache = TieredCache::from_shared(memory, disk);

    cache.save(key("dyn"), Bytes::from_static(b"ok"));
    assert_eq!(cache.get(key("dyn")).await, Some(Bytes::from_static(b"ok")));
}
