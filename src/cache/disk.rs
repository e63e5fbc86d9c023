//! Disk Cache Module
//!
//! TTL-expiring tier: one file per key under a cache directory, named by the
//! key's decimal form and holding the raw payload. The file's modification
//! time is the write timestamp; there is no metadata sidecar.
//!
//! Reads are `async`. Saves, cleans and purges run on background tasks and
//! return to the caller immediately. Outside a Tokio runtime they fall back
//! to the runtime the cache was built in, or else to a dedicated thread.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::runtime::{Builder, Handle};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheKey, DiskStats, DiskStatsSnapshot};
use crate::config::{default_cache_dir, Config, DEFAULT_DISK_TTL};
use crate::error::{CacheError, Result};

// == Disk Cache Config ==
#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    /// Root directory holding one file per key
    pub directory: PathBuf,
    /// Age after which an entry reads as absent
    pub ttl: Duration,
}

impl DiskCacheConfig {
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.cache_dir, Duration::from_secs(config.disk_ttl))
    }
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self::new(default_cache_dir(), Duration::from_secs(DEFAULT_DISK_TTL))
    }
}

/// Outcome of a single file lookup.
enum Lookup {
    Fresh(Bytes),
    Expired,
    Missing,
}

#[derive(Debug)]
struct DiskInner {
    config: DiskCacheConfig,
    stats: DiskStats,
    tasks: TaskTracker,
    directory_ready: AtomicBool,
    /// Runtime current at construction, used by callers outside any runtime
    runtime: Option<Handle>,
}

// == Disk Cache ==
/// File-per-key cache with time-based expiry.
///
/// Cloning is cheap and shares the directory, stats and background tasks.
#[derive(Debug, Clone)]
pub struct DiskCache {
    inner: Arc<DiskInner>,
}

impl DiskCache {
    // == Constructor ==
    /// Creates a disk cache. The directory is created lazily.
    pub fn new(config: DiskCacheConfig) -> Self {
        Self {
            inner: Arc::new(DiskInner {
                config,
                stats: DiskStats::new(),
                tasks: TaskTracker::new(),
                directory_ready: AtomicBool::new(false),
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.inner.config.directory
    }

    pub fn ttl(&self) -> Duration {
        self.inner.config.ttl
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: CacheKey) -> PathBuf {
        self.directory().join(key.to_string())
    }

    // == Freshness ==
    /// An entry is fresh while its modification time is after `now - ttl`.
    ///
    /// Modification times at or before that instant are expired.
    pub fn is_fresh(&self, modified: SystemTime, now: SystemTime) -> bool {
        match now.checked_sub(self.ttl()) {
            Some(expire_instant) => modified > expire_instant,
            None => true,
        }
    }

    pub fn stats(&self) -> DiskStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Number of background operations still running.
    pub fn pending(&self) -> usize {
        self.inner.tasks.len()
    }

    // == Flush ==
    /// Waits for every background save, clean and purge issued so far.
    pub async fn flush(&self) {
        let tasks = &self.inner.tasks;
        tasks.close();
        tasks.wait().await;
        tasks.reopen();
    }

    // == Read ==
    /// Reads a fresh entry.
    ///
    /// Missing and expired entries resolve to `Ok(None)`.
    pub async fn read(&self, key: CacheKey) -> Result<Option<Bytes>> {
        self.ensure_directory().await;
        let stats = &self.inner.stats;
        match self.read_entry(key).await {
            Ok(Lookup::Fresh(data)) => {
                debug!(key = %key, bytes = data.len(), "Disk tier hit");
                stats.record_hit();
                Ok(Some(data))
            }
            Ok(Lookup::Expired) => {
                debug!(key = %key, "Disk tier entry expired");
                stats.record_expired();
                Ok(None)
            }
            Ok(Lookup::Missing) => {
                stats.record_miss();
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Disk tier read failed");
                stats.record_io_error();
                stats.record_miss();
                Err(e)
            }
        }
    }

    async fn read_entry(&self, key: CacheKey) -> Result<Lookup> {
        let path = self.path_for(key);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Lookup::Missing),
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        if !metadata.is_file() {
            return Ok(Lookup::Missing);
        }
        let modified = metadata
            .modified()
            .map_err(|e| CacheError::io(&path, e))?;
        if !self.is_fresh(modified, SystemTime::now()) {
            return Ok(Lookup::Expired);
        }
        match fs::read(&path).await {
            Ok(data) => Ok(Lookup::Fresh(Bytes::from(data))),
            // Removed between the metadata check and the read
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Lookup::Missing),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    // == Write ==
    /// Replaces the file for `key` with `value`.
    ///
    /// Any existing file is removed first (best-effort); the write itself is
    /// not atomic.
    pub async fn write(&self, key: CacheKey, value: Bytes) -> Result<()> {
        let result = self.write_entry(key, &value).await;
        match &result {
            Ok(()) => {
                debug!(key = %key, bytes = value.len(), "Disk tier write");
                self.inner.stats.record_write();
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Disk tier write failed");
                self.inner.stats.record_io_error();
            }
        }
        result
    }

    async fn write_entry(&self, key: CacheKey, value: &[u8]) -> Result<()> {
        let directory = self.directory();
        fs::create_dir_all(directory)
            .await
            .map_err(|e| CacheError::io(directory, e))?;
        self.inner.directory_ready.store(true, Ordering::Release);
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Could not remove previous entry"),
        }
        fs::write(&path, value)
            .await
            .map_err(|e| CacheError::io(&path, e))
    }

    // == Remove Expired ==
    /// Deletes every file that is no longer fresh.
    ///
    /// Per-file failures are logged and skipped. Returns the number of files
    /// removed.
    pub async fn remove_expired(&self) -> Result<usize> {
        let now = SystemTime::now();
        let (files, _) = self.walk().await?;
        let mut removed = 0;

        for path in files {
            let modified = match fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    self.record_skip(&path, &e);
                    continue;
                }
            };
            if self.is_fresh(modified, now) {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => self.record_skip(&path, &e),
            }
        }

        self.inner.stats.record_removed(removed);
        if removed > 0 {
            info!(removed, "Disk tier clean removed expired entries");
        } else {
            debug!("Disk tier clean found no expired entries");
        }
        Ok(removed)
    }

    // == Remove All ==
    /// Deletes every file under the directory, then any emptied
    /// subdirectories. The root directory itself is kept.
    pub async fn remove_all(&self) -> Result<usize> {
        let (files, directories) = self.walk().await?;
        let mut removed = 0;

        for path in files {
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => self.record_skip(&path, &e),
            }
        }
        for path in directories.iter().rev() {
            if let Err(e) = fs::remove_dir(path).await {
                self.record_skip(path, &e);
            }
        }

        self.inner.stats.record_removed(removed);
        info!(removed, "Disk tier purged");
        Ok(removed)
    }

    // == Internal Helpers ==
    /// Creates the directory the first time it is needed.
    ///
    /// Failure is logged; lookups then simply miss.
    async fn ensure_directory(&self) {
        if self.inner.directory_ready.load(Ordering::Acquire) {
            return;
        }
        let directory = self.directory();
        match fs::create_dir_all(directory).await {
            Ok(()) => self.inner.directory_ready.store(true, Ordering::Release),
            Err(e) => {
                warn!(path = %directory.display(), error = %e, "Could not create cache directory");
                self.inner.stats.record_io_error();
            }
        }
    }

    /// Lists files and subdirectories below the root, parents before children.
    ///
    /// A missing root is empty. Unreadable subdirectories are skipped.
    async fn walk(&self) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let root = self.directory();
        let mut files = Vec::new();
        let mut directories = Vec::new();

        let mut pending = match fs::read_dir(root).await {
            Ok(entries) => vec![entries],
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((files, directories)),
            Err(e) => {
                self.inner.stats.record_io_error();
                return Err(CacheError::io(root, e));
            }
        };

        while let Some(mut entries) = pending.pop() {
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        self.record_skip(root, &e);
                        break;
                    }
                };
                let path = entry.path();
                match entry.file_type().await {
                    Ok(kind) if kind.is_dir() => match fs::read_dir(&path).await {
                        Ok(children) => {
                            directories.push(path);
                            pending.push(children);
                        }
                        Err(e) => self.record_skip(&path, &e),
                    },
                    Ok(_) => files.push(path),
                    Err(e) => self.record_skip(&path, &e),
                }
            }
        }

        Ok((files, directories))
    }

    fn record_skip(&self, path: &Path, error: &std::io::Error) {
        warn!(path = %path.display(), error = %error, "Disk tier skipped entry");
        self.inner.stats.record_io_error();
    }

    /// Runs `task` off the calling thread, tracked for [`flush`](Self::flush).
    ///
    /// Prefers the current runtime, then the one captured at construction.
    /// With neither, a dedicated thread drives the task to completion.
    fn spawn_background<F>(&self, operation: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let tracked = self.inner.tasks.track_future(task);
        let runtime = Handle::try_current()
            .ok()
            .or_else(|| self.inner.runtime.clone());
        if let Some(handle) = runtime {
            handle.spawn(tracked);
            return;
        }

        debug!(operation, "No Tokio runtime, running disk operation on its own thread");
        let spawned = std::thread::Builder::new()
            .name(format!("disk-cache-{operation}"))
            .spawn(move || match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(tracked),
                Err(e) => warn!(operation, error = %e, "Could not start runtime, disk operation dropped"),
            });
        if let Err(e) = spawned {
            warn!(operation, error = %e, "Could not spawn disk thread, disk operation dropped");
        }
    }
}

#[async_trait]
impl Cache for DiskCache {
    async fn get(&self, key: CacheKey) -> Option<Bytes> {
        // Failures are already logged and counted by `read`
        self.read(key).await.ok().flatten()
    }

    fn save(&self, key: CacheKey, value: Bytes) {
        let disk = self.clone();
        self.spawn_background("save", async move {
            disk.write(key, value).await.ok();
        });
    }

    fn clean(&self) {
        let disk = self.clone();
        self.spawn_background("clean", async move {
            disk.remove_expired().await.ok();
        });
    }

    fn purge(&self) {
        let disk = self.clone();
        self.spawn_background("purge", async move {
            disk.remove_all().await.ok();
        });
    }
}
