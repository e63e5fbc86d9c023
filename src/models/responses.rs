//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::{CacheKey, CacheStats, DiskStatsSnapshot};

/// Response body for PUT /cache/:id
#[derive(Debug, Clone, Serialize)]
pub struct SaveResponse {
    /// Success message
    pub message: String,
    /// The identifier as received
    pub identifier: String,
    /// Derived key, also the disk file name
    pub key: String,
    /// Payload size in bytes
    pub size: usize,
}

impl SaveResponse {
    /// Creates a new SaveResponse
    pub fn new(identifier: impl Into<String>, key: CacheKey, size: usize) -> Self {
        let identifier = identifier.into();
        Self {
            message: format!("'{}' saved", identifier),
            identifier,
            key: key.to_string(),
            size,
        }
    }
}

/// Response body for POST /clean and POST /purge
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    /// Success message
    pub message: String,
    /// Operation name
    pub operation: String,
}

impl MaintenanceResponse {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self {
            message: format!("{} started", operation),
            operation,
        }
    }
}

/// Response body for PUT /capacity
#[derive(Debug, Clone, Serialize)]
pub struct CapacityResponse {
    /// Capacity now in effect
    pub capacity: usize,
    /// Entries evicted to reach it
    pub evicted: usize,
}

impl CapacityResponse {
    pub fn new(capacity: usize, evicted: usize) -> Self {
        Self { capacity, evicted }
    }
}

/// Memory tier section of [`StatsResponse`]
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_entries: usize,
    pub capacity: usize,
    pub hit_rate: f64,
}

/// Disk tier section of [`StatsResponse`]
#[derive(Debug, Clone, Serialize)]
pub struct DiskStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub writes: u64,
    pub removed: u64,
    pub io_errors: u64,
    pub hit_rate: f64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub memory: MemoryStatsResponse,
    pub disk: DiskStatsResponse,
}

impl StatsResponse {
    /// Creates a new StatsResponse from both tiers' statistics
    pub fn new(memory: CacheStats, capacity: usize, disk: DiskStatsSnapshot) -> Self {
        Self {
            memory: MemoryStatsResponse {
                hit_rate: memory.hit_rate(),
                hits: memory.hits,
                misses: memory.misses,
                evictions: memory.evictions,
                total_entries: memory.total_entries,
                capacity,
            },
            disk: DiskStatsResponse {
                hit_rate: disk.hit_rate(),
                hits: disk.hits,
                misses: disk.misses,
                expired: disk.expired,
                writes: disk.writes,
                removed: disk.removed,
                io_errors: disk.io_errors,
            },
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
