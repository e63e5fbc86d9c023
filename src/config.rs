//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default number of entries held by the memory tier.
pub const DEFAULT_MEMORY_CAPACITY: usize = 50;

/// Default disk TTL in seconds (24 hours).
pub const DEFAULT_DISK_TTL: u64 = 60 * 60 * 24;

/// Subfolder appended to the platform cache directory.
pub const CACHE_SUBFOLDER: &str = "tiered_cache";

/// Cache and service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the memory tier can hold
    pub memory_capacity: usize,
    /// Age in seconds after which a disk entry is stale
    pub disk_ttl: u64,
    /// Root directory of the disk tier
    pub cache_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Background clean task interval in seconds
    pub clean_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_CAPACITY` - Memory tier entry count (default: 50)
    /// - `DISK_TTL` - Disk entry TTL in seconds (default: 86400)
    /// - `CACHE_DIR` - Disk tier root (default: platform cache dir + `tiered_cache`)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEAN_INTERVAL` - Clean frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self {
            memory_capacity: parse_var("MEMORY_CAPACITY").unwrap_or(DEFAULT_MEMORY_CAPACITY),
            disk_ttl: parse_var("DISK_TTL").unwrap_or(DEFAULT_DISK_TTL),
            cache_dir: env::var_os("CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_cache_dir),
            server_port: parse_var("SERVER_PORT").unwrap_or(3000),
            clean_interval: parse_var("CLEAN_INTERVAL").unwrap_or(3600),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            disk_ttl: DEFAULT_DISK_TTL,
            cache_dir: default_cache_dir(),
            server_port: 3000,
            clean_interval: 3600,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Returns the platform cache directory joined with [`CACHE_SUBFOLDER`].
///
/// Resolution order: `$XDG_CACHE_HOME`, `$HOME/.cache`, then the system temp dir.
pub fn default_cache_dir() -> PathBuf {
    let base = env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".cache"))
        })
        .unwrap_or_else(env::temp_dir);
    base.join(CACHE_SUBFOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.memory_capacity, 50);
        assert_eq!(config.disk_ttl, 86_400);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.clean_interval, 3600);
        assert!(config.cache_dir.ends_with(CACHE_SUBFOLDER));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MEMORY_CAPACITY");
        env::remove_var("DISK_TTL");
        env::remove_var("CACHE_DIR");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEAN_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.memory_capacity, 50);
        assert_eq!(config.disk_ttl, 86_400);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.clean_interval, 3600);
        assert_eq!(config.cache_dir, default_cache_dir());
    }
}
