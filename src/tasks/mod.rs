//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is live.
//!
//! # Tasks
//! - Clean: evicts the memory tier to capacity and removes expired disk entries

mod cleanup;

pub use cleanup::spawn_clean_task;
