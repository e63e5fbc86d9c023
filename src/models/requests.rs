//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming JSON request bodies. Payloads for
//! `PUT /cache/:id` are raw bytes and have no DTO.

use serde::Deserialize;

/// Request body for PUT /capacity
#[derive(Debug, Clone, Deserialize)]
pub struct CapacityRequest {
    /// New memory tier capacity in entries
    pub capacity: usize,
}

impl CapacityRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.capacity == 0 {
            return Some("Capacity must be at least 1".to_string());
        }
        None
    }
}
