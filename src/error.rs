//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.
//!
//! Errors never cross the [`Cache`](crate::cache::Cache) contract: the tiers
//! log them and degrade to cache-miss behavior. They are surfaced only by the
//! awaited disk operations and by the HTTP service.

use std::path::{Path, PathBuf};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Identifier not present in any tier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// File system failure on a cache path
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Io { .. } | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
