//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::cache::{Cache, CacheKey, TieredCache, MAX_IDENTIFIER_LENGTH};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CapacityRequest, CapacityResponse, HealthResponse, MaintenanceResponse, SaveResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared two-tier cache
    pub cache: Arc<TieredCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: TieredCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(TieredCache::from_config(config))
    }
}

fn validate_identifier(identifier: &str) -> Result<CacheKey> {
    if identifier.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Identifier cannot be empty".to_string(),
        ));
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Identifier exceeds maximum length of {} bytes",
            MAX_IDENTIFIER_LENGTH
        )));
    }
    Ok(CacheKey::from_identifier(identifier))
}

/// Handler for GET /cache/:id
///
/// Returns the raw payload, checking memory first and then disk.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Response> {
    let key = validate_identifier(&identifier)?;
    let payload = state
        .cache
        .get(key)
        .await
        .ok_or(CacheError::NotFound(identifier))?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        payload,
    )
        .into_response())
}

/// Handler for PUT /cache/:id
///
/// Saves the request body to both tiers. The disk write completes in the
/// background.
pub async fn save_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    body: Bytes,
) -> Result<Json<SaveResponse>> {
    let key = validate_identifier(&identifier)?;
    let size = body.len();
    state.cache.save(key, body);

    Ok(Json(SaveResponse::new(identifier, key, size)))
}

/// Handler for POST /clean
pub async fn clean_handler(State(state): State<AppState>) -> Json<MaintenanceResponse> {
    state.cache.clean();
    Json(MaintenanceResponse::new("clean"))
}

/// Handler for POST /purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<MaintenanceResponse> {
    state.cache.purge();
    info!("Cache purged via API");
    Json(MaintenanceResponse::new("purge"))
}

/// Handler for PUT /capacity
///
/// Resizes the memory tier and evicts down to the new bound.
pub async fn capacity_handler(
    State(state): State<AppState>,
    Json(req): Json<CapacityRequest>,
) -> Result<Json<CapacityResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let memory = state.cache.memory();
    memory.set_capacity(req.capacity);
    let evicted = memory.prune();
    info!(capacity = req.capacity, evicted, "Memory tier resized");

    Ok(Json(CapacityResponse::new(req.capacity, evicted)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let memory = state.cache.memory();
    Json(StatsResponse::new(
        memory.stats(),
        memory.capacity(),
        state.cache.disk().stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
