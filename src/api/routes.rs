//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    capacity_handler, clean_handler, get_handler, health_handler, purge_handler, save_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache/:id` - Fetch a payload
/// - `PUT /cache/:id` - Store a payload in both tiers
/// - `POST /clean` - Evict to capacity and drop expired disk entries
/// - `POST /purge` - Empty both tiers
/// - `PUT /capacity` - Resize the memory tier
/// - `GET /stats` - Per-tier statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache/*id", get(get_handler).put(save_handler))
        .route("/clean", post(clean_handler))
        .route("/purge", post(purge_handler))
        .route("/capacity", put(capacity_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
