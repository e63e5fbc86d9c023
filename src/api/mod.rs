//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `GET /cache/:id` - Fetch a payload by resource identifier
//! - `PUT /cache/:id` - Store a payload
//! - `POST /clean` - Run a clean pass on both tiers
//! - `POST /purge` - Empty both tiers
//! - `PUT /capacity` - Resize the memory tier
//! - `GET /stats` - Per-tier statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
