//! # REST API
//!
//! REST endpoints using axum.
//!
//! # Endpoints
//!
//! ## Offers
//! - `GET /api/v1/regions/{region_code}/offers` - Cheapest offers in a region.
//!   Optional query parameters: `bodyType`, `fullType`, `maxResults` (0 to 20,
//!   default 3).
//!
//! ## Health
//! - `GET /api/v1/health` - Health check with worker pool gauges
//!
//! Every response carries an `x-trace-id` header. A valid inbound
//! `x-trace-id` is continued instead of starting a new trace.
//!
//! # Usage
//!
//! ```ignore
//! use vehicle_offers::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = AppState::new(Arc::new(engine));
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, ErrorResponse, HealthResponse, OfferParams};
pub use routes::{create_router, request_context};
