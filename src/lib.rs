//! # Vehicle Offers
//!
//! Concurrent aggregation of the cheapest vehicle offers in a region.
//!
//! A request names a region and optional body and fuel type filters. The
//! engine looks up the region, fans out to every dealer listed there, and
//! for each matching vehicle fetches the manufacturer price and, when that
//! price exceeds the region's limit and the region has a rule for the
//! vehicle's fuel type, the regional discount. Dealer overhead is added on
//! top. Offers are ranked cheapest first.
//!
//! # Architecture
//!
//! - [`domain`]: entities, value objects and the pricing formula
//! - [`application`]: query validation, aggregation engine, ranking
//! - [`infrastructure`]: worker pool, request context, downstream clients
//! - [`api`]: axum REST surface
//! - [`settings`] and [`telemetry`]: process configuration and logging
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vehicle_offers::application::{OfferAggregationEngine, OfferQuery};
//! use vehicle_offers::infrastructure::concurrency::{PoolConfig, WorkerPool};
//! use vehicle_offers::infrastructure::downstream::{DownstreamClients, InMemoryDownstream};
//!
//! # tokio_test::block_on(async {
//! let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
//! let pool = WorkerPool::new(PoolConfig::default()).unwrap();
//! let engine = OfferAggregationEngine::with_defaults(DownstreamClients::from_shared(downstream), pool);
//!
//! let query = OfferQuery::parse("CA", None, Some("ELECTRIC"), Some(1)).unwrap();
//! let offers = engine.cheapest_offers(&query).await.unwrap();
//! assert_eq!(offers.len(), 1);
//! # });
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod settings;
pub mod telemetry;
