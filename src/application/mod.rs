//! # Application Layer
//!
//! Use-case orchestration on top of the domain and infrastructure layers.
//!
//! - [`query`]: validated request input
//! - [`services`]: the aggregation engine and ranking strategies
//! - [`error`]: errors surfaced to callers

pub mod error;
pub mod query;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use query::OfferQuery;
pub use services::{AggregationReport, OfferAggregationEngine};
