//! # Infrastructure Layer
//!
//! Adapters to the outside world and the concurrency substrate.
//!
//! - [`concurrency`]: worker pool and request context propagation
//! - [`downstream`]: region, dealer and manufacturer provider clients

pub mod concurrency;
pub mod downstream;
