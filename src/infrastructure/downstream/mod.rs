//! # Downstream Providers
//!
//! Clients for the external data providers queried during aggregation.
//!
//! # Modules
//!
//! - [`traits`]: [`RegionClient`], [`DealerClient`], [`ManufacturerClient`] ports
//! - [`error`]: downstream error types
//! - [`http_client`]: shared reqwest wrapper with trace headers
//! - [`responses`]: wire types and their domain conversions
//! - [`http`]: [`HttpDownstream`] adapter for the provider HTTP API
//! - [`in_memory`]: [`InMemoryDownstream`] programmable test double

pub mod error;
pub mod http;
pub mod http_client;
pub mod in_memory;
pub mod responses;
pub mod traits;

pub use error::{DownstreamError, DownstreamResult};
pub use http::{HttpDownstream, HttpDownstreamConfig};
pub use in_memory::{DownstreamCall, InMemoryDownstream};
pub use traits::{DealerClient, DownstreamClients, ManufacturerClient, RegionClient};
