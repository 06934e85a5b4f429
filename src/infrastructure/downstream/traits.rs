//! # Downstream Client Traits
//!
//! Port definitions for the external data providers the aggregation fans
//! out to. Each call is one request and one response with no retries.
//!
//! # Examples
//!
//! ```ignore
//! use vehicle_offers::infrastructure::downstream::traits::ManufacturerClient;
//!
//! struct FixedPrice;
//!
//! #[async_trait::async_trait]
//! impl ManufacturerClient for FixedPrice {
//!     async fn vehicle_price(&self, _id: VehicleId) -> DownstreamResult<i64> {
//!         Ok(25_000)
//!     }
//! }
//! ```

use crate::domain::entities::{Dealer, DealerSummary, Region};
use crate::domain::value_objects::{DealerId, FullType, Percent, RegionCode, VehicleId};
use crate::infrastructure::downstream::error::DownstreamResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Region catalog: region details, dealer lists and discount schedules.
#[async_trait]
pub trait RegionClient: Send + Sync + fmt::Debug {
    /// Fetches a region with its price limit and discount rules.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError::NotFound` for an unknown region.
    async fn region_info(&self, code: &RegionCode) -> DownstreamResult<Region>;

    /// Lists the dealers operating in a region.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError` if the lookup fails.
    async fn dealers_in_region(&self, code: &RegionCode) -> DownstreamResult<Vec<DealerSummary>>;

    /// Fetches the discount percent for a full type in a region.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError` if the lookup fails or no rule exists.
    async fn discount_percent(
        &self,
        code: &RegionCode,
        full_type: FullType,
    ) -> DownstreamResult<Percent>;
}

/// Dealer inventory provider.
#[async_trait]
pub trait DealerClient: Send + Sync + fmt::Debug {
    /// Fetches a dealer with its overhead and vehicles.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError::NotFound` for an unknown dealer.
    async fn dealer_detail(&self, id: DealerId) -> DownstreamResult<Dealer>;
}

/// Manufacturer price catalog.
#[async_trait]
pub trait ManufacturerClient: Send + Sync + fmt::Debug {
    /// Fetches the base price of a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError` if the lookup fails.
    async fn vehicle_price(&self, id: VehicleId) -> DownstreamResult<i64>;
}

/// The set of providers one aggregation talks to.
#[derive(Debug, Clone)]
pub struct DownstreamClients {
    /// Region catalog.
    pub regions: Arc<dyn RegionClient>,
    /// Dealer inventory.
    pub dealers: Arc<dyn DealerClient>,
    /// Manufacturer prices.
    pub manufacturers: Arc<dyn ManufacturerClient>,
}

impl DownstreamClients {
    /// Bundles separate provider clients.
    #[must_use]
    pub fn new(
        regions: Arc<dyn RegionClient>,
        dealers: Arc<dyn DealerClient>,
        manufacturers: Arc<dyn ManufacturerClient>,
    ) -> Self {
        Self {
            regions,
            dealers,
            manufacturers,
        }
    }

    /// Uses one implementation for every provider.
    #[must_use]
    pub fn from_shared<T>(client: Arc<T>) -> Self
    where
        T: RegionClient + DealerClient + ManufacturerClient + 'static,
    {
        Self {
            regions: Arc::clone(&client) as Arc<dyn RegionClient>,
            dealers: Arc::clone(&client) as Arc<dyn DealerClient>,
            manufacturers: client as Arc<dyn ManufacturerClient>,
        }
    }
}
