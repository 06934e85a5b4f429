//! # In-Memory Downstream
//!
//! Programmable in-process implementation of every downstream client trait.
//!
//! Data is fixed at construction through consuming `with_*` builders.
//! Failures and latency can be injected per call kind. Every call is counted
//! and the request context it ran under is recorded, so tests can assert
//! both call patterns and context propagation.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::infrastructure::downstream::in_memory::{DownstreamCall, InMemoryDownstream};
//! use vehicle_offers::infrastructure::downstream::traits::ManufacturerClient;
//! use vehicle_offers::domain::value_objects::VehicleId;
//!
//! # tokio_test::block_on(async {
//! let downstream = InMemoryDownstream::new().with_price(VehicleId::new(1), 25_000);
//! assert_eq!(downstream.vehicle_price(VehicleId::new(1)).await.unwrap(), 25_000);
//! assert_eq!(downstream.call_count(DownstreamCall::VehiclePrice), 1);
//! # });
//! ```

use crate::domain::entities::{Dealer, DealerSummary, DealerVehicle, DiscountRule, Region};
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{
    BodyType, DealerId, FullType, ManufacturerId, Percent, RegionCode, VehicleId,
};
use crate::infrastructure::concurrency::context::RequestContext;
use crate::infrastructure::downstream::error::{DownstreamError, DownstreamResult};
use crate::infrastructure::downstream::traits::{DealerClient, ManufacturerClient, RegionClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

/// Kind of downstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownstreamCall {
    /// Region info lookup.
    RegionInfo,
    /// Dealer list lookup.
    DealerList,
    /// Dealer detail lookup.
    DealerDetail,
    /// Vehicle price lookup.
    VehiclePrice,
    /// Discount percent lookup.
    DiscountPercent,
}

impl fmt::Display for DownstreamCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegionInfo => write!(f, "region_info"),
            Self::DealerList => write!(f, "dealer_list"),
            Self::DealerDetail => write!(f, "dealer_detail"),
            Self::VehiclePrice => write!(f, "vehicle_price"),
            Self::DiscountPercent => write!(f, "discount_percent"),
        }
    }
}

/// A call observed by [`InMemoryDownstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Call kind.
    pub call: DownstreamCall,
    /// Requested key, e.g. the dealer id.
    pub key: String,
    /// Request context active while the call ran.
    pub context: Option<RequestContext>,
}

/// In-memory region, dealer and manufacturer provider.
#[derive(Debug, Default)]
pub struct InMemoryDownstream {
    regions: HashMap<RegionCode, Region>,
    region_dealers: HashMap<RegionCode, Vec<DealerSummary>>,
    dealers: HashMap<DealerId, Dealer>,
    prices: HashMap<VehicleId, i64>,
    failing_prices: HashSet<VehicleId>,
    panicking_prices: HashSet<VehicleId>,
    failing_discounts: HashSet<FullType>,
    failing_dealers: HashSet<DealerId>,
    latency: HashMap<DownstreamCall, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl InMemoryDownstream {
    /// Creates an empty downstream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region_dealers.entry(region.code().clone()).or_default();
        self.regions.insert(region.code().clone(), region);
        self
    }

    /// Adds a dealer and lists it under `region`.
    #[must_use]
    pub fn with_dealer(mut self, region: &RegionCode, dealer: Dealer) -> Self {
        self.region_dealers
            .entry(region.clone())
            .or_default()
            .push(DealerSummary::new(dealer.id(), dealer.name()));
        self.dealers.insert(dealer.id(), dealer);
        self
    }

    /// Lists a dealer under `region` without adding its details.
    #[must_use]
    pub fn with_listed_dealer(mut self, region: &RegionCode, summary: DealerSummary) -> Self {
        self.region_dealers.entry(region.clone()).or_default().push(summary);
        self
    }

    /// Sets the manufacturer price of a vehicle.
    #[must_use]
    pub fn with_price(mut self, vehicle: VehicleId, price: i64) -> Self {
        self.prices.insert(vehicle, price);
        self
    }

    /// Makes price lookups for `vehicle` fail.
    #[must_use]
    pub fn failing_price(mut self, vehicle: VehicleId) -> Self {
        self.failing_prices.insert(vehicle);
        self
    }

    /// Makes price lookups for `vehicle` panic.
    #[must_use]
    pub fn panicking_price(mut self, vehicle: VehicleId) -> Self {
        self.panicking_prices.insert(vehicle);
        self
    }

    /// Makes discount lookups for `full_type` fail.
    #[must_use]
    pub fn failing_discount(mut self, full_type: FullType) -> Self {
        self.failing_discounts.insert(full_type);
        self
    }

    /// Makes detail lookups for `dealer` fail.
    #[must_use]
    pub fn failing_dealer(mut self, dealer: DealerId) -> Self {
        self.failing_dealers.insert(dealer);
        self
    }

    /// Delays every call of `call` kind.
    #[must_use]
    pub fn with_latency(mut self, call: DownstreamCall, latency: Duration) -> Self {
        self.latency.insert(call, latency);
        self
    }

    /// Delays every call.
    #[must_use]
    pub fn with_uniform_latency(mut self, latency: Duration) -> Self {
        for call in [
            DownstreamCall::RegionInfo,
            DownstreamCall::DealerList,
            DownstreamCall::DealerDetail,
            DownstreamCall::VehiclePrice,
            DownstreamCall::DiscountPercent,
        ] {
            self.latency.insert(call, latency);
        }
        self
    }

    /// Returns every call observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns how many calls of `call` kind were made.
    #[must_use]
    pub fn call_count(&self, call: DownstreamCall) -> usize {
        self.calls.lock().iter().filter(|c| c.call == call).count()
    }

    /// Returns the keys requested by calls of `call` kind, in call order.
    #[must_use]
    pub fn requested_keys(&self, call: DownstreamCall) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.call == call)
            .map(|c| c.key.clone())
            .collect()
    }

    /// Forgets recorded calls.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    async fn observe(&self, call: DownstreamCall, key: impl ToString) {
        self.calls.lock().push(RecordedCall {
            call,
            key: key.to_string(),
            context: RequestContext::current(),
        });
        if let Some(latency) = self.latency.get(&call) {
            tokio::time::sleep(*latency).await;
        }
    }

    /// Small fixed catalog: region `CA` (limit 20000, ELECTRIC 10%, HYBRID 5%)
    /// with three dealers and six priced vehicles.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` only if the fixture values fail validation.
    pub fn sample_catalog() -> DomainResult<Self> {
        let code = RegionCode::new("CA")?;
        let region = Region::new(
            1,
            code.clone(),
            20_000,
            vec![
                DiscountRule::new(1, "EV incentive", Percent::new(10)?, FullType::Electric),
                DiscountRule::new(2, "Hybrid incentive", Percent::new(5)?, FullType::Hybrid),
            ],
        );

        let vehicle = |id: u32, model: &str, maker: (u32, &str), full: FullType, body: BodyType| {
            DealerVehicle::new(
                VehicleId::new(id),
                model,
                2024,
                maker.1,
                ManufacturerId::new(maker.0),
                full,
                body,
            )
        };

        let bay = Dealer::new(
            DealerId::new(1),
            "Bay Motors",
            Percent::new(10)?,
            vec![
                vehicle(11, "Model Y", (1, "Tesla"), FullType::Electric, BodyType::Suv),
                vehicle(12, "Camry", (2, "Toyota"), FullType::Gasoline, BodyType::Sedan),
            ],
        );
        let valley = Dealer::new(
            DealerId::new(2),
            "Valley Auto",
            Percent::new(8)?,
            vec![
                vehicle(21, "Prius", (2, "Toyota"), FullType::Hybrid, BodyType::Sedan),
                vehicle(22, "F-150", (3, "Ford"), FullType::Gasoline, BodyType::Truck),
            ],
        );
        let coast = Dealer::new(
            DealerId::new(3),
            "Coast Cars",
            Percent::new(12)?,
            vec![
                vehicle(31, "Ioniq 5", (4, "Hyundai"), FullType::Electric, BodyType::Suv),
                vehicle(32, "Ram 2500", (5, "Ram"), FullType::Diesel, BodyType::Truck),
            ],
        );

        Ok(Self::new()
            .with_region(region)
            .with_dealer(&code, bay)
            .with_dealer(&code, valley)
            .with_dealer(&code, coast)
            .with_price(VehicleId::new(11), 45_000)
            .with_price(VehicleId::new(12), 28_000)
            .with_price(VehicleId::new(21), 18_000)
            .with_price(VehicleId::new(22), 41_000)
            .with_price(VehicleId::new(31), 39_000)
            .with_price(VehicleId::new(32), 52_000))
    }
}

#[async_trait]
impl RegionClient for InMemoryDownstream {
    async fn region_info(&self, code: &RegionCode) -> DownstreamResult<Region> {
        self.observe(DownstreamCall::RegionInfo, code).await;
        self.regions
            .get(code)
            .cloned()
            .ok_or_else(|| DownstreamError::not_found("region", code))
    }

    async fn dealers_in_region(&self, code: &RegionCode) -> DownstreamResult<Vec<DealerSummary>> {
        self.observe(DownstreamCall::DealerList, code).await;
        self.region_dealers
            .get(code)
            .cloned()
            .ok_or_else(|| DownstreamError::not_found("region dealers", code))
    }

    async fn discount_percent(
        &self,
        code: &RegionCode,
        full_type: FullType,
    ) -> DownstreamResult<Percent> {
        self.observe(DownstreamCall::DiscountPercent, format!("{code}/{full_type}"))
            .await;
        if self.failing_discounts.contains(&full_type) {
            return Err(DownstreamError::unavailable(503, "discount service down"));
        }
        self.regions
            .get(code)
            .and_then(|region| region.rule_for(full_type))
            .map(DiscountRule::percent)
            .ok_or_else(|| DownstreamError::not_found("discount", format!("{code}/{full_type}")))
    }
}

#[async_trait]
impl DealerClient for InMemoryDownstream {
    async fn dealer_detail(&self, id: DealerId) -> DownstreamResult<Dealer> {
        self.observe(DownstreamCall::DealerDetail, id).await;
        if self.failing_dealers.contains(&id) {
            return Err(DownstreamError::unavailable(503, "dealer service down"));
        }
        self.dealers
            .get(&id)
            .cloned()
            .ok_or_else(|| DownstreamError::not_found("dealer", id))
    }
}

#[async_trait]
impl ManufacturerClient for InMemoryDownstream {
    #[allow(clippy::panic)]
    async fn vehicle_price(&self, id: VehicleId) -> DownstreamResult<i64> {
        self.observe(DownstreamCall::VehiclePrice, id).await;
        if self.panicking_prices.contains(&id) {
            panic!("injected panic in price lookup for vehicle {id}");
        }
        if self.failing_prices.contains(&id) {
            return Err(DownstreamError::connection("manufacturer service unreachable"));
        }
        self.prices
            .get(&id)
            .copied()
            .ok_or_else(|| DownstreamError::not_found("vehicle price", id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ca() -> RegionCode {
        RegionCode::new("CA").unwrap()
    }

    #[tokio::test]
    async fn sample_catalog_lists_dealers() {
        let downstream = InMemoryDownstream::sample_catalog().unwrap();
        let dealers = downstream.dealers_in_region(&ca()).await.unwrap();
        assert_eq!(dealers.len(), 3);
        let region = downstream.region_info(&ca()).await.unwrap();
        assert_eq!(region.price_limit(), 20_000);
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let downstream = InMemoryDownstream::new();
        let err = downstream
            .region_info(&RegionCode::new("ZZ").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn discount_comes_from_region_rule() {
        let downstream = InMemoryDownstream::sample_catalog().unwrap();
        let percent = downstream
            .discount_percent(&ca(), FullType::Electric)
            .await
            .unwrap();
        assert_eq!(percent.get(), 10);
        assert!(
            downstream
                .discount_percent(&ca(), FullType::Diesel)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn injected_failures() {
        let downstream = InMemoryDownstream::sample_catalog().unwrap()
            .failing_price(VehicleId::new(11))
            .failing_discount(FullType::Electric)
            .failing_dealer(DealerId::new(2));

        assert!(downstream.vehicle_price(VehicleId::new(11)).await.is_err());
        assert!(downstream.vehicle_price(VehicleId::new(12)).await.is_ok());
        assert!(downstream.discount_percent(&ca(), FullType::Electric).await.is_err());
        assert!(downstream.dealer_detail(DealerId::new(2)).await.is_err());
        assert!(downstream.dealer_detail(DealerId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn records_calls_and_context() {
        let downstream = InMemoryDownstream::sample_catalog().unwrap();
        let ctx = RequestContext::new();
        let trace_id = ctx.trace_id();
        ctx.scope(downstream.dealer_detail(DealerId::new(3))).await.unwrap();
        downstream.vehicle_price(VehicleId::new(31)).await.unwrap();

        let calls = downstream.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].call, DownstreamCall::DealerDetail);
        assert_eq!(calls[0].key, "3");
        assert_eq!(calls[0].context.as_ref().map(|c| c.trace_id()), Some(trace_id));
        assert!(calls[1].context.is_none());
        assert_eq!(downstream.requested_keys(DownstreamCall::VehiclePrice), vec!["31"]);

        downstream.reset_calls();
        assert!(downstream.calls().is_empty());
    }
}
