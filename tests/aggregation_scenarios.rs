//! End-to-end aggregation scenarios over the in-memory downstream.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::{Duration, Instant};
use vehicle_offers::application::services::{AggregationConfig, CheapestFirst};
use vehicle_offers::application::{ApplicationError, OfferAggregationEngine, OfferQuery};
use vehicle_offers::domain::entities::{
    AggregatedOffer, Dealer, DealerSummary, DealerVehicle, DiscountRule, Region,
};
use vehicle_offers::domain::value_objects::{
    BodyType, DealerId, FullType, ManufacturerId, Percent, RegionCode, VehicleId,
};
use vehicle_offers::infrastructure::concurrency::{PoolConfig, WorkerPool};
use vehicle_offers::infrastructure::downstream::{
    DownstreamCall, DownstreamClients, InMemoryDownstream,
};

fn pct(value: i64) -> Percent {
    Percent::new(value).unwrap()
}

fn code(value: &str) -> RegionCode {
    RegionCode::new(value).unwrap()
}

fn vehicle(id: u32, full_type: FullType, body_type: BodyType) -> DealerVehicle {
    DealerVehicle::new(
        VehicleId::new(id),
        format!("Model {id}"),
        2024,
        "Maker",
        ManufacturerId::new(1),
        full_type,
        body_type,
    )
}

fn engine(downstream: &Arc<InMemoryDownstream>) -> OfferAggregationEngine {
    let pool = WorkerPool::new(PoolConfig::new().with_core_size(2).with_max_size(8)).unwrap();
    OfferAggregationEngine::with_defaults(DownstreamClients::from_shared(Arc::clone(downstream)), pool)
}

fn query(region: &str, max_results: i64) -> OfferQuery {
    OfferQuery::parse(region, None, None, Some(max_results)).unwrap()
}

fn ids(offers: &[AggregatedOffer]) -> Vec<u32> {
    offers.iter().map(|o| o.vehicle_id().get()).collect()
}

/// Region NY, limit 20000, ELECTRIC 10%; one dealer with 10% overhead.
fn single_dealer(price: i64) -> Arc<InMemoryDownstream> {
    let ny = code("NY");
    let region = Region::new(
        7,
        ny.clone(),
        20_000,
        vec![DiscountRule::new(1, "EV", pct(10), FullType::Electric)],
    );
    let dealer = Dealer::new(
        DealerId::new(5),
        "Hudson Motors",
        pct(10),
        vec![vehicle(50, FullType::Electric, BodyType::Sedan)],
    );
    Arc::new(
        InMemoryDownstream::new()
            .with_region(region)
            .with_dealer(&ny, dealer)
            .with_price(VehicleId::new(50), price),
    )
}

#[tokio::test]
async fn discounted_offer_above_the_limit() {
    let downstream = single_dealer(25_000);
    let offers = engine(&downstream).cheapest_offers(&query("NY", 3)).await.unwrap();

    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].final_price(), 24_750);
    assert_eq!(offers[0].dealer_name(), "Hudson Motors");
    assert_eq!(downstream.call_count(DownstreamCall::DiscountPercent), 1);
}

#[tokio::test]
async fn no_discount_lookup_at_or_below_the_limit() {
    let downstream = single_dealer(18_000);
    let offers = engine(&downstream).cheapest_offers(&query("NY", 3)).await.unwrap();

    assert_eq!(offers[0].final_price(), 19_800);
    assert_eq!(downstream.call_count(DownstreamCall::DiscountPercent), 0);
}

#[tokio::test]
async fn price_exactly_at_limit_is_not_discounted() {
    let downstream = single_dealer(20_000);
    let offers = engine(&downstream).cheapest_offers(&query("NY", 3)).await.unwrap();

    assert_eq!(offers[0].final_price(), 22_000);
    assert_eq!(downstream.call_count(DownstreamCall::DiscountPercent), 0);
}

#[tokio::test]
async fn sample_catalog_ranks_cheapest_first() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    let offers = engine(&downstream).cheapest_offers(&query("CA", 20)).await.unwrap();

    let prices: Vec<i64> = offers.iter().map(AggregatedOffer::final_price).collect();
    assert_eq!(prices, vec![19_440, 30_800, 39_312, 44_280, 44_550, 58_240]);
    assert_eq!(ids(&offers), vec![21, 12, 31, 22, 11, 32]);
}

#[tokio::test]
async fn default_result_count_is_three() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    let query = OfferQuery::parse("CA", None, None, None).unwrap();
    let offers = engine(&downstream).cheapest_offers(&query).await.unwrap();
    assert_eq!(ids(&offers), vec![21, 12, 31]);
}

#[tokio::test]
async fn zero_results_still_runs_and_returns_empty() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    let offers = engine(&downstream).cheapest_offers(&query("CA", 0)).await.unwrap();
    assert!(offers.is_empty());
    assert_eq!(downstream.call_count(DownstreamCall::RegionInfo), 1);
}

#[test]
fn out_of_bounds_result_counts_are_rejected() {
    for bad in [-1, 21, 1_000] {
        let err = OfferQuery::parse("CA", None, None, Some(bad)).unwrap_err();
        assert!(err.is_validation(), "{bad} should be rejected");
    }
    assert!(OfferQuery::parse("CA", None, None, Some(20)).is_ok());
}

#[tokio::test]
async fn region_is_fetched_once_per_request() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    engine(&downstream).cheapest_offers(&query("CA", 20)).await.unwrap();

    assert_eq!(downstream.call_count(DownstreamCall::RegionInfo), 1);
    assert_eq!(downstream.call_count(DownstreamCall::DealerList), 1);
    assert_eq!(downstream.call_count(DownstreamCall::DealerDetail), 3);
    assert_eq!(downstream.call_count(DownstreamCall::VehiclePrice), 6);
}

#[tokio::test]
async fn discount_only_requested_for_eligible_vehicles() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    engine(&downstream).cheapest_offers(&query("CA", 20)).await.unwrap();

    let keys = downstream.requested_keys(DownstreamCall::DiscountPercent);
    assert_eq!(keys, vec!["CA/ELECTRIC".to_string(), "CA/ELECTRIC".to_string()]);
}

#[tokio::test]
async fn failed_discount_degrades_to_no_discount() {
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .failing_discount(FullType::Electric),
    );
    let report = engine(&downstream).aggregate(&query("CA", 20)).await.unwrap();

    let model_y = report
        .offers
        .iter()
        .find(|o| o.vehicle_id() == VehicleId::new(11))
        .unwrap();
    assert_eq!(model_y.final_price(), 49_500);
    assert_eq!(report.offers.len(), 6);
    assert_eq!(report.stats.discounts_degraded, 2);
    assert_eq!(report.stats.discounts_applied, 0);
}

#[tokio::test]
async fn failed_price_drops_only_that_vehicle() {
    let ny = code("NY");
    let region = Region::new(1, ny.clone(), 100_000, vec![]);
    let dealer = Dealer::new(
        DealerId::new(1),
        "Solo",
        pct(0),
        vec![
            vehicle(1, FullType::Gasoline, BodyType::Sedan),
            vehicle(2, FullType::Gasoline, BodyType::Sedan),
            vehicle(3, FullType::Gasoline, BodyType::Sedan),
        ],
    );
    let downstream = Arc::new(
        InMemoryDownstream::new()
            .with_region(region)
            .with_dealer(&ny, dealer)
            .with_price(VehicleId::new(1), 300)
            .with_price(VehicleId::new(2), 100)
            .with_price(VehicleId::new(3), 200)
            .failing_price(VehicleId::new(2)),
    );

    let offers = engine(&downstream).cheapest_offers(&query("NY", 3)).await.unwrap();
    assert_eq!(ids(&offers), vec![3, 1]);
}

#[tokio::test]
async fn duplicate_dealer_listing_yields_unique_offers() {
    let ca = code("CA");
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .with_listed_dealer(&ca, DealerSummary::new(DealerId::new(1), "Bay Motors")),
    );
    let report = engine(&downstream).aggregate(&query("CA", 20)).await.unwrap();

    assert_eq!(report.offers.len(), 6);
    assert_eq!(report.stats.duplicates_discarded, 2);
    assert_eq!(downstream.call_count(DownstreamCall::DealerDetail), 4);

    let mut seen = ids(&report.offers);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[tokio::test]
async fn equal_prices_break_ties_by_dealer_then_vehicle() {
    let ny = code("NY");
    let region = Region::new(1, ny.clone(), 100_000, vec![]);
    let second = Dealer::new(
        DealerId::new(2),
        "Second",
        pct(0),
        vec![vehicle(7, FullType::Diesel, BodyType::Truck)],
    );
    let first = Dealer::new(
        DealerId::new(1),
        "First",
        pct(0),
        vec![
            vehicle(9, FullType::Diesel, BodyType::Truck),
            vehicle(8, FullType::Diesel, BodyType::Truck),
        ],
    );
    let downstream = Arc::new(
        InMemoryDownstream::new()
            .with_region(region)
            .with_dealer(&ny, second)
            .with_dealer(&ny, first)
            .with_price(VehicleId::new(7), 500)
            .with_price(VehicleId::new(8), 500)
            .with_price(VehicleId::new(9), 500),
    );

    for _ in 0..5 {
        let offers = engine(&downstream).cheapest_offers(&query("NY", 3)).await.unwrap();
        assert_eq!(ids(&offers), vec![8, 9, 7]);
    }
}

#[tokio::test]
async fn filters_restrict_vehicles_before_pricing() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    let engine = engine(&downstream);

    let suv = OfferQuery::parse("CA", Some("suv"), None, Some(20)).unwrap();
    assert_eq!(ids(&engine.cheapest_offers(&suv).await.unwrap()), vec![31, 11]);
    assert_eq!(downstream.call_count(DownstreamCall::VehiclePrice), 2);

    let hybrid_sedan = OfferQuery::parse("CA", Some("SEDAN"), Some("hybrid"), Some(20)).unwrap();
    assert_eq!(ids(&engine.cheapest_offers(&hybrid_sedan).await.unwrap()), vec![21]);

    let none = OfferQuery::parse("CA", Some("TRUCK"), Some("ELECTRIC"), Some(20)).unwrap();
    assert!(engine.cheapest_offers(&none).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_region_is_not_found() {
    let downstream = Arc::new(InMemoryDownstream::sample_catalog().unwrap());
    let err = engine(&downstream).cheapest_offers(&query("ZZ", 3)).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(downstream.call_count(DownstreamCall::DealerList), 0);
}

#[tokio::test]
async fn slow_region_lookup_is_upstream_unavailable() {
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .with_latency(DownstreamCall::RegionInfo, Duration::from_millis(200)),
    );
    let pool = WorkerPool::new(PoolConfig::new().with_core_size(2).with_max_size(8)).unwrap();
    let engine = OfferAggregationEngine::new(
        DownstreamClients::from_shared(Arc::clone(&downstream)),
        pool,
        Arc::new(CheapestFirst::new()),
        AggregationConfig::default().with_call_timeout(20),
    );

    let err = engine.cheapest_offers(&query("CA", 3)).await.unwrap_err();
    assert!(err.is_upstream_unavailable());
    assert!(!err.is_not_found());
    assert_eq!(downstream.call_count(DownstreamCall::RegionInfo), 1);
    assert_eq!(downstream.call_count(DownstreamCall::DealerList), 0);
}

#[tokio::test]
async fn region_without_dealers_is_empty() {
    let downstream = Arc::new(
        InMemoryDownstream::new()
            .with_region(Region::new(1, code("NV"), 20_000, vec![])),
    );
    let offers = engine(&downstream).cheapest_offers(&query("NV", 3)).await.unwrap();
    assert!(offers.is_empty());
}

#[tokio::test]
async fn dealer_detail_failure_is_fatal() {
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .failing_dealer(DealerId::new(2)),
    );
    let err = engine(&downstream).cheapest_offers(&query("CA", 3)).await.unwrap_err();
    assert!(matches!(err, ApplicationError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn listed_dealer_without_details_is_not_found() {
    let ca = code("CA");
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .with_listed_dealer(&ca, DealerSummary::new(DealerId::new(99), "Ghost")),
    );
    let err = engine(&downstream).cheapest_offers(&query("CA", 3)).await.unwrap_err();
    assert_eq!(err, ApplicationError::not_found("dealer", "99"));
}

#[tokio::test]
async fn fatal_failure_aborts_outstanding_work() {
    let downstream = Arc::new(
        InMemoryDownstream::sample_catalog()
            .unwrap()
            .failing_dealer(DealerId::new(3))
            .with_latency(DownstreamCall::VehiclePrice, Duration::from_secs(5)),
    );
    let engine = engine(&downstream);

    let started = Instant::now();
    let err = engine.cheapest_offers(&query("CA", 3)).await.unwrap_err();
    assert!(err.is_upstream_unavailable());
    assert!(started.elapsed() < Duration::from_secs(2));

    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.pool().metrics().in_flight > 0 {
        assert!(Instant::now() < deadline, "pool did not drain after abort");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(engine.pool().metrics().available_slots, 8);
}
