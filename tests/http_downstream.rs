//! HTTP downstream adapter against a mock provider.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vehicle_offers::application::{OfferAggregationEngine, OfferQuery};
use vehicle_offers::domain::value_objects::{DealerId, FullType, RegionCode, VehicleId};
use vehicle_offers::infrastructure::concurrency::{PoolConfig, RequestContext, WorkerPool};
use vehicle_offers::infrastructure::downstream::{
    DealerClient, DownstreamClients, DownstreamError, HttpDownstream, HttpDownstreamConfig,
    ManufacturerClient, RegionClient,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpDownstream {
    HttpDownstream::new(&HttpDownstreamConfig::new(server.uri()).with_timeout_ms(2_000)).unwrap()
}

fn ny() -> RegionCode {
    RegionCode::new("NY").unwrap()
}

fn region_body() -> serde_json::Value {
    json!({
        "id": 7,
        "code": "NY",
        "priceLimit": 20000,
        "discounts": [
            { "id": 1, "name": "EV", "percent": 10, "type": "ELECTRIC" }
        ]
    })
}

fn dealer_body() -> serde_json::Value {
    json!({
        "id": 5,
        "name": "Hudson Motors",
        "overhead": 10,
        "cars": [
            {
                "id": 50,
                "model": "Ioniq 6",
                "manufacturer": { "id": 3, "name": "Hyundai" },
                "year": 2024,
                "fullType": "ELECTRIC",
                "type": "SEDAN"
            }
        ]
    })
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn region_info_parses_discount_schedule() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/v0.1/state/code/NY", region_body()).await;

    let region = client(&server).region_info(&ny()).await.unwrap();
    assert_eq!(region.price_limit(), 20_000);
    assert_eq!(region.discounts().len(), 1);
    assert_eq!(region.discounts()[0].full_type(), FullType::Electric);
}

#[tokio::test]
async fn dealer_list_and_detail() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v0.1/state/dealersByCode/NY",
        json!([{ "id": 5, "name": "Hudson Motors" }, { "id": 6, "name": "Bronx Cars" }]),
    )
    .await;
    mount_json(&server, "/api/v0.1/dealer/5", dealer_body()).await;

    let downstream = client(&server);
    let dealers = downstream.dealers_in_region(&ny()).await.unwrap();
    assert_eq!(dealers.len(), 2);
    assert_eq!(dealers[1].id(), DealerId::new(6));

    let dealer = downstream.dealer_detail(DealerId::new(5)).await.unwrap();
    assert_eq!(dealer.overhead().get(), 10);
    assert_eq!(dealer.vehicles()[0].manufacturer_name(), "Hyundai");
}

#[tokio::test]
async fn price_and_discount_are_bare_numbers() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/v0.1/manufacturer/50", json!(25000)).await;
    mount_json(&server, "/api/v0.1/state/discount/NY/ELECTRIC", json!(10)).await;

    let downstream = client(&server);
    assert_eq!(downstream.vehicle_price(VehicleId::new(50)).await.unwrap(), 25_000);
    assert_eq!(
        downstream
            .discount_percent(&ny(), FullType::Electric)
            .await
            .unwrap()
            .get(),
        10
    );
}

#[tokio::test]
async fn forwards_request_context_headers() {
    let server = MockServer::start().await;
    let context = RequestContext::new().with_correlation_id("order-9");

    Mock::given(method("GET"))
        .and(path("/api/v0.1/manufacturer/50"))
        .and(header("x-trace-id", context.trace_id().to_string().as_str()))
        .and(header("x-correlation-id", "order-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(100)))
        .expect(1)
        .mount(&server)
        .await;

    let downstream = client(&server);
    let price = context
        .scope(downstream.vehicle_price(VehicleId::new(50)))
        .await
        .unwrap();
    assert_eq!(price, 100);
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0.1/state/code/ZZ"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .region_info(&RegionCode::new("ZZ").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err, DownstreamError::not_found("region", "ZZ"));
}

#[tokio::test]
async fn server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0.1/dealer/5"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).dealer_detail(DealerId::new(5)).await.unwrap_err();
    assert!(matches!(err, DownstreamError::Unavailable { status: 503, .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn malformed_body_maps_to_invalid_response() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/v0.1/manufacturer/50", json!({ "price": "cheap" })).await;

    let err = client(&server).vehicle_price(VehicleId::new(50)).await.unwrap_err();
    assert!(matches!(err, DownstreamError::InvalidResponse { .. }));
}

#[tokio::test]
async fn unknown_full_type_is_invalid_response() {
    let server = MockServer::start().await;
    let mut body = dealer_body();
    body["cars"][0]["fullType"] = json!("STEAM");
    mount_json(&server, "/api/v0.1/dealer/5", body).await;

    let err = client(&server).dealer_detail(DealerId::new(5)).await.unwrap_err();
    assert!(matches!(err, DownstreamError::InvalidResponse { .. }));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0.1/manufacturer/50"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let downstream =
        HttpDownstream::new(&HttpDownstreamConfig::new(server.uri()).with_timeout_ms(50)).unwrap();
    let err = downstream.vehicle_price(VehicleId::new(50)).await.unwrap_err();
    assert!(matches!(err, DownstreamError::Timeout { .. }));
}

#[tokio::test]
async fn full_aggregation_over_http() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/v0.1/state/code/NY", region_body()).await;
    mount_json(
        &server,
        "/api/v0.1/state/dealersByCode/NY",
        json!([{ "id": 5, "name": "Hudson Motors" }]),
    )
    .await;
    mount_json(&server, "/api/v0.1/dealer/5", dealer_body()).await;
    mount_json(&server, "/api/v0.1/manufacturer/50", json!(25000)).await;
    mount_json(&server, "/api/v0.1/state/discount/NY/ELECTRIC", json!(10)).await;

    let pool = WorkerPool::new(PoolConfig::new().with_core_size(2).with_max_size(4)).unwrap();
    let engine = OfferAggregationEngine::with_defaults(
        DownstreamClients::from_shared(Arc::new(client(&server))),
        pool,
    );
    let query = OfferQuery::parse("NY", None, None, None).unwrap();
    let offers = engine.cheapest_offers(&query).await.unwrap();

    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].final_price(), 24_750);
    assert_eq!(offers[0].model(), "Ioniq 6");
}

#[tokio::test]
async fn repeated_discount_rules_do_not_fail_the_region() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v0.1/state/code/NY",
        json!({
            "id": 7,
            "code": "NY",
            "priceLimit": 20000,
            "discounts": [
                { "id": 1, "name": "EV", "percent": 10, "type": "ELECTRIC" },
                { "id": 2, "name": "EV bonus", "percent": 15, "type": "ELECTRIC" }
            ]
        }),
    )
    .await;
    mount_json(
        &server,
        "/api/v0.1/state/dealersByCode/NY",
        json!([{ "id": 5, "name": "Hudson Motors" }]),
    )
    .await;
    let mut dealer = dealer_body();
    dealer["cars"][0]["fullType"] = json!("GASOLINE");
    mount_json(&server, "/api/v0.1/dealer/5", dealer).await;
    mount_json(&server, "/api/v0.1/manufacturer/50", json!(18000)).await;

    let pool = WorkerPool::new(PoolConfig::new().with_core_size(2).with_max_size(4)).unwrap();
    let engine = OfferAggregationEngine::with_defaults(
        DownstreamClients::from_shared(Arc::new(client(&server))),
        pool,
    );
    let query = OfferQuery::parse("NY", None, None, None).unwrap();
    let offers = engine.cheapest_offers(&query).await.unwrap();

    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].final_price(), 19_800);
}
