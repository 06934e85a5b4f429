//! # REST Routes
//!
//! Router construction and the request context middleware.

use crate::api::rest::handlers::{self, AppState};
use crate::infrastructure::concurrency::context::{
    CORRELATION_ID_HEADER, RequestContext, TRACE_ID_HEADER, TraceId,
};
use axum::Router;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// Creates the REST router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/regions/{region_code}/offers",
            get(handlers::cheapest_offers),
        )
        .route("/api/v1/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_context)),
        )
        .with_state(state)
}

/// Runs the request under a [`RequestContext`].
///
/// A valid inbound `x-trace-id` is continued, otherwise a new trace starts.
/// An inbound `x-correlation-id` is adopted. The trace id is echoed on the
/// response.
pub async fn request_context(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let context = headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<TraceId>().ok())
        .map(RequestContext::with_trace_id)
        .unwrap_or_default();
    let context = match headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(correlation) => context.with_correlation_id(correlation),
        None => context,
    };

    let trace_id = context.trace_id();
    let span = context.span();
    let mut response = context.scope(next.run(request)).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
