//! # REST Handlers
//!
//! Request handlers, shared state and response types.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::query::OfferQuery;
use crate::application::services::OfferAggregationEngine;
use crate::domain::entities::AggregatedOffer;
use crate::infrastructure::concurrency::context::RequestContext;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Aggregation engine.
    pub engine: Arc<OfferAggregationEngine>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(engine: Arc<OfferAggregationEngine>) -> Self {
        Self { engine }
    }
}

/// Query parameters of the offers endpoint.
///
/// Kept as strings so malformed values produce the service's own
/// validation error body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferParams {
    /// Body type filter.
    pub body_type: Option<String>,
    /// Full type filter.
    pub full_type: Option<String>,
    /// Maximum number of offers.
    pub max_results: Option<String>,
}

impl OfferParams {
    /// Validates the parameters into a query for `region_code`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for any malformed parameter.
    pub fn into_query(self, region_code: &str) -> ApplicationResult<OfferQuery> {
        let max_results = self
            .max_results
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<i64>().map_err(|_| {
                    ApplicationError::validation(format!("maxResults must be an integer, got '{v}'"))
                })
            })
            .transpose()?;
        OfferQuery::parse(
            region_code,
            self.body_type.as_deref(),
            self.full_type.as_deref(),
            max_results,
        )
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Trace id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Health response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` while accepting work, `draining` during shutdown.
    pub status: String,
    /// Pool tasks in flight.
    pub pool_in_flight: usize,
    /// Calls waiting for an execution slot.
    pub pool_queued: usize,
    /// Free execution slots.
    pub pool_available_slots: usize,
}

/// An application error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    error: ApplicationError,
    trace_id: Option<String>,
}

impl ApiError {
    /// Returns the HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.error {
            ApplicationError::Validation(_) => StatusCode::BAD_REQUEST,
            ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApplicationError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ApplicationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match &self.error {
            ApplicationError::Validation(_) => "VALIDATION_ERROR",
            ApplicationError::NotFound { .. } => "NOT_FOUND",
            ApplicationError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            ApplicationError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self {
            error,
            trace_id: RequestContext::current().map(|c| c.trace_id().to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.error.to_string(),
            trace_id: self.trace_id,
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /api/v1/regions/{region_code}/offers`
///
/// # Errors
///
/// Returns 400 for invalid parameters, 404 for an unknown region, 502 when
/// a required upstream lookup fails and 500 otherwise.
pub async fn cheapest_offers(
    State(state): State<AppState>,
    Path(region_code): Path<String>,
    Query(params): Query<OfferParams>,
) -> Result<Json<Vec<AggregatedOffer>>, ApiError> {
    let query = params.into_query(&region_code)?;
    let offers = state.engine.cheapest_offers(&query).await?;
    Ok(Json(offers))
}

/// `GET /api/v1/health`
#[allow(clippy::unused_async)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let metrics = state.engine.pool().metrics();
    Json(HealthResponse {
        status: if metrics.accepting { "ok" } else { "draining" }.to_string(),
        pool_in_flight: metrics.in_flight,
        pool_queued: metrics.queued,
        pool_available_slots: metrics.available_slots,
    })
}
