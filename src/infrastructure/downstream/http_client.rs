//! # HTTP Client Utilities
//!
//! Shared HTTP client for the downstream provider adapters.
//!
//! This module provides a reusable HTTP client wrapper with:
//! - Configurable request and connect timeouts
//! - Trace and correlation headers taken from the active request context
//! - JSON deserialization
//! - Status to [`DownstreamError`] mapping
//!
//! # Examples
//!
//! ```ignore
//! use vehicle_offers::infrastructure::downstream::http_client::HttpClient;
//!
//! let client = HttpClient::new(5000, 1000)?;
//! let price: i64 = client.get("http://localhost:8081/api/v0.1/manufacturer/11", "vehicle price", 11).await?;
//! ```

use crate::infrastructure::concurrency::context::{
    CORRELATION_ID_HEADER, RequestContext, TRACE_ID_HEADER,
};
use crate::infrastructure::downstream::error::{DownstreamError, DownstreamResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Maximum number of error body characters kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 256;

/// HTTP client wrapper for downstream adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `timeout_ms` - Whole-request timeout in milliseconds.
    /// * `connect_timeout_ms` - Connection establishment timeout in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64, connect_timeout_ms: u64) -> DownstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .build()
            .map_err(|e| {
                DownstreamError::internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// The trace id and correlation id of the current [`RequestContext`] are
    /// sent as headers.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request.
    /// * `resource` - Resource kind, used in not found errors.
    /// * `id` - Requested identifier, used in not found errors.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError::NotFound` on 404, `Timeout` or `Connection`
    /// if the request fails, `Unavailable` on other error statuses and
    /// `InvalidResponse` if the body cannot be parsed.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        id: impl fmt::Display,
    ) -> DownstreamResult<T> {
        debug!(url, resource, "Downstream GET");
        let response = self
            .client
            .get(url)
            .headers(context_headers(RequestContext::current().as_ref()))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response, resource, id).await
    }

    /// Handles the HTTP response, checking status and deserializing JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        resource: &str,
        id: impl fmt::Display,
    ) -> DownstreamResult<T> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| self.map_reqwest_error(e))?;
            serde_json::from_slice::<T>(&bytes).map_err(|e| {
                DownstreamError::invalid_response(format!("Failed to parse {resource}: {e}"))
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, &error_body, resource, id))
        }
    }

    /// Maps a reqwest error to a DownstreamError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> DownstreamError {
        if error.is_timeout() {
            DownstreamError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            DownstreamError::connection(format!("Connection failed: {}", error))
        } else {
            DownstreamError::connection(format!("HTTP request failed: {}", error))
        }
    }

    /// Maps an HTTP status code to a DownstreamError.
    fn map_status_error(
        &self,
        status: StatusCode,
        body: &str,
        resource: &str,
        id: impl fmt::Display,
    ) -> DownstreamError {
        let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        match status {
            StatusCode::NOT_FOUND => DownstreamError::not_found(resource, id),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                DownstreamError::timeout(format!("Server timeout ({}): {}", status, body))
            }
            _ => DownstreamError::unavailable(
                status.as_u16(),
                format!("{resource} lookup failed: {body}"),
            ),
        }
    }
}

/// Builds the outgoing trace headers for a request context.
#[must_use]
pub fn context_headers(context: Option<&RequestContext>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(context) = context else {
        return headers;
    };

    if let Ok(value) = HeaderValue::from_str(&context.trace_id().to_string()) {
        headers.insert(TRACE_ID_HEADER, value);
    }
    if let Some(value) = context
        .correlation_id()
        .and_then(|id| HeaderValue::from_str(id).ok())
    {
        headers.insert(CORRELATION_ID_HEADER, value);
    }
    headers
}
