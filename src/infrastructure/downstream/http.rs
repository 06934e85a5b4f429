//! # HTTP Downstream Adapter
//!
//! Implements the region, dealer and manufacturer client traits against the
//! provider HTTP API rooted at `{base_url}{api_root}`:
//!
//! | Call | Path |
//! |---|---|
//! | Region info | `/state/code/{code}` |
//! | Dealer list | `/state/dealersByCode/{code}` |
//! | Discount | `/state/discount/{code}/{FULL_TYPE}` |
//! | Dealer detail | `/dealer/{id}` |
//! | Price | `/manufacturer/{vehicleId}` |

use crate::domain::entities::{Dealer, DealerSummary, Region};
use crate::domain::value_objects::{DealerId, FullType, Percent, RegionCode, VehicleId};
use crate::infrastructure::downstream::error::{DownstreamError, DownstreamResult};
use crate::infrastructure::downstream::http_client::HttpClient;
use crate::infrastructure::downstream::responses::{
    DealerResponse, IdNameResponse, RegionResponse,
};
use crate::infrastructure::downstream::traits::{DealerClient, ManufacturerClient, RegionClient};
use async_trait::async_trait;
use serde::Deserialize;

/// Default provider base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Default API root path.
pub const DEFAULT_API_ROOT: &str = "/api/v0.1";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the provider HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpDownstreamConfig {
    /// Scheme, host and port of the provider.
    pub base_url: String,
    /// Path prefix shared by every endpoint.
    pub api_root: String,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for HttpDownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_root: DEFAULT_API_ROOT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl HttpDownstreamConfig {
    /// Creates a configuration for a base URL with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the API root path.
    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Returns `{base_url}{api_root}` without a trailing slash.
    #[must_use]
    pub fn root_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let root = self.api_root.trim_matches('/');
        if root.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{root}")
        }
    }
}

/// Provider HTTP API client.
#[derive(Debug, Clone)]
pub struct HttpDownstream {
    http: HttpClient,
    root: String,
}

impl HttpDownstream {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamError::Internal` if the base URL is blank or the
    /// HTTP client cannot be built.
    pub fn new(config: &HttpDownstreamConfig) -> DownstreamResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(DownstreamError::internal("downstream base_url is empty"));
        }
        let http = HttpClient::new(config.timeout_ms, config.connect_timeout_ms)?;
        Ok(Self {
            http,
            root: config.root_url(),
        })
    }

    /// Returns the resolved API root URL.
    #[must_use]
    pub fn root_url(&self) -> &str {
        &self.root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }
}

#[async_trait]
impl RegionClient for HttpDownstream {
    #[tracing::instrument(skip(self), fields(region = %code))]
    async fn region_info(&self, code: &RegionCode) -> DownstreamResult<Region> {
        let url = self.url(&format!("/state/code/{code}"));
        let response: RegionResponse = self.http.get(&url, "region", code).await?;
        Region::try_from(response)
    }

    #[tracing::instrument(skip(self), fields(region = %code))]
    async fn dealers_in_region(&self, code: &RegionCode) -> DownstreamResult<Vec<DealerSummary>> {
        let url = self.url(&format!("/state/dealersByCode/{code}"));
        let response: Vec<IdNameResponse> = self.http.get(&url, "region dealers", code).await?;
        Ok(response.into_iter().map(DealerSummary::from).collect())
    }

    #[tracing::instrument(skip(self), fields(region = %code, full_type = %full_type))]
    async fn discount_percent(
        &self,
        code: &RegionCode,
        full_type: FullType,
    ) -> DownstreamResult<Percent> {
        let url = self.url(&format!("/state/discount/{code}/{}", full_type.as_str()));
        let percent: i64 = self
            .http
            .get(&url, "discount", format!("{code}/{full_type}"))
            .await?;
        Percent::new(percent)
            .map_err(|e| DownstreamError::invalid_response(format!("discount percent: {e}")))
    }
}

#[async_trait]
impl DealerClient for HttpDownstream {
    #[tracing::instrument(skip(self), fields(dealer_id = %id))]
    async fn dealer_detail(&self, id: DealerId) -> DownstreamResult<Dealer> {
        let url = self.url(&format!("/dealer/{id}"));
        let response: DealerResponse = self.http.get(&url, "dealer", id).await?;
        Dealer::try_from(response)
    }
}

#[async_trait]
impl ManufacturerClient for HttpDownstream {
    #[tracing::instrument(skip(self), fields(vehicle_id = %id))]
    async fn vehicle_price(&self, id: VehicleId) -> DownstreamResult<i64> {
        let url = self.url(&format!("/manufacturer/{id}"));
        self.http.get(&url, "vehicle price", id).await
    }
}
