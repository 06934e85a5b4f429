//! # Offer Query
//!
//! Validated input of a cheapest-offers request.
//!
//! Validation happens here, before any downstream call is issued.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::application::query::OfferQuery;
//!
//! let query = OfferQuery::parse("CA", Some("suv"), None, Some(5)).unwrap();
//! assert_eq!(query.region().as_str(), "CA");
//! assert_eq!(query.max_results(), 5);
//!
//! assert!(OfferQuery::parse("CA", None, None, Some(21)).is_err());
//! ```

use crate::application::error::ApplicationResult;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{BodyType, FullType, OfferFilter, RegionCode};
use std::fmt;

/// Largest accepted `max_results`.
pub const MAX_RESULTS_LIMIT: usize = 20;

/// `max_results` used when the caller gives none.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// A validated cheapest-offers request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferQuery {
    region: RegionCode,
    filter: OfferFilter,
    max_results: usize,
}

impl OfferQuery {
    /// Creates a query.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MaxResultsOutOfBounds`] if `max_results` is
    /// outside `0..=20`.
    pub fn new(region: RegionCode, filter: OfferFilter, max_results: i64) -> DomainResult<Self> {
        let max_results = usize::try_from(max_results)
            .ok()
            .filter(|value| *value <= MAX_RESULTS_LIMIT)
            .ok_or(DomainError::MaxResultsOutOfBounds {
                value: max_results,
                limit: MAX_RESULTS_LIMIT,
            })?;
        Ok(Self {
            region,
            filter,
            max_results,
        })
    }

    /// Parses raw request parameters.
    ///
    /// Enum filters are case-insensitive; blank filter values count as absent.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for a malformed region code, an
    /// unknown enum value or an out-of-bounds result count.
    pub fn parse(
        region: &str,
        body_type: Option<&str>,
        full_type: Option<&str>,
        max_results: Option<i64>,
    ) -> ApplicationResult<Self> {
        let region = RegionCode::new(region)?;
        let body_type = non_blank(body_type).map(str::parse::<BodyType>).transpose()?;
        let full_type = non_blank(full_type).map(str::parse::<FullType>).transpose()?;
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS as i64);
        Ok(Self::new(
            region,
            OfferFilter::new(body_type, full_type),
            max_results,
        )?)
    }

    /// Returns the region code.
    #[inline]
    #[must_use]
    pub fn region(&self) -> &RegionCode {
        &self.region
    }

    /// Returns the vehicle filter.
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &OfferFilter {
        &self.filter
    }

    /// Returns the maximum number of offers to return.
    #[inline]
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

impl fmt::Display for OfferQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region={} {} max={}",
            self.region, self.filter, self.max_results
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
