//! # Offer Filter
//!
//! Optional exact-match predicates on vehicle classification.

use crate::domain::entities::DealerVehicle;
use crate::domain::value_objects::enums::{BodyType, FullType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter applied to each dealer's vehicles before pricing.
///
/// An absent predicate matches every vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferFilter {
    body_type: Option<BodyType>,
    full_type: Option<FullType>,
}

impl OfferFilter {
    /// Creates a filter from optional predicates.
    #[must_use]
    pub const fn new(body_type: Option<BodyType>, full_type: Option<FullType>) -> Self {
        Self {
            body_type,
            full_type,
        }
    }

    /// A filter that accepts every vehicle.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(None, None)
    }

    /// Restricts to a body type.
    #[must_use]
    pub const fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Restricts to a full type.
    #[must_use]
    pub const fn with_full_type(mut self, full_type: FullType) -> Self {
        self.full_type = Some(full_type);
        self
    }

    /// Returns the body type predicate.
    #[inline]
    #[must_use]
    pub const fn body_type(&self) -> Option<BodyType> {
        self.body_type
    }

    /// Returns the full type predicate.
    #[inline]
    #[must_use]
    pub const fn full_type(&self) -> Option<FullType> {
        self.full_type
    }

    /// Returns true if the vehicle passes both predicates.
    #[must_use]
    pub fn matches(&self, vehicle: &DealerVehicle) -> bool {
        self.body_type.is_none_or(|b| b == vehicle.body_type())
            && self.full_type.is_none_or(|f| f == vehicle.full_type())
    }
}

impl fmt::Display for OfferFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body_type.map_or("*", BodyType::as_str);
        let full = self.full_type.map_or("*", FullType::as_str);
        write!(f, "body={} full={}", body, full)
    }
}
