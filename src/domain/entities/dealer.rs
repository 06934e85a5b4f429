//! # Dealer Entity
//!
//! Dealers, their overhead markup, and the vehicles they stock.

use crate::domain::value_objects::{
    BodyType, DealerId, FullType, ManufacturerId, Percent, VehicleId,
};
use std::fmt;

/// Dealer entry as returned by the dealer-list lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerSummary {
    id: DealerId,
    name: String,
}

impl DealerSummary {
    /// Creates a dealer summary.
    #[must_use]
    pub fn new(id: DealerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the dealer id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DealerId {
        self.id
    }

    /// Returns the dealer name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A vehicle stocked by a dealer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerVehicle {
    id: VehicleId,
    model: String,
    year: u16,
    manufacturer_name: String,
    manufacturer_id: ManufacturerId,
    full_type: FullType,
    body_type: BodyType,
}

impl DealerVehicle {
    /// Creates a dealer vehicle.
    #[must_use]
    pub fn new(
        id: VehicleId,
        model: impl Into<String>,
        year: u16,
        manufacturer_name: impl Into<String>,
        manufacturer_id: ManufacturerId,
        full_type: FullType,
        body_type: BodyType,
    ) -> Self {
        Self {
            id,
            model: model.into(),
            year,
            manufacturer_name: manufacturer_name.into(),
            manufacturer_id,
            full_type,
            body_type,
        }
    }

    /// Returns the vehicle id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// Returns the model name.
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the model year.
    #[inline]
    #[must_use]
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Returns the manufacturer name.
    #[inline]
    #[must_use]
    pub fn manufacturer_name(&self) -> &str {
        &self.manufacturer_name
    }

    /// Returns the manufacturer id.
    #[inline]
    #[must_use]
    pub fn manufacturer_id(&self) -> ManufacturerId {
        self.manufacturer_id
    }

    /// Returns the propulsion type.
    #[inline]
    #[must_use]
    pub fn full_type(&self) -> FullType {
        self.full_type
    }

    /// Returns the body type.
    #[inline]
    #[must_use]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }
}

impl fmt::Display for DealerVehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}/{})",
            self.year, self.manufacturer_name, self.model, self.full_type, self.body_type
        )
    }
}

/// A dealer with its overhead and inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dealer {
    id: DealerId,
    name: String,
    overhead: Percent,
    vehicles: Vec<DealerVehicle>,
}

impl Dealer {
    /// Creates a dealer.
    #[must_use]
    pub fn new(
        id: DealerId,
        name: impl Into<String>,
        overhead: Percent,
        vehicles: Vec<DealerVehicle>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            overhead,
            vehicles,
        }
    }

    /// Returns the dealer id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DealerId {
        self.id
    }

    /// Returns the dealer name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the overhead applied after any discount.
    #[inline]
    #[must_use]
    pub fn overhead(&self) -> Percent {
        self.overhead
    }

    /// Returns the stocked vehicles.
    #[inline]
    #[must_use]
    pub fn vehicles(&self) -> &[DealerVehicle] {
        &self.vehicles
    }
}

impl fmt::Display for Dealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dealer({} '{}' overhead={} vehicles={})",
            self.id,
            self.name,
            self.overhead,
            self.vehicles.len()
        )
    }
}
