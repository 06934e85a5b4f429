//! # Downstream Wire Types
//!
//! JSON bodies returned by the provider HTTP API and their conversion into
//! domain entities. Conversion failures are reported as
//! [`DownstreamError::InvalidResponse`].

use crate::domain::entities::{Dealer, DealerSummary, DealerVehicle, DiscountRule, Region};
use crate::domain::value_objects::{
    BodyType, DealerId, FullType, ManufacturerId, Percent, RegionCode, VehicleId,
};
use crate::infrastructure::downstream::error::DownstreamError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Region body of `GET /state/code/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    /// Region id.
    pub id: u32,
    /// Region code.
    pub code: String,
    /// Price above which discounts apply.
    pub price_limit: i64,
    /// Discount schedule.
    #[serde(default)]
    pub discounts: Vec<DiscountResponse>,
}

/// Discount rule inside a [`RegionResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    /// Rule id.
    pub id: u32,
    /// Rule name.
    pub name: String,
    /// Discount percent.
    #[serde(default)]
    pub percent: i64,
    /// Full type the rule applies to.
    #[serde(rename = "type", alias = "fullType")]
    pub full_type: String,
}

/// `{id, name}` pair used for dealer lists and manufacturers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdNameResponse {
    /// Identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
}

/// Dealer body of `GET /dealer/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerResponse {
    /// Dealer id.
    pub id: u32,
    /// Dealer name.
    pub name: String,
    /// Overhead percent.
    pub overhead: i64,
    /// Vehicles in stock.
    #[serde(default)]
    pub cars: Vec<CarResponse>,
}

/// Vehicle inside a [`DealerResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    /// Vehicle id.
    pub id: u32,
    /// Model name.
    pub model: String,
    /// Manufacturer.
    pub manufacturer: IdNameResponse,
    /// Model year.
    pub year: i64,
    /// Propulsion type.
    pub full_type: String,
    /// Body type.
    #[serde(rename = "type")]
    pub body_type: String,
}

fn invalid(context: &str, error: impl std::fmt::Display) -> DownstreamError {
    DownstreamError::invalid_response(format!("{context}: {error}"))
}

impl TryFrom<DiscountResponse> for DiscountRule {
    type Error = DownstreamError;

    fn try_from(value: DiscountResponse) -> Result<Self, Self::Error> {
        let percent = Percent::new(value.percent).map_err(|e| invalid("discount percent", e))?;
        let full_type: FullType = value
            .full_type
            .parse()
            .map_err(|e| invalid("discount full type", e))?;
        Ok(DiscountRule::new(value.id, value.name, percent, full_type))
    }
}

impl TryFrom<RegionResponse> for Region {
    type Error = DownstreamError;

    fn try_from(value: RegionResponse) -> Result<Self, Self::Error> {
        let code = RegionCode::new(&value.code).map_err(|e| invalid("region code", e))?;
        let discounts = value
            .discounts
            .into_iter()
            .map(DiscountRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let region = Region::new(value.id, code, value.price_limit, discounts);
        for full_type in region.shadowed_full_types() {
            warn!(
                region = %region.code(),
                full_type = %full_type,
                "Region lists several discount rules for one full type; using the first"
            );
        }
        Ok(region)
    }
}

impl From<IdNameResponse> for DealerSummary {
    fn from(value: IdNameResponse) -> Self {
        DealerSummary::new(DealerId::new(value.id), value.name)
    }
}

impl TryFrom<CarResponse> for DealerVehicle {
    type Error = DownstreamError;

    fn try_from(value: CarResponse) -> Result<Self, Self::Error> {
        let year = u16::try_from(value.year).map_err(|e| invalid("vehicle year", e))?;
        let full_type: FullType = value
            .full_type
            .parse()
            .map_err(|e| invalid("vehicle full type", e))?;
        let body_type: BodyType = value
            .body_type
            .parse()
            .map_err(|e| invalid("vehicle body type", e))?;
        Ok(DealerVehicle::new(
            VehicleId::new(value.id),
            value.model,
            year,
            value.manufacturer.name,
            ManufacturerId::new(value.manufacturer.id),
            full_type,
            body_type,
        ))
    }
}

impl TryFrom<DealerResponse> for Dealer {
    type Error = DownstreamError;

    fn try_from(value: DealerResponse) -> Result<Self, Self::Error> {
        let overhead = Percent::new(value.overhead).map_err(|e| invalid("dealer overhead", e))?;
        let vehicles = value
            .cars
            .into_iter()
            .map(DealerVehicle::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dealer::new(
            DealerId::new(value.id),
            value.name,
            overhead,
            vehicles,
        ))
    }
}
