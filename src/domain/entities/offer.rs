//! # Aggregated Offer
//!
//! The priced result for one vehicle at one dealer, and the key used to
//! deduplicate offers within a request.

use crate::domain::entities::dealer::{Dealer, DealerVehicle};
use crate::domain::value_objects::{
    BodyType, DealerId, FullType, ManufacturerId, RegionCode, VehicleId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an offer within one aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferKey {
    region: RegionCode,
    dealer_id: DealerId,
    vehicle_id: VehicleId,
}

impl OfferKey {
    /// Creates an offer key.
    #[must_use]
    pub fn new(region: RegionCode, dealer_id: DealerId, vehicle_id: VehicleId) -> Self {
        Self {
            region,
            dealer_id,
            vehicle_id,
        }
    }

    /// Returns the region code.
    #[inline]
    #[must_use]
    pub fn region(&self) -> &RegionCode {
        &self.region
    }

    /// Returns the dealer id.
    #[inline]
    #[must_use]
    pub fn dealer_id(&self) -> DealerId {
        self.dealer_id
    }

    /// Returns the vehicle id.
    #[inline]
    #[must_use]
    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }
}

impl fmt::Display for OfferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-D{}-C{}", self.region, self.dealer_id, self.vehicle_id)
    }
}

/// A vehicle offer with its final price.
///
/// Serialized in camelCase for the REST surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedOffer {
    vehicle_id: VehicleId,
    model: String,
    year: u16,
    dealer_id: DealerId,
    dealer_name: String,
    final_price: i64,
    manufacturer_name: String,
    manufacturer_id: ManufacturerId,
    full_type: FullType,
    body_type: BodyType,
}

impl AggregatedOffer {
    /// Builds an offer from the dealer, the vehicle and its final price.
    #[must_use]
    pub fn new(dealer: &Dealer, vehicle: &DealerVehicle, final_price: i64) -> Self {
        Self {
            vehicle_id: vehicle.id(),
            model: vehicle.model().to_string(),
            year: vehicle.year(),
            dealer_id: dealer.id(),
            dealer_name: dealer.name().to_string(),
            final_price,
            manufacturer_name: vehicle.manufacturer_name().to_string(),
            manufacturer_id: vehicle.manufacturer_id(),
            full_type: vehicle.full_type(),
            body_type: vehicle.body_type(),
        }
    }

    /// Returns the dedup key of this offer within a region.
    #[must_use]
    pub fn key(&self, region: &RegionCode) -> OfferKey {
        OfferKey::new(region.clone(), self.dealer_id, self.vehicle_id)
    }

    /// Returns the vehicle id.
    #[inline]
    #[must_use]
    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
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

    /// Returns the dealer id.
    #[inline]
    #[must_use]
    pub fn dealer_id(&self) -> DealerId {
        self.dealer_id
    }

    /// Returns the dealer name.
    #[inline]
    #[must_use]
    pub fn dealer_name(&self) -> &str {
        &self.dealer_name
    }

    /// Returns the final price after discount and overhead.
    #[inline]
    #[must_use]
    pub fn final_price(&self) -> i64 {
        self.final_price
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

impl fmt::Display for AggregatedOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offer(D{} C{} {} {} price={})",
            self.dealer_id, self.vehicle_id, self.manufacturer_name, self.model, self.final_price
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Percent;

    fn sample() -> (Dealer, DealerVehicle) {
        let vehicle = DealerVehicle::new(
            VehicleId::new(11),
            "Model Y",
            2024,
            "Tesla",
            ManufacturerId::new(3),
            FullType::Electric,
            BodyType::Suv,
        );
        let dealer = Dealer::new(
            DealerId::new(2),
            "Bay Motors",
            Percent::new(10).unwrap(),
            vec![vehicle.clone()],
        );
        (dealer, vehicle)
    }

    #[test]
    fn copies_dealer_and_vehicle_fields() {
        let (dealer, vehicle) = sample();
        let offer = AggregatedOffer::new(&dealer, &vehicle, 24_750);
        assert_eq!(offer.vehicle_id(), VehicleId::new(11));
        assert_eq!(offer.dealer_id(), DealerId::new(2));
        assert_eq!(offer.dealer_name(), "Bay Motors");
        assert_eq!(offer.final_price(), 24_750);
        assert_eq!(offer.manufacturer_id(), ManufacturerId::new(3));
        assert_eq!(offer.full_type(), FullType::Electric);
        assert_eq!(offer.body_type(), BodyType::Suv);
    }

    #[test]
    fn key_display() {
        let (dealer, vehicle) = sample();
        let offer = AggregatedOffer::new(&dealer, &vehicle, 1);
        let key = offer.key(&RegionCode::new("CA").unwrap());
        assert_eq!(key.to_string(), "CA-D2-C11");
    }

    #[test]
    fn serializes_camel_case() {
        let (dealer, vehicle) = sample();
        let offer = AggregatedOffer::new(&dealer, &vehicle, 24_750);
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["vehicleId"], 11);
        assert_eq!(json["dealerName"], "Bay Motors");
        assert_eq!(json["finalPrice"], 24_750);
        assert_eq!(json["fullType"], "ELECTRIC");
        assert_eq!(json["bodyType"], "SUV");
    }
}
