//! # Ranking Strategy
//!
//! Strategies for ordering and truncating aggregated offers.
//!
//! This module provides the [`RankingStrategy`] trait and the
//! [`CheapestFirst`] implementation used by the aggregation engine.

use crate::domain::entities::AggregatedOffer;
use std::cmp::Ordering;
use std::fmt;

/// Trait for ranking strategies.
///
/// Implementations must be deterministic: the same offers in any input
/// order produce the same output.
pub trait RankingStrategy: Send + Sync + fmt::Debug {
    /// Orders `offers` best first and keeps at most `max_results`.
    fn rank(&self, offers: Vec<AggregatedOffer>, max_results: usize) -> Vec<AggregatedOffer>;

    /// Returns the name of this ranking strategy.
    fn name(&self) -> &'static str;
}

/// Lowest final price first.
///
/// Ties resolve by dealer id, then vehicle id, both ascending.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestFirst;

impl CheapestFirst {
    /// Creates a new cheapest-first strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Total order used for ranking.
    #[must_use]
    pub fn compare(a: &AggregatedOffer, b: &AggregatedOffer) -> Ordering {
        a.final_price()
            .cmp(&b.final_price())
            .then_with(|| a.dealer_id().cmp(&b.dealer_id()))
            .then_with(|| a.vehicle_id().cmp(&b.vehicle_id()))
    }
}

impl RankingStrategy for CheapestFirst {
    fn rank(&self, mut offers: Vec<AggregatedOffer>, max_results: usize) -> Vec<AggregatedOffer> {
        if max_results == 0 {
            return Vec::new();
        }
        offers.sort_by(Self::compare);
        offers.truncate(max_results);
        offers
    }

    fn name(&self) -> &'static str {
        "CheapestFirst"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{Dealer, DealerVehicle};
    use crate::domain::value_objects::{
        BodyType, DealerId, FullType, ManufacturerId, Percent, VehicleId,
    };

    fn offer(dealer: u32, vehicle: u32, price: i64) -> AggregatedOffer {
        let v = DealerVehicle::new(
            VehicleId::new(vehicle),
            "Model",
            2023,
            "Maker",
            ManufacturerId::new(1),
            FullType::Gasoline,
            BodyType::Sedan,
        );
        let d = Dealer::new(DealerId::new(dealer), "Dealer", Percent::ZERO, vec![v.clone()]);
        AggregatedOffer::new(&d, &v, price)
    }

    fn ids(offers: &[AggregatedOffer]) -> Vec<(u32, u32)> {
        offers
            .iter()
            .map(|o| (o.dealer_id().get(), o.vehicle_id().get()))
            .collect()
    }

    #[test]
    fn sorts_by_price() {
        let ranked = CheapestFirst.rank(
            vec![offer(1, 1, 300), offer(1, 2, 100), offer(2, 3, 200)],
            10,
        );
        let prices: Vec<i64> = ranked.iter().map(AggregatedOffer::final_price).collect();
        assert_eq!(prices, vec![100, 200, 300]);
    }

    #[test]
    fn breaks_ties_by_dealer_then_vehicle() {
        let ranked = CheapestFirst.rank(
            vec![offer(2, 1, 100), offer(1, 9, 100), offer(1, 3, 100)],
            10,
        );
        assert_eq!(ids(&ranked), vec![(1, 3), (1, 9), (2, 1)]);
    }

    #[test]
    fn truncates() {
        let ranked = CheapestFirst.rank(
            vec![offer(1, 1, 3), offer(1, 2, 1), offer(1, 3, 2)],
            2,
        );
        assert_eq!(ids(&ranked), vec![(1, 2), (1, 3)]);
    }

    #[test]
    fn returns_all_when_fewer() {
        assert_eq!(CheapestFirst.rank(vec![offer(1, 1, 5)], 3).len(), 1);
    }

    #[test]
    fn zero_yields_empty() {
        assert!(CheapestFirst.rank(vec![offer(1, 1, 5)], 0).is_empty());
    }

    #[test]
    fn order_independent() {
        let a = vec![offer(1, 1, 5), offer(2, 2, 5), offer(3, 3, 1)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(CheapestFirst.rank(a, 3), CheapestFirst.rank(b, 3));
    }

    #[test]
    fn name() {
        assert_eq!(CheapestFirst::new().name(), "CheapestFirst");
    }
}
