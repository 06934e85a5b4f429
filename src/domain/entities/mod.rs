//! # Domain Entities
//!
//! Request-scoped, immutable records built from downstream responses.
//!
//! - [`Region`] / [`DiscountRule`]: pricing jurisdiction and its discounts
//! - [`DealerSummary`] / [`Dealer`] / [`DealerVehicle`]: dealers and inventory
//! - [`AggregatedOffer`] / [`OfferKey`]: priced output and its identity

pub mod dealer;
pub mod offer;
pub mod region;

pub use dealer::{Dealer, DealerSummary, DealerVehicle};
pub use offer::{AggregatedOffer, OfferKey};
pub use region::{DiscountRule, Region};
