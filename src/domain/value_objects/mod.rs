//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`RegionCode`]: validated region code
//! - [`DealerId`], [`VehicleId`], [`ManufacturerId`]: numeric downstream ids
//!
//! ## Numeric Types
//!
//! - [`Percent`]: whole-number percentage in `[0, 100]`
//! - [`ArithmeticError`]: checked arithmetic failure
//!
//! ## Classification
//!
//! - [`FullType`], [`BodyType`]: closed vehicle enumerations
//! - [`OfferFilter`]: optional predicates over them

pub mod arithmetic;
pub mod enums;
pub mod ids;
pub mod offer_filter;
pub mod percent;

pub use arithmetic::{ArithmeticError, ArithmeticResult};
pub use enums::{BodyType, FullType, ParseEnumError};
pub use ids::{DealerId, ManufacturerId, RegionCode, VehicleId};
pub use offer_filter::OfferFilter;
pub use percent::Percent;
