//! # Domain Enums
//!
//! Closed vehicle classifications used throughout the offer aggregation:
//!
//! - [`FullType`] - Propulsion type (electric, gasoline, ...)
//! - [`BodyType`] - Structural category (sedan, SUV, truck)
//!
//! Both enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits. Parsing trims and uppercases its
//! input and rejects anything outside the enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vehicle propulsion type.
///
/// Discount rules are keyed by this classification.
///
/// # Examples
///
/// ```
/// use vehicle_offers::domain::value_objects::enums::FullType;
///
/// let full_type: FullType = "electric".parse().unwrap();
/// assert_eq!(full_type, FullType::Electric);
/// assert_eq!(full_type.to_string(), "ELECTRIC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum FullType {
    /// Battery electric.
    Electric = 0,
    /// Gasoline combustion engine.
    Gasoline = 1,
    /// Diesel combustion engine.
    Diesel = 2,
    /// Hybrid drivetrain.
    Hybrid = 3,
    /// Special-purpose vehicles.
    Special = 4,
}

impl FullType {
    /// All full types, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Electric,
        Self::Gasoline,
        Self::Diesel,
        Self::Hybrid,
        Self::Special,
    ];

    /// Returns the canonical wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electric => "ELECTRIC",
            Self::Gasoline => "GASOLINE",
            Self::Diesel => "DIESEL",
            Self::Hybrid => "HYBRID",
            Self::Special => "SPECIAL",
        }
    }
}

impl fmt::Display for FullType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FullType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ELECTRIC" => Ok(Self::Electric),
            "GASOLINE" => Ok(Self::Gasoline),
            "DIESEL" => Ok(Self::Diesel),
            "HYBRID" => Ok(Self::Hybrid),
            "SPECIAL" => Ok(Self::Special),
            _ => Err(ParseEnumError::InvalidValue("FullType", s.to_string())),
        }
    }
}

/// Vehicle body type.
///
/// # Examples
///
/// ```
/// use vehicle_offers::domain::value_objects::enums::BodyType;
///
/// assert_eq!(" suv ".parse::<BodyType>().unwrap(), BodyType::Suv);
/// assert!("coupe".parse::<BodyType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BodyType {
    /// Sedan.
    Sedan = 0,
    /// Sport utility vehicle.
    Suv = 1,
    /// Pickup or light truck.
    Truck = 2,
}

impl BodyType {
    /// All body types, in declaration order.
    pub const ALL: [Self; 3] = [Self::Sedan, Self::Suv, Self::Truck];

    /// Returns the canonical wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sedan => "SEDAN",
            Self::Suv => "SUV",
            Self::Truck => "TRUCK",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SEDAN" => Ok(Self::Sedan),
            "SUV" => Ok(Self::Suv),
            "TRUCK" => Ok(Self::Truck),
            _ => Err(ParseEnumError::InvalidValue("BodyType", s.to_string())),
        }
    }
}

/// Error type for parsing enum values from strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    #[error("invalid {0} value: '{1}'")]
    InvalidValue(&'static str, String),
}
