//! # Identifiers
//!
//! Identity types for regions, dealers, vehicles and manufacturers.
//!
//! Numeric ids are transparent newtypes over the downstream integer ids.
//! [`RegionCode`] is validated because it is interpolated into downstream
//! URL paths.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length of a region code.
pub const MAX_REGION_CODE_LEN: usize = 16;

/// Code identifying a pricing region (for example `CA` or `NY`).
///
/// # Examples
///
/// ```
/// use vehicle_offers::domain::value_objects::RegionCode;
///
/// let code = RegionCode::new(" CA ").unwrap();
/// assert_eq!(code.as_str(), "CA");
/// assert!(RegionCode::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Creates a region code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidRegionCode`] if the code is empty, longer
    /// than [`MAX_REGION_CODE_LEN`], or contains anything but ASCII letters,
    /// digits, `-` and `_`.
    pub fn new(code: impl AsRef<str>) -> DomainResult<Self> {
        let raw = code.as_ref();
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_REGION_CODE_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidRegionCode(raw.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw downstream id.
            #[inline]
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw id.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Dealer identifier.
    DealerId
);
numeric_id!(
    /// Vehicle identifier, as known to the manufacturer price catalog.
    VehicleId
);
numeric_id!(
    /// Manufacturer identifier.
    ManufacturerId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn region_code_trims() {
        assert_eq!(RegionCode::new("  TX").unwrap().as_str(), "TX");
    }

    #[test]
    fn region_code_rejects_invalid() {
        assert!(RegionCode::new("").is_err());
        assert!(RegionCode::new("   ").is_err());
        assert!(RegionCode::new("C A").is_err());
        assert!(RegionCode::new("CA/dealers").is_err());
        assert!(RegionCode::new("A".repeat(MAX_REGION_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn region_code_accepts_separators() {
        assert!(RegionCode::new("us-west_2").is_ok());
    }

    #[test]
    fn region_code_serde() {
        let code: RegionCode = serde_json::from_str("\"NY\"").unwrap();
        assert_eq!(code.as_str(), "NY");
        assert!(serde_json::from_str::<RegionCode>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"NY\"");
    }

    #[test]
    fn numeric_ids_are_transparent() {
        let id = DealerId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        assert_eq!(serde_json::from_str::<VehicleId>("12").unwrap(), VehicleId::new(12));
        assert_eq!(ManufacturerId::from(3).get(), 3);
        assert_eq!(id.to_string(), "7");
    }
}
