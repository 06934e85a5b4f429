//! # Region Entity
//!
//! A pricing jurisdiction with a price threshold and a discount catalog.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::domain::entities::{DiscountRule, Region};
//! use vehicle_offers::domain::value_objects::{FullType, Percent, RegionCode};
//!
//! let region = Region::new(
//!     1,
//!     RegionCode::new("CA").unwrap(),
//!     20_000,
//!     vec![DiscountRule::new(1, "EV rebate", Percent::new(10).unwrap(), FullType::Electric)],
//! );
//!
//! assert!(region.discount_rule_for(FullType::Electric, 25_000).is_some());
//! assert!(region.discount_rule_for(FullType::Electric, 20_000).is_none());
//! assert!(region.discount_rule_for(FullType::Diesel, 25_000).is_none());
//! ```

use crate::domain::value_objects::{FullType, Percent, RegionCode};
use std::collections::HashSet;
use std::fmt;

/// Discount schedule entry for one full type within a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountRule {
    id: u32,
    name: String,
    percent: Percent,
    full_type: FullType,
}

impl DiscountRule {
    /// Creates a discount rule.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, percent: Percent, full_type: FullType) -> Self {
        Self {
            id,
            name: name.into(),
            percent,
            full_type,
        }
    }

    /// Returns the rule id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the rule name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the catalog percent advertised with the rule.
    #[inline]
    #[must_use]
    pub fn percent(&self) -> Percent {
        self.percent
    }

    /// Returns the full type this rule applies to.
    #[inline]
    #[must_use]
    pub fn full_type(&self) -> FullType {
        self.full_type
    }
}

/// A pricing region.
///
/// The catalog may list several rules for one [`FullType`]; the first one
/// listed is the one that applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: u32,
    code: RegionCode,
    price_limit: i64,
    discounts: Vec<DiscountRule>,
}

impl Region {
    /// Creates a region.
    #[must_use]
    pub fn new(id: u32, code: RegionCode, price_limit: i64, discounts: Vec<DiscountRule>) -> Self {
        Self {
            id,
            code,
            price_limit,
            discounts,
        }
    }

    /// Returns the region id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the region code.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &RegionCode {
        &self.code
    }

    /// Returns the price above which discounts may apply.
    #[inline]
    #[must_use]
    pub fn price_limit(&self) -> i64 {
        self.price_limit
    }

    /// Returns the discount catalog.
    #[inline]
    #[must_use]
    pub fn discounts(&self) -> &[DiscountRule] {
        &self.discounts
    }

    /// Returns full types listed by more than one rule, in catalog order.
    #[must_use]
    pub fn shadowed_full_types(&self) -> Vec<FullType> {
        let mut seen = HashSet::with_capacity(self.discounts.len());
        let mut shadowed = Vec::new();
        for full_type in self.discounts.iter().map(DiscountRule::full_type) {
            if !seen.insert(full_type) && !shadowed.contains(&full_type) {
                shadowed.push(full_type);
            }
        }
        shadowed
    }

    /// Returns the first rule for a full type regardless of price.
    #[must_use]
    pub fn rule_for(&self, full_type: FullType) -> Option<&DiscountRule> {
        self.discounts.iter().find(|r| r.full_type() == full_type)
    }

    /// Returns the applicable rule when the price is strictly above the
    /// region limit and a rule exists for the full type.
    #[must_use]
    pub fn discount_rule_for(&self, full_type: FullType, price: i64) -> Option<&DiscountRule> {
        if price > self.price_limit {
            self.rule_for(full_type)
        } else {
            None
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region({} limit={} discounts={})",
            self.code,
            self.price_limit,
            self.discounts.len()
        )
    }
}
