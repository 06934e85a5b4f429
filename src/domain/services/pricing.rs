//! # Pricing Engine
//!
//! Pure computation of a vehicle's final price.
//!
//! ```text
//! discounted = price - price * discount / 100
//! final      = discounted + discounted * overhead / 100
//! ```
//!
//! Integer division truncates toward zero. Whether a discount is eligible
//! at all is decided by the caller; this module takes the resolved percent
//! (zero when ineligible).
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::domain::services::pricing::final_price;
//! use vehicle_offers::domain::value_objects::Percent;
//!
//! let price = final_price(25_000, Percent::new(10).unwrap(), Percent::new(10).unwrap()).unwrap();
//! assert_eq!(price, 24_750);
//! ```

use crate::domain::value_objects::{ArithmeticError, ArithmeticResult, Percent};
use serde::Serialize;

/// Itemized price computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Base price reported by the manufacturer.
    pub manufacturer_price: i64,
    /// Discount percent applied.
    pub discount_percent: Percent,
    /// Amount removed by the discount.
    pub discount_amount: i64,
    /// Price after discount.
    pub discounted_price: i64,
    /// Dealer overhead percent.
    pub overhead_percent: Percent,
    /// Amount added by the overhead.
    pub overhead_amount: i64,
    /// Price after discount and overhead.
    pub final_price: i64,
}

impl PriceBreakdown {
    /// Computes the breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::InvalidValue`] for a negative base price and
    /// [`ArithmeticError::Overflow`] if any step does not fit in an `i64`.
    pub fn compute(
        manufacturer_price: i64,
        discount_percent: Percent,
        overhead_percent: Percent,
    ) -> ArithmeticResult<Self> {
        if manufacturer_price < 0 {
            return Err(ArithmeticError::InvalidValue("negative manufacturer price"));
        }

        let discount_amount = if discount_percent.is_zero() {
            0
        } else {
            discount_percent.portion_of(manufacturer_price)?
        };
        let discounted_price = manufacturer_price
            .checked_sub(discount_amount)
            .ok_or(ArithmeticError::Underflow)?;

        let overhead_amount = overhead_percent.portion_of(discounted_price)?;
        let final_price = discounted_price
            .checked_add(overhead_amount)
            .ok_or(ArithmeticError::Overflow)?;

        Ok(Self {
            manufacturer_price,
            discount_percent,
            discount_amount,
            discounted_price,
            overhead_percent,
            overhead_amount,
            final_price,
        })
    }
}

/// Computes the final price of a vehicle.
///
/// # Errors
///
/// See [`PriceBreakdown::compute`].
pub fn final_price(
    manufacturer_price: i64,
    discount_percent: Percent,
    overhead_percent: Percent,
) -> ArithmeticResult<i64> {
    PriceBreakdown::compute(manufacturer_price, discount_percent, overhead_percent)
        .map(|b| b.final_price)
}
