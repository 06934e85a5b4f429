//! # Domain Services
//!
//! Stateless domain computations.
//!
//! - [`pricing`]: final price from base price, discount and dealer overhead

pub mod pricing;

pub use pricing::{PriceBreakdown, final_price};
