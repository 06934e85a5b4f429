//! # Domain Layer
//!
//! Entities, value objects and pure pricing logic. Nothing in this layer
//! performs I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
