//! # API Layer
//!
//! Inbound surfaces of the service.

pub mod rest;
