//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`OfferAggregationEngine`]: Concurrent offer collection, pricing and ranking
//! - [`RankingStrategy`]: Strategies for ranking offers

pub mod offer_aggregation;
pub mod ranking_strategy;

pub use offer_aggregation::{
    AggregationConfig, AggregationReport, AggregationStats, OfferAggregationEngine,
};
pub use ranking_strategy::{CheapestFirst, RankingStrategy};
