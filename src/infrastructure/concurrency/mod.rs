//! # Concurrency Substrate
//!
//! Bounded task execution and request context propagation.
//!
//! - [`context`]: task-local [`RequestContext`] and submission-time snapshots
//! - [`pool`]: [`WorkerPool`] with execution slots, wait queue and drain

pub mod context;
pub mod pool;

pub use context::{ContextSnapshot, RequestContext, TraceId};
pub use pool::{PoolConfig, PoolError, PoolMetrics, PoolResult, WorkerPool};
