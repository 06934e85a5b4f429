//! # Worker Pool
//!
//! Bounded execution resource for the aggregation fan-out.
//!
//! The pool runs tasks on the current Tokio runtime and adds three bounds
//! on top of it:
//!
//! - **Execution slots** (`max_size`): at most this many leaf calls, submitted
//!   with [`WorkerPool::execute`], run at once.
//! - **Wait queue** (`queue_capacity`): at most this many calls from outside
//!   the pool wait for a slot; further outside submissions fail with
//!   [`PoolError::Saturated`]. Calls made by the pool's own tasks always wait,
//!   so work that was admitted is slowed down, never cut short.
//! - **Drain**: [`WorkerPool::shutdown`] stops outside submissions and waits
//!   for every task still running, including children those tasks spawn.
//!
//! Branch tasks submitted with [`WorkerPool::spawn_in`] hold no slot. A branch
//! awaits its children without pinning a slot, and a leaf never waits on
//! other pool work, so nested fan-out cannot starve the pool.
//!
//! Every submission captures the caller's [`RequestContext`] and tracing span
//! and installs them around the task.
//!
//! `core_size` and `keep_alive` configure the runtime itself; see
//! [`PoolConfig::runtime_builder`].
//!
//! [`RequestContext`]: crate::infrastructure::concurrency::context::RequestContext

use crate::infrastructure::concurrency::context::ContextSnapshot;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::task::{AbortHandle, JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Default number of runtime worker threads.
pub const DEFAULT_CORE_SIZE: usize = 10;

/// Default number of concurrent execution slots.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default number of calls allowed to wait for a slot.
pub const DEFAULT_QUEUE_CAPACITY: usize = 300;

/// Default idle keep-alive for blocking threads.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(10);

/// Default drain timeout on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Default runtime thread name prefix.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "offer-worker";

tokio::task_local! {
    static POOL_MEMBERSHIP: usize;
}

/// Error type for pool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool no longer accepts work.
    #[error("worker pool is shut down")]
    ShutDown,

    /// All slots are busy and the wait queue is full.
    #[error("worker pool saturated: {queue_capacity} call(s) already waiting")]
    Saturated {
        /// Configured queue capacity.
        queue_capacity: usize,
    },

    /// The task panicked.
    #[error("pool task panicked: {0}")]
    TaskPanicked(String),

    /// The task was aborted before completing.
    #[error("pool task cancelled")]
    TaskCancelled,

    /// Shutdown gave up waiting for running tasks.
    #[error("worker pool did not drain: {remaining} task(s) still running")]
    DrainTimeout {
        /// Tasks still running when the timeout fired.
        remaining: usize,
    },

    /// Configuration is inconsistent.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}

impl PoolError {
    /// Returns true if the submission was refused rather than failed.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ShutDown | Self::Saturated { .. })
    }

    /// Returns true if the task panicked.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::TaskPanicked(_))
    }
}

impl From<JoinError> for PoolError {
    fn from(error: JoinError) -> Self {
        if error.is_panic() {
            Self::TaskPanicked(error.to_string())
        } else {
            Self::TaskCancelled
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Pool sizing and lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Runtime worker threads.
    pub core_size: usize,
    /// Concurrent execution slots.
    pub max_size: usize,
    /// Calls allowed to wait for a slot.
    pub queue_capacity: usize,
    /// Idle keep-alive of runtime blocking threads.
    pub keep_alive: Duration,
    /// How long shutdown waits for running tasks.
    pub shutdown_timeout: Duration,
    /// Runtime thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_size: DEFAULT_CORE_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            keep_alive: DEFAULT_KEEP_ALIVE,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime worker thread count.
    #[must_use]
    pub fn with_core_size(mut self, core_size: usize) -> Self {
        self.core_size = core_size;
        self
    }

    /// Sets the number of execution slots.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the wait queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Sets the blocking thread keep-alive.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the shutdown drain timeout.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Sets the runtime thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if a size is zero, the core size
    /// exceeds the max size, or the thread name prefix is blank.
    pub fn validate(&self) -> PoolResult<()> {
        if self.core_size == 0 {
            return Err(PoolError::InvalidConfig("core_size must be at least 1".into()));
        }
        if self.max_size == 0 {
            return Err(PoolError::InvalidConfig("max_size must be at least 1".into()));
        }
        if self.core_size > self.max_size {
            return Err(PoolError::InvalidConfig(format!(
                "core_size {} exceeds max_size {}",
                self.core_size, self.max_size
            )));
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(PoolError::InvalidConfig("thread_name_prefix must not be blank".into()));
        }
        Ok(())
    }

    /// Returns a multi-thread runtime builder sized by this configuration.
    ///
    /// `core_size` becomes the worker thread count, `max_size` caps the
    /// blocking threads and `keep_alive` is their idle timeout. Threads are
    /// named `{prefix}-{n}`.
    #[must_use]
    pub fn runtime_builder(&self) -> tokio::runtime::Builder {
        let prefix = self.thread_name_prefix.clone();
        let counter = Arc::new(AtomicUsize::new(0));
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder
            .worker_threads(self.core_size.max(1))
            .max_blocking_threads(self.max_size.max(1))
            .thread_keep_alive(self.keep_alive)
            .thread_name_fn(move || {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                format!("{prefix}-{n}")
            })
            .enable_all();
        builder
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetrics {
    /// Tasks submitted and not yet finished.
    pub in_flight: usize,
    /// Leaf calls waiting for a slot.
    pub queued: usize,
    /// Free execution slots.
    pub available_slots: usize,
    /// Configured execution slots.
    pub max_size: usize,
    /// Whether outside submissions are accepted.
    pub accepting: bool,
}

#[derive(Debug)]
struct PoolInner {
    config: PoolConfig,
    slots: Arc<Semaphore>,
    queued: AtomicUsize,
    in_flight: AtomicUsize,
    drained: Notify,
    accepting: AtomicBool,
}

/// Bounded, context-propagating task pool.
///
/// Cloning is cheap; clones share the same slots and counters.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Creates a pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(PoolInner {
                slots: Arc::new(Semaphore::new(config.max_size)),
                queued: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                drained: Notify::new(),
                accepting: AtomicBool::new(true),
                config,
            }),
        })
    }

    /// Returns the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Returns current counters.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            in_flight: self.inner.in_flight.load(Ordering::Acquire),
            queued: self.inner.queued.load(Ordering::Acquire),
            available_slots: self.inner.slots.available_permits(),
            max_size: self.inner.config.max_size,
            accepting: self.inner.accepting.load(Ordering::Acquire),
        }
    }

    /// Returns true until shutdown has started.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.inner.accepting.load(Ordering::Acquire)
    }

    /// Spawns a branch task into `set`.
    ///
    /// The task holds no execution slot and runs with the caller's context.
    /// Dropping the set aborts it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] if shutdown has started and the caller
    /// is not itself a task of this pool.
    pub fn spawn_in<T, F>(&self, set: &mut JoinSet<T>, future: F) -> PoolResult<AbortHandle>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.admit()?;
        Ok(set.spawn(self.wrap(future)))
    }

    /// Runs a leaf call on an execution slot and returns its output.
    ///
    /// Waits for a free slot if all are busy. Dropping the returned future
    /// aborts the call and frees its slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Saturated`] if the caller is not a task of this
    /// pool and the wait queue is full,
    /// [`PoolError::ShutDown`] if the pool is closed to the caller, and
    /// [`PoolError::TaskPanicked`] if the call panicked.
    pub async fn execute<T, F>(&self, future: F) -> PoolResult<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.admit()?;
        let permit = self.acquire_slot().await?;
        let task = self.wrap(async move {
            let _permit = permit;
            future.await
        });
        AbortOnDrop(tokio::spawn(task)).await.map_err(PoolError::from)
    }

    /// Stops accepting outside work and waits for running tasks to finish.
    ///
    /// Tasks already in the pool may keep submitting children until the pool
    /// drains. Once drained (or on timeout) the execution slots are closed.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DrainTimeout`] if tasks are still running after
    /// the configured shutdown timeout.
    pub async fn shutdown(&self) -> PoolResult<()> {
        self.inner.accepting.store(false, Ordering::Release);
        let timeout = self.inner.config.shutdown_timeout;
        info!(
            in_flight = self.inner.in_flight.load(Ordering::Acquire),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Draining worker pool"
        );

        let result = tokio::time::timeout(timeout, self.drained()).await;
        self.inner.slots.close();

        match result {
            Ok(()) => {
                info!("Worker pool drained");
                Ok(())
            }
            Err(_) => {
                let remaining = self.inner.in_flight.load(Ordering::Acquire);
                warn!(remaining, "Worker pool drain timed out");
                Err(PoolError::DrainTimeout { remaining })
            }
        }
    }

    async fn drained(&self) {
        loop {
            let notified = self.inner.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.inner.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn is_member(&self) -> bool {
        let id = self.id();
        POOL_MEMBERSHIP.try_with(|member| *member == id).unwrap_or(false)
    }

    fn admit(&self) -> PoolResult<()> {
        if self.is_accepting() || self.is_member() {
            Ok(())
        } else {
            Err(PoolError::ShutDown)
        }
    }

    async fn acquire_slot(&self) -> PoolResult<OwnedSemaphorePermit> {
        match Arc::clone(&self.inner.slots).try_acquire_owned() {
            Ok(permit) => return Ok(permit),
            Err(TryAcquireError::Closed) => return Err(PoolError::ShutDown),
            Err(TryAcquireError::NoPermits) => {}
        }

        let _waiting = if self.is_member() {
            QueueSlot::enter(&self.inner)
        } else {
            QueueSlot::reserve(&self.inner)?
        };
        debug!(queued = self.inner.queued.load(Ordering::Relaxed), "Waiting for execution slot");
        Arc::clone(&self.inner.slots)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)
    }

    fn wrap<F>(&self, future: F) -> impl Future<Output = F::Output> + Send + 'static
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = InFlight::enter(Arc::clone(&self.inner));
        let snapshot = ContextSnapshot::capture();
        POOL_MEMBERSHIP.scope(self.id(), async move {
            let _guard = guard;
            snapshot.install(future).await
        })
    }
}

struct InFlight(Arc<PoolInner>);

impl InFlight {
    fn enter(inner: Arc<PoolInner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        Self(inner)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.drained.notify_waiters();
        }
    }
}

struct QueueSlot<'a>(&'a PoolInner);

impl<'a> QueueSlot<'a> {
    fn enter(inner: &'a PoolInner) -> Self {
        inner.queued.fetch_add(1, Ordering::AcqRel);
        Self(inner)
    }

    fn reserve(inner: &'a PoolInner) -> PoolResult<Self> {
        let capacity = inner.config.queue_capacity;
        if inner.queued.fetch_add(1, Ordering::AcqRel) >= capacity {
            inner.queued.fetch_sub(1, Ordering::AcqRel);
            return Err(PoolError::Saturated {
                queue_capacity: capacity,
            });
        }
        Ok(Self(inner))
    }
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.queued.fetch_sub(1, Ordering::AcqRel);
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
