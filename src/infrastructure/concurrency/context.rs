//! # Request Context
//!
//! Per-request metadata (trace id, optional correlation id) carried across
//! task boundaries.
//!
//! The context lives in a Tokio task-local. Nothing is inherited implicitly:
//! a [`ContextSnapshot`] is captured when work is submitted and installed
//! around the submitted future, together with the submitter's tracing span.
//! The task-local scope is entered on every poll and left when the poll
//! returns, so a worker thread never keeps another request's context once
//! the task yields or completes.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::infrastructure::concurrency::context::{ContextSnapshot, RequestContext};
//!
//! # tokio_test::block_on(async {
//! let ctx = RequestContext::new().with_correlation_id("order-42");
//! let trace_id = ctx.trace_id();
//!
//! let seen = ctx
//!     .scope(async {
//!         let snapshot = ContextSnapshot::capture();
//!         tokio::spawn(snapshot.install(async { RequestContext::current() }))
//!             .await
//!             .unwrap()
//!     })
//!     .await;
//!
//! assert_eq!(seen.map(|c| c.trace_id()), Some(trace_id));
//! assert!(RequestContext::current().is_none());
//! # });
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio::task::futures::TaskLocalFuture;
use tracing::Span;
use tracing::instrument::{Instrument, Instrumented};
use uuid::Uuid;

/// Header carrying the trace id on inbound and outbound HTTP requests.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Header carrying the caller-supplied correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Maximum accepted correlation id length; longer values are truncated.
pub const MAX_CORRELATION_ID_LEN: usize = 128;

tokio::task_local! {
    static CURRENT_CONTEXT: Option<RequestContext>;
}

/// Trace identifier, rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generates a random trace id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Ambient metadata of one aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    trace_id: TraceId,
    correlation_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with a fresh trace id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_trace_id(TraceId::new_v4())
    }

    /// Creates a context continuing an existing trace.
    #[must_use]
    pub fn with_trace_id(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            correlation_id: None,
        }
    }

    /// Attaches a caller-supplied correlation id.
    ///
    /// Blank values are ignored and long values are truncated to
    /// [`MAX_CORRELATION_ID_LEN`] characters.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        let value: String = correlation_id.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.correlation_id = Some(trimmed.chars().take(MAX_CORRELATION_ID_LEN).collect());
        }
        self
    }

    /// Returns the trace id.
    #[inline]
    #[must_use]
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Returns the correlation id, if any.
    #[inline]
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the context installed in the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT_CONTEXT.try_with(Clone::clone).ok().flatten()
    }

    /// Runs `future` with this context installed.
    ///
    /// Any context the task had before is visible again once the returned
    /// future yields or completes.
    pub fn scope<F: Future>(self, future: F) -> TaskLocalFuture<Option<Self>, F> {
        CURRENT_CONTEXT.scope(Some(self), future)
    }

    /// Runs a synchronous closure with this context installed.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT_CONTEXT.sync_scope(Some(self), f)
    }

    /// Creates the root span for work done on behalf of this context.
    #[must_use]
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            trace_id = %self.trace_id,
            correlation_id = self.correlation_id.as_deref().unwrap_or("-"),
        )
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.correlation_id {
            Some(correlation) => write!(f, "trace={} correlation={}", self.trace_id, correlation),
            None => write!(f, "trace={}", self.trace_id),
        }
    }
}

/// Ambient state captured at submission time.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    context: Option<RequestContext>,
    span: Span,
}

impl ContextSnapshot {
    /// Captures the current request context and tracing span.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            context: RequestContext::current(),
            span: Span::current(),
        }
    }

    /// Returns the captured context.
    #[must_use]
    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    /// Wraps `future` so it runs with the captured context and span.
    ///
    /// The captured state replaces whatever context is active where the
    /// future is polled. An empty snapshot runs the future with no context,
    /// whether it is spawned or awaited in place.
    pub fn install<F: Future>(
        self,
        future: F,
    ) -> TaskLocalFuture<Option<RequestContext>, Instrumented<F>> {
        CURRENT_CONTEXT.scope(self.context, future.instrument(self.span))
    }
}
