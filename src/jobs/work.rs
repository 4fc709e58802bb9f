//! # Work abstraction and closure-backed implementation.
//!
//! This module defines the [`Work`] trait (one-shot, async, cancelable) and
//! a convenient closure-backed implementation [`WorkFn`]. The common erased
//! form is [`BoxWork`], a `Box<dyn Work<T>>` suitable for parking on the
//! pending queue.
//!
//! A work item receives a [`CancellationToken`] and should periodically
//! check it to stop cooperatively; cancellation only takes effect at the
//! work's next suspension point, never preemptively.
//!
//! Validity of work is checked at compile time by the trait bound: a plain
//! value or an uninvoked function simply does not implement [`Work`]. Only
//! the [`untyped`](crate::jobs::untyped) boundary adapter performs runtime
//! validation, for callers handing in type-erased external input.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Boxed future produced by one work descriptor.
pub type BoxWorkFuture<T> = Pin<Box<dyn Future<Output = Result<T, JobError>> + Send + 'static>>;

/// Boxed, type-erased work descriptor.
pub type BoxWork<T> = Box<dyn Work<T>>;

/// # One-shot asynchronous, cancelable unit of work.
///
/// `Work` is consumed exactly once: [`run`](Work::run) takes `Box<Self>` and
/// returns the future that performs the computation. Implementors should
/// regularly check the token and exit promptly during shutdown.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use jobloop::{BoxWorkFuture, JobError, Work};
///
/// struct Fetch {
///     url: String,
/// }
///
/// impl Work<String> for Fetch {
///     fn run(self: Box<Self>, ctx: CancellationToken) -> BoxWorkFuture<String> {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(JobError::Canceled);
///             }
///             Ok(self.url)
///         })
///     }
/// }
/// ```
pub trait Work<T>: Send + 'static {
    /// Consumes the descriptor and returns the future performing the work.
    ///
    /// The token is the job's own cancellation token; checking it at
    /// suspension points makes cancellation prompt. The scheduler also
    /// races the returned future against the token, so work that never
    /// checks the token is still cancelable at its next await.
    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxWorkFuture<T>;
}

/// Closure-backed work implementation.
///
/// Wraps an `FnOnce` closure that *creates* the future when the job is
/// bound to the engine. The closure runs once; state it captures is owned
/// by the resulting future.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use jobloop::{JobError, WorkFn};
///
/// let work = WorkFn::new(|_ctx: CancellationToken| async move {
///     Ok::<_, JobError>(42)
/// });
/// ```
pub struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new closure-backed work descriptor.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the descriptor and returns it boxed (`Box<dyn Work<T>>`).
    pub fn boxed<T>(f: F) -> BoxWork<T>
    where
        WorkFn<F>: Work<T>,
    {
        Box::new(Self::new(f))
    }
}

impl<T, F, Fut> Work<T> for WorkFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    T: 'static,
{
    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxWorkFuture<T> {
        Box::pin((self.f)(ctx))
    }
}
