//! # Shared scheduler state and the engine hand-off.
//!
//! The active set, the pending queue, the completed set, and the lifecycle
//! flag are mutated from two sides: external threads calling
//! `submit`/`stop`, and the engine thread running the completion protocol.
//! One mutex guards all four together, so the admission check-then-insert
//! and the eviction-then-promotion steps are each a single critical
//! section.
//!
//! The hand-off of bound work to the engine is an unbounded `mpsc` channel:
//! submission stays non-blocking from any thread, and only the engine loop
//! ever turns a [`Bind`] into a spawned task.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::active::ActiveSet;
use crate::error::JobError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{BoxWork, DoneCallback, JobHandle, JobInner, PendingQueue};
use crate::subscribers::Subscribe;

/// Scheduler lifecycle; transitions are one-way.
///
/// `Stopping` suppresses promotion while the shutdown drain cancels running
/// jobs, so queued jobs are resolved without ever starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    New,
    Started,
    Stopping,
    Stopped,
}

/// A job bound (or about to be bound) to the engine.
pub(crate) struct Bind<T> {
    pub inner: Arc<JobInner<T>>,
    pub work: BoxWork<T>,
    pub callback: Option<DoneCallback<T>>,
}

/// The mutex-guarded half of the scheduler state.
pub(crate) struct SchedState<T> {
    pub lifecycle: Lifecycle,
    pub active: ActiveSet<T>,
    pub pending: PendingQueue<T>,
    pub completed: Vec<JobHandle<T>>,
}

/// State shared between the scheduler facade and the engine thread.
pub(crate) struct Shared<T> {
    state: Mutex<SchedState<T>>,
    pub bus: Bus,
    pub bind_tx: mpsc::UnboundedSender<Bind<T>>,
    pub loop_token: CancellationToken,
    pub subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T> Shared<T> {
    pub fn new(
        capacity: usize,
        bus: Bus,
        bind_tx: mpsc::UnboundedSender<Bind<T>>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            state: Mutex::new(SchedState {
                lifecycle: Lifecycle::New,
                active: ActiveSet::new(capacity),
                pending: PendingQueue::new(),
                completed: Vec::new(),
            }),
            bus,
            bind_tx,
            loop_token: CancellationToken::new(),
            subscribers,
        }
    }

    /// Locks the state, recovering it if a holder panicked.
    pub fn lock_state(&self) -> MutexGuard<'_, SchedState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolves a job as cancelled without it ever running.
    ///
    /// Used for queued jobs during the shutdown drain, and for jobs whose
    /// bind hand-off lost the race against engine shutdown. Bookkeeping
    /// (eviction, completed-set membership) happens before the outcome is
    /// visible and before the user callback fires.
    pub fn resolve_unbound_cancelled(
        &self,
        inner: Arc<JobInner<T>>,
        callback: Option<DoneCallback<T>>,
    ) {
        let handle = JobHandle::from_inner(Arc::clone(&inner));
        {
            let mut st = self.lock_state();
            st.active.remove(inner.id());
            st.completed.push(handle.clone());
        }
        inner.resolve(Err(JobError::Canceled));
        self.bus
            .publish(Event::new(EventKind::JobCancelled).with_job(inner.id()));
        if let Some(cb) = callback {
            cb(&handle);
        }
    }
}
