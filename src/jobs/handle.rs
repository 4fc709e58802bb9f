//! # Job handle and per-job state machine.
//!
//! A [`JobHandle`] is the caller's view of one submitted job. It is shared
//! between the scheduler (for bookkeeping) and the external caller (for
//! querying the outcome); the caller never mutates scheduler-internal state
//! through it.
//!
//! ## State machine
//! ```text
//! Pending ──► Running ──► Finished
//!    │           ├──────► Failed
//!    │           └──────► Cancelled
//!    └──────────────────► Cancelled   (shutdown drain only)
//! ```
//!
//! ## Rules
//! - Terminal states are absorbing; the outcome slot is written exactly once.
//! - `result()` blocks the **calling thread** (condvar wait), not the engine.
//! - Repeated `result()`/`exception()` calls on a terminal job return
//!   identical values.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Global sequence counter for job ids.
static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique id of a submitted job.
pub type JobId = u64;

/// Completion callback invoked once the job reaches a terminal state.
///
/// Runs on the engine thread (or on the thread draining shutdown), strictly
/// **after** scheduler bookkeeping for that job has completed. Callbacks
/// must not block; long work belongs in another job.
pub type DoneCallback<T> = Arc<dyn Fn(&JobHandle<T>) + Send + Sync>;

/// State of a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Queued on the pending backlog, not bound to the engine.
    Pending,
    /// Bound to the engine and executing.
    Running,
    /// Completed successfully; the outcome slot holds the value.
    Finished,
    /// The work item failed; the outcome slot holds the error.
    Failed,
    /// Cancelled, individually or by shutdown.
    Cancelled,
}

impl JobState {
    /// Returns `true` for `Finished`, `Failed`, and `Cancelled`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Finished | JobState::Failed | JobState::Cancelled
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

/// State and outcome slot, guarded together by one mutex.
struct JobCell<T> {
    state: JobState,
    outcome: Option<Result<T, JobError>>,
}

/// Shared core of one job; owned jointly by handles and the scheduler.
pub(crate) struct JobInner<T> {
    id: JobId,
    token: CancellationToken,
    cell: Mutex<JobCell<T>>,
    cv: Condvar,
}

impl<T> JobInner<T> {
    /// Allocates a fresh job in the `Pending` state.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: JOB_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            token: CancellationToken::new(),
            cell: Mutex::new(JobCell {
                state: JobState::Pending,
                outcome: None,
            }),
            cv: Condvar::new(),
        })
    }

    pub(crate) fn id(&self) -> JobId {
        self.id
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Recovers the cell even if a waiter panicked while holding the lock.
    fn lock_cell(&self) -> MutexGuard<'_, JobCell<T>> {
        self.cell.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Transitions `Pending → Running` at promotion/admission time.
    ///
    /// Returns `false` if the job is not pending (already terminal).
    pub(crate) fn mark_running(&self) -> bool {
        let mut cell = self.lock_cell();
        if cell.state == JobState::Pending {
            cell.state = JobState::Running;
            true
        } else {
            false
        }
    }

    /// Records the terminal outcome and wakes all `result()` waiters.
    ///
    /// Fires at most once; later calls are ignored, which keeps terminal
    /// states absorbing even if completion and shutdown race.
    pub(crate) fn resolve(&self, outcome: Result<T, JobError>) -> bool {
        let mut cell = self.lock_cell();
        if cell.state.is_terminal() {
            return false;
        }
        cell.state = match &outcome {
            Ok(_) => JobState::Finished,
            Err(JobError::Canceled) => JobState::Cancelled,
            Err(JobError::Failed { .. }) => JobState::Failed,
        };
        cell.outcome = Some(outcome);
        drop(cell);
        self.cv.notify_all();
        true
    }

    pub(crate) fn state(&self) -> JobState {
        self.lock_cell().state
    }
}

/// Shared handle to one submitted job.
///
/// Cloning is cheap; all clones observe the same state and outcome.
pub struct JobHandle<T> {
    inner: Arc<JobInner<T>>,
}

impl<T> Clone for JobHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// Manual impl: the outcome slot does not require `T: Debug`.
impl<T> fmt::Debug for JobHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state())
            .finish()
    }
}

impl<T> JobHandle<T> {
    pub(crate) fn from_inner(inner: Arc<JobInner<T>>) -> Self {
        Self { inner }
    }

    /// Returns the job's unique id.
    pub fn id(&self) -> JobId {
        self.inner.id
    }

    /// Returns the job's current state.
    pub fn state(&self) -> JobState {
        self.inner.state()
    }

    /// Returns `true` once the job reached a terminal state.
    pub fn done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Returns `true` if the job's terminal outcome is a cancellation.
    pub fn cancelled(&self) -> bool {
        self.state() == JobState::Cancelled
    }

    /// Requests cooperative cancellation of a running job.
    ///
    /// Returns `true` iff a cancellation request was issued. Cancellation
    /// takes effect at the job's next suspension point; observe the result
    /// through [`JobHandle::result`] afterwards.
    ///
    /// Cancelling a still-`Pending` (queued) job is **unsupported**: the
    /// FIFO backlog offers no removal by identity, so this is a no-op that
    /// returns `false`. Terminal jobs also return `false`.
    pub fn cancel(&self) -> bool {
        let state = self.inner.state();
        if state != JobState::Running {
            return false;
        }
        self.inner.token.cancel();
        true
    }

    /// Returns the stored failure or cancellation, if any.
    ///
    /// `None` while the job is not terminal, and for finished jobs.
    pub fn exception(&self) -> Option<JobError> {
        let cell = self.inner.lock_cell();
        match &cell.outcome {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Cancels the token unconditionally; used by the shutdown drain.
    pub(crate) fn force_cancel(&self) {
        self.inner.token.cancel();
    }

    /// Blocks the calling thread until the job is terminal.
    ///
    /// No timeout exists; absent cancellation this waits indefinitely.
    pub(crate) fn wait_terminal(&self) -> JobState {
        let mut cell = self.inner.lock_cell();
        while !cell.state.is_terminal() {
            cell = self
                .inner
                .cv
                .wait(cell)
                .unwrap_or_else(|e| e.into_inner());
        }
        cell.state
    }
}

impl<T: Clone> JobHandle<T> {
    /// Blocks the calling thread until the job is terminal, then returns the
    /// value or the stored failure/cancellation.
    ///
    /// Idempotent: repeated calls return identical values. No timeout
    /// exists; absent cancellation this waits indefinitely.
    pub fn result(&self) -> Result<T, JobError> {
        let mut cell = self.inner.lock_cell();
        while cell.outcome.is_none() {
            cell = self
                .inner
                .cv
                .wait(cell)
                .unwrap_or_else(|e| e.into_inner());
        }
        match &cell.outcome {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(JobError::Canceled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let inner = JobInner::<i32>::new();
        let handle = JobHandle::from_inner(inner);
        assert_eq!(handle.state(), JobState::Pending);
        assert!(!handle.done());
        assert!(!handle.cancelled());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = JobInner::<i32>::new();
        let b = JobInner::<i32>::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_mark_running_only_from_pending() {
        let inner = JobInner::<i32>::new();
        assert!(inner.mark_running());
        assert!(!inner.mark_running());
        assert_eq!(inner.state(), JobState::Running);
    }

    #[test]
    fn test_resolve_fires_once() {
        let inner = JobInner::<i32>::new();
        inner.mark_running();
        assert!(inner.resolve(Ok(1)));
        assert!(!inner.resolve(Err(JobError::Canceled)));

        let handle = JobHandle::from_inner(inner);
        assert_eq!(handle.state(), JobState::Finished);
        assert_eq!(handle.result(), Ok(1));
    }

    #[test]
    fn test_result_is_idempotent() {
        let inner = JobInner::<i32>::new();
        inner.mark_running();
        inner.resolve(Err(JobError::failed("boom")));

        let handle = JobHandle::from_inner(inner);
        assert_eq!(handle.result(), handle.result());
        assert_eq!(handle.exception(), Some(JobError::failed("boom")));
        assert_eq!(handle.state(), JobState::Failed);
    }

    #[test]
    fn test_cancelled_outcome() {
        let inner = JobInner::<i32>::new();
        inner.resolve(Err(JobError::Canceled));

        let handle = JobHandle::from_inner(inner);
        assert!(handle.cancelled());
        assert!(handle.done());
        assert_eq!(handle.result(), Err(JobError::Canceled));
    }

    #[test]
    fn test_cancel_is_noop_for_pending_and_terminal() {
        let inner = JobInner::<i32>::new();
        let handle = JobHandle::from_inner(Arc::clone(&inner));
        assert!(!handle.cancel());

        inner.mark_running();
        assert!(handle.cancel());

        inner.resolve(Err(JobError::Canceled));
        assert!(!handle.cancel());
    }

    #[test]
    fn test_debug_works_without_debug_output_type() {
        struct Opaque;
        let inner = JobInner::<Opaque>::new();
        inner.mark_running();

        let handle = JobHandle::from_inner(inner);
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("JobHandle"));
        assert!(rendered.contains("Running"));
    }

    #[test]
    fn test_result_wakes_across_threads() {
        let inner = JobInner::<i32>::new();
        inner.mark_running();
        let handle = JobHandle::from_inner(Arc::clone(&inner));

        let waiter = std::thread::spawn(move || handle.result());
        std::thread::sleep(std::time::Duration::from_millis(50));
        inner.resolve(Ok(9));

        assert_eq!(waiter.join().expect("waiter panicked"), Ok(9));
    }
}
