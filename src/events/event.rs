//! # Runtime events emitted by the scheduler and the engine loop.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Admission events**: a job entered the system (started now or queued)
//! - **Lifecycle events**: terminal transitions and promotions
//! - **Engine events**: the execution loop itself (start, shutdown, stop)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! job id, and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::jobs::JobId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// A job was admitted into the active set and bound to the engine.
    ///
    /// Sets: `job`, `at`, `seq`
    JobStarted,

    /// The active set was full; the job was parked on the pending queue.
    ///
    /// Sets: `job`, `at`, `seq`
    JobQueued,

    /// A queued job was promoted into a freed slot and bound to the engine.
    ///
    /// Sets: `job`, `at`, `seq`
    JobPromoted,

    // === Terminal events ===
    /// A job finished successfully.
    ///
    /// Sets: `job`, `at`, `seq`
    JobFinished,

    /// A job failed; the error is stored in its outcome slot.
    ///
    /// Sets: `job`, `reason`, `at`, `seq`
    JobFailed,

    /// A job was cancelled (individually or by shutdown).
    ///
    /// Sets: `job`, `at`, `seq`
    JobCancelled,

    // === Engine events ===
    /// The engine loop started on its dedicated thread.
    ///
    /// Sets: `at`, `seq`
    EngineStarted,

    /// Shutdown was requested; the drain sequence is beginning.
    ///
    /// Sets: `at`, `seq`
    ShutdownRequested,

    /// The engine loop exited.
    ///
    /// Sets: `at`, `seq`
    EngineStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Id of the job, if applicable.
    pub job: Option<JobId>,
    /// Human-readable reason (failure message, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            reason: None,
        }
    }

    /// Attaches a job id.
    #[inline]
    pub fn with_job(mut self, job: JobId) -> Self {
        self.job = Some(job);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns `true` if this event marks a job's terminal transition.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::JobFinished | EventKind::JobFailed | EventKind::JobCancelled
        )
    }
}
