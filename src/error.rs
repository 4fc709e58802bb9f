//! Error types used by the jobloop runtime and jobs.
//!
//! This module defines three error enums:
//!
//! - [`SchedulerError`] — lifecycle errors raised by the scheduler itself.
//! - [`SubmitError`] — errors surfaced synchronously by `submit` and the
//!   untyped boundary adapter.
//! - [`JobError`] — terminal outcome of a single job (failure or
//!   cancellation), stored in the job's outcome slot.
//!
//! All types provide `as_label()` for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by scheduler lifecycle operations.
///
/// These represent misuse of the scheduler's one-way lifecycle
/// (`New → Started → Stopped`) or failures of the engine thread itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// `start()` was called more than once.
    #[error("scheduler already started")]
    AlreadyStarted,

    /// `stop()` or `join()` was called before `start()`.
    #[error("scheduler is not started")]
    NotStarted,

    /// `stop()` was called on a scheduler that is already stopping or stopped.
    ///
    /// Restart is unsupported; the lifecycle transition is one-way.
    #[error("scheduler already stopped")]
    AlreadyStopped,

    /// The OS refused to spawn the engine thread.
    #[error("failed to spawn engine thread: {error}")]
    EngineSpawn {
        /// The underlying I/O error message.
        error: String,
    },

    /// The engine thread did not exit within the grace period passed to `join`.
    #[error("engine did not stop within {grace:?}")]
    GraceExceeded {
        /// The grace duration that was exceeded.
        grace: Duration,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::AlreadyStarted => "scheduler_already_started",
            SchedulerError::NotStarted => "scheduler_not_started",
            SchedulerError::AlreadyStopped => "scheduler_already_stopped",
            SchedulerError::EngineSpawn { .. } => "scheduler_engine_spawn",
            SchedulerError::GraceExceeded { .. } => "scheduler_grace_exceeded",
        }
    }
}

/// # Errors returned synchronously by submission.
///
/// These are the only errors a caller of `submit` observes directly;
/// everything that happens to a job after admission is reported through its
/// [`JobHandle`](crate::JobHandle) outcome instead.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The untyped boundary payload was not a recognized work descriptor
    /// (for example a plain value or an uninvoked function).
    ///
    /// No job is created when this is returned.
    #[error("invalid work payload: {reason}")]
    InvalidWork {
        /// Short description of why the payload was rejected.
        reason: &'static str,
    },

    /// The scheduler is stopping or stopped; new work is not accepted.
    #[error("scheduler is shut down")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::InvalidWork { .. } => "submit_invalid_work",
            SubmitError::Closed => "submit_closed",
        }
    }
}

/// # Terminal outcome error of a single job.
///
/// Stored in the job's outcome slot and re-surfaced by
/// [`JobHandle::result`](crate::JobHandle::result) and
/// [`JobHandle::exception`](crate::JobHandle::exception). A job's failure is
/// local to that job; it never affects other jobs or the engine.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The work item itself failed.
    #[error("job failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The job was cancelled, either individually or by shutdown.
    #[error("job cancelled")]
    Canceled,
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Failed { .. } => "job_failed",
            JobError::Canceled => "job_canceled",
        }
    }

    /// Returns `true` if this outcome is a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, JobError::Canceled)
    }

    /// Wraps an arbitrary error as a job failure.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        JobError::Failed {
            error: error.to_string(),
        }
    }
}
