//! # Job abstractions: work descriptors, handles, and the pending backlog.
//!
//! This module provides the core job-related types:
//! - [`Work`] — trait for one-shot async cancelable units of work
//! - [`WorkFn`] — closure-backed work implementation
//! - [`JobHandle`] — shared handle to one submitted job and its outcome
//! - [`JobState`] — the per-job state machine
//! - [`untyped`] — boundary adapter validating untyped external payloads

pub mod untyped;

mod handle;
mod pending;
mod work;

pub use handle::{DoneCallback, JobHandle, JobId, JobState};
pub use work::{BoxWork, BoxWorkFuture, Work, WorkFn};

pub(crate) use handle::JobInner;
pub(crate) use pending::{PendingJob, PendingQueue};
