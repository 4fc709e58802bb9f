//! # FIFO backlog of jobs awaiting a free execution slot.
//!
//! A [`PendingJob`] parks everything needed to bind a job later: its handle
//! core, the unbound work descriptor, and the optional completion callback.
//! [`PendingQueue`] is an unbounded strict-FIFO queue of them.
//!
//! ## Rules
//! - Dequeue order equals enqueue order; no reordering, no priorities.
//! - No removal by identity; a parked job leaves the queue only by
//!   promotion or by the shutdown drain.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::jobs::handle::{DoneCallback, JobInner};
use crate::jobs::work::BoxWork;

/// A job that arrived while the active set was full.
///
/// Holds the work descriptor unbound; it is handed to the engine only at
/// promotion time, so a job resolved by the shutdown drain never executes.
pub(crate) struct PendingJob<T> {
    /// Shared handle core (already visible to the submitter).
    pub inner: Arc<JobInner<T>>,
    /// The not-yet-bound work descriptor.
    pub work: BoxWork<T>,
    /// Optional user completion callback.
    pub callback: Option<DoneCallback<T>>,
}

/// Unbounded FIFO queue of parked jobs.
pub(crate) struct PendingQueue<T> {
    items: VecDeque<PendingJob<T>>,
}

impl<T> PendingQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Parks a job at the tail.
    pub fn push(&mut self, job: PendingJob<T>) {
        self.items.push_back(job);
    }

    /// Takes the oldest parked job, if any.
    pub fn pop(&mut self) -> Option<PendingJob<T>> {
        self.items.pop_front()
    }

    /// Returns a job to the head of the queue.
    ///
    /// Only used to hand back a just-popped job whose promotion could not
    /// take the freed slot, so FIFO order is preserved.
    pub fn push_front(&mut self, job: PendingJob<T>) {
        self.items.push_front(job);
    }

    /// Empties the queue, preserving FIFO order; used by the shutdown drain.
    pub fn drain(&mut self) -> Vec<PendingJob<T>> {
        self.items.drain(..).collect()
    }
}
