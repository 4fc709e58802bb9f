//! # Bounded set of currently running jobs.
//!
//! [`ActiveSet`] holds the handles of jobs that are bound to the engine and
//! executing. Its capacity is fixed at scheduler construction and is the
//! concurrency cap.
//!
//! ## Rules
//! - `len() <= capacity` always; [`ActiveSet::try_insert`] refuses when full
//!   rather than dropping entries.
//! - Admission and eviction happen under the scheduler's state mutex, so
//!   the check-then-insert step is a single atomic operation there.

use std::collections::HashMap;

use crate::jobs::{JobHandle, JobId};

/// Returned by [`ActiveSet::try_insert`] when every slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveSetFull;

/// Bounded collection of running jobs, keyed by job id.
pub(crate) struct ActiveSet<T> {
    slots: HashMap<JobId, JobHandle<T>>,
    capacity: usize,
}

impl<T> ActiveSet<T> {
    /// Creates an empty set with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Inserts the handle iff a slot is free.
    ///
    /// This is the single admission step: callers branch on the result
    /// instead of checking fullness separately.
    pub fn try_insert(&mut self, handle: JobHandle<T>) -> Result<(), ActiveSetFull> {
        if self.is_full() {
            return Err(ActiveSetFull);
        }
        self.slots.insert(handle.id(), handle);
        Ok(())
    }

    /// Evicts a job by id, freeing its slot.
    pub fn remove(&mut self, id: JobId) -> Option<JobHandle<T>> {
        self.slots.remove(&id)
    }

    /// Snapshot of all running handles; used by the shutdown drain.
    pub fn handles(&self) -> Vec<JobHandle<T>> {
        self.slots.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobInner;

    fn handle() -> JobHandle<i32> {
        JobHandle::from_inner(JobInner::new())
    }

    #[test]
    fn test_capacity_enforced() {
        let mut set = ActiveSet::new(2);
        assert!(set.try_insert(handle()).is_ok());
        assert!(set.try_insert(handle()).is_ok());
        assert!(set.is_full());
        assert_eq!(set.try_insert(handle()), Err(ActiveSetFull));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut set = ActiveSet::new(1);
        let h = handle();
        let id = h.id();
        set.try_insert(h).expect("slot free");
        assert!(set.is_full());

        assert!(set.remove(id).is_some());
        assert!(set.is_empty());
        assert!(set.try_insert(handle()).is_ok());
    }

    #[test]
    fn test_remove_unknown_id_is_none() {
        let mut set = ActiveSet::<i32>::new(1);
        assert!(set.remove(99_999).is_none());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let set = ActiveSet::<i32>::new(0);
        assert_eq!(set.capacity(), 1);
    }
}
