//! # Global scheduler configuration.
//!
//! Provides [`SchedulerConfig`], centralized settings for one scheduler
//! instance.
//!
//! ## Sentinel values
//! - `capacity = 0` → clamped to 1 by [`SchedulerConfig::capacity_clamped`]
//! - `bus_capacity = 0` → clamped to 1 by the bus

/// Configuration for a scheduler instance.
///
/// Defines:
/// - **Admission control**: how many jobs may run concurrently
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `capacity`: hard cap on concurrently running jobs; overflow is queued
///   in submission order and promoted as slots free
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Maximum number of jobs running concurrently (the active set size).
    ///
    /// Fixed for the lifetime of the scheduler. Values below 1 are clamped.
    pub capacity: usize,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl SchedulerConfig {
    /// Creates a configuration with the given concurrency cap.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Returns the concurrency cap clamped to a minimum of 1.
    ///
    /// A zero-capacity active set would deadlock admission, so the scheduler
    /// always uses this accessor rather than the raw field.
    #[inline]
    pub fn capacity_clamped(&self) -> usize {
        self.capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `capacity = 100`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 100,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.capacity, 100);
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        let cfg = SchedulerConfig::with_capacity(0);
        assert_eq!(cfg.capacity_clamped(), 1);
    }

    #[test]
    fn test_with_capacity_keeps_other_defaults() {
        let cfg = SchedulerConfig::with_capacity(5);
        assert_eq!(cfg.capacity, 5);
        assert_eq!(cfg.bus_capacity, 1024);
    }
}
