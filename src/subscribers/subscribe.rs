//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the runtime. Subscribers are driven by a listener task on the
//! engine runtime, sequentially per event.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the engine runtime's listener task. Implementations should
/// avoid blocking the runtime (prefer async I/O and cooperative waits);
/// slow subscribers delay later subscribers and may lag the bus, skipping
/// older events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
