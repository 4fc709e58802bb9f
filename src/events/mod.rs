//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the scheduler and the
//! engine loop.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (admission, shutdown) and the engine loop
//!   (completion protocol, promotion).
//! - **Consumers**: the subscriber listener spawned on the engine runtime,
//!   and any external monitor holding a receiver from
//!   `Scheduler::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
