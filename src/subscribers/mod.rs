//! # Event subscribers for the jobloop runtime.
//!
//! This module provides the [`Subscribe`] trait for handling runtime events
//! broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler / engine ── publish(Event) ──► Bus ──► listener (engine runtime)
//!                                                        │
//!                                                   ┌────┴────┬────────┐
//!                                                   ▼         ▼        ▼
//!                                                LogWriter  Metrics  Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use jobloop::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::JobFailed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod subscribe;

pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
