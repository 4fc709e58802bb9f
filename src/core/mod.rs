//! Runtime core: admission control and the execution loop.
//!
//! This module contains the embedded implementation of the jobloop runtime.
//! The public API from this module is [`Scheduler`] plus its
//! [`SchedulerStatus`] snapshot.
//!
//! Internal modules:
//! - [`active`]: bounded set of currently running jobs;
//! - [`state`]: shared mutable state (one mutex guards the active set, the
//!   pending queue, and the completed set together) and the bind hand-off;
//! - [`engine`]: dedicated thread owning the tokio runtime, the bind loop,
//!   and the completion protocol;
//! - [`scheduler`]: public operations (start/stop/submit/status).

mod active;
mod engine;
mod scheduler;
mod state;

pub use scheduler::{Scheduler, SchedulerStatus};
