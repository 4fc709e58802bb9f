//! # jobloop
//!
//! **jobloop** is a bounded background job scheduler for Rust.
//!
//! It runs asynchronous units of work ("jobs") on a dedicated execution
//! loop thread while enforcing a hard cap on concurrently running jobs,
//! queuing overflow in submission order, and promoting queued jobs as
//! running slots free. The crate is designed as a building block for
//! services that need a single-process admission controller in front of an
//! async runtime.
//!
//! ## Architecture
//! ```text
//!   caller threads                         engine thread (one per scheduler)
//! ┌────────────────┐   submit / stop    ┌──────────────────────────────────┐
//! │ Scheduler<T>   │ ─────────────────► │ current-thread tokio runtime     │
//! │  ├─ ActiveSet  │   (one mutex +     │  ├─ bind loop (mpsc)             │
//! │  ├─ PendingQ   │    mpsc hand-off)  │  ├─ wrapper task per job         │
//! │  └─ completed  │ ◄───────────────── │  │    (work vs. CancellationTok) │
//! └───────┬────────┘  completion proto  │  └─ subscriber listener          │
//!         │                             └───────────────┬──────────────────┘
//!         ▼                                             ▼
//!   JobHandle<T>                                  Bus (broadcast)
//!   result()/cancel()/state()                     Event { seq, kind, job }
//! ```
//!
//! ## Lifecycle
//! ```text
//! Scheduler: New ──start()──► Started ──stop()──► Stopped      (one-way)
//!
//! Job:       Pending ──promotion──► Running ──► Finished
//!               │                      ├──────► Failed
//!               │                      └──────► Cancelled
//!               └───── shutdown drain ────────► Cancelled
//! ```
//!
//! ## Semantics
//! - **Admission**: `submit` is non-blocking from any thread. A free slot
//!   means the job starts now (`Running` handle); a full active set means
//!   the job parks on an unbounded FIFO (`Pending` handle).
//! - **Promotion**: when a job reaches a terminal state, the completion
//!   protocol evicts it and promotes the oldest pending job in the same
//!   critical section, so `active ≤ capacity` holds at every instant.
//! - **Cancellation** is cooperative: it takes effect at the job's next
//!   suspension point, never preemptively.
//! - **Shutdown**: `stop()` cancels and awaits every running job, resolves
//!   every queued job as cancelled without starting it, then stops the
//!   loop. No timeouts, retries, or priorities exist anywhere.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use jobloop::{JobError, Scheduler, SchedulerConfig, WorkFn};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched: Scheduler<String> = Scheduler::new(SchedulerConfig::with_capacity(8));
//!     sched.start()?;
//!
//!     let handle = sched.submit(
//!         WorkFn::new(|ctx: CancellationToken| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(JobError::Canceled);
//!             }
//!             tokio::time::sleep(Duration::from_millis(50)).await;
//!             Ok("hello from job".to_string())
//!         }),
//!         None,
//!     )?;
//!
//!     println!("{}", handle.result()?);
//!     sched.stop()?;
//!     sched.join(Duration::from_secs(5))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.

mod config;
mod core;
mod error;
mod events;
mod jobs;
mod subscribers;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use core::{Scheduler, SchedulerStatus};
pub use error::{JobError, SchedulerError, SubmitError};
pub use events::{Bus, Event, EventKind};
pub use jobs::untyped;
pub use jobs::{BoxWork, BoxWorkFuture, DoneCallback, JobHandle, JobId, JobState, Work, WorkFn};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
