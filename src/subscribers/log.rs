//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [engine-started]
//! [started] job=0
//! [queued] job=1
//! [finished] job=0
//! [promoted] job=1
//! [failed] job=1 err="job failed: boom"
//! [shutdown-requested]
//! [engine-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Constructs a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::EngineStarted => {
                println!("[engine-started]");
            }
            EventKind::EngineStopped => {
                println!("[engine-stopped]");
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::JobStarted => {
                println!("[started] job={:?}", e.job);
            }
            EventKind::JobQueued => {
                println!("[queued] job={:?}", e.job);
            }
            EventKind::JobPromoted => {
                println!("[promoted] job={:?}", e.job);
            }
            EventKind::JobFinished => {
                println!("[finished] job={:?}", e.job);
            }
            EventKind::JobCancelled => {
                println!("[cancelled] job={:?}", e.job);
            }
            EventKind::JobFailed => {
                println!("[failed] job={:?} err={:?}", e.job, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
