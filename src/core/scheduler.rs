//! # Scheduler: admission control, lifecycle, and the public API.
//!
//! The [`Scheduler`] owns the engine thread's lifetime, the bounded active
//! set, and the FIFO pending queue. External callers invoke
//! [`submit`](Scheduler::submit), [`submit_many`](Scheduler::submit_many),
//! [`stop`](Scheduler::stop), and `JobHandle::cancel` from arbitrary
//! threads; the hand-off into the engine is an unbounded channel, never
//! direct mutation of the loop from the calling thread.
//!
//! ## Data flow
//! ```text
//! caller ──► submit ──► admission check (one lock)
//!                          ├─ slot free ──► ActiveSet + Bind ──► engine runs job
//!                          └─ full ───────► PendingQueue (FIFO)
//! engine ──► completion protocol ──► slot freed ──► next pending promoted
//! ```
//!
//! ## Known hazards (deliberate, documented)
//! - `stop()` does not join the engine thread before returning; use
//!   [`join`](Scheduler::join) for a bounded wait.
//! - Dropping the scheduler without calling `stop()` leaves the engine
//!   thread parked on its bind loop until the process exits.
//! - `stop()` blocks on running jobs with no timeout; a job that ignores
//!   its cancellation token and never suspends stalls the drain.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};

use crate::config::SchedulerConfig;
use crate::core::engine;
use crate::core::state::{Bind, Lifecycle, Shared};
use crate::error::{SchedulerError, SubmitError};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::untyped::{self, WorkPayload};
use crate::jobs::{BoxWork, DoneCallback, JobHandle, JobInner, PendingJob, Work};
use crate::subscribers::Subscribe;

/// Eventually-consistent size snapshot for monitors.
///
/// `active + pending + completed` equals the total number of jobs
/// submitted so far; each job is in exactly one of the three sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Jobs currently bound to the engine and executing.
    pub active: usize,
    /// Jobs parked on the FIFO backlog.
    pub pending: usize,
    /// Jobs that reached a terminal state.
    pub completed: usize,
    /// The concurrency cap (fixed at construction).
    pub capacity: usize,
}

/// Background job scheduler with a hard concurrency cap.
///
/// Generic over the job output type `T`. Lifecycle is one-way:
/// `New → Started → Stopped`; restart is unsupported.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use jobloop::{JobError, Scheduler, SchedulerConfig, WorkFn};
///
/// let sched: Scheduler<u64> = Scheduler::new(SchedulerConfig::with_capacity(4));
/// sched.start()?;
///
/// let handle = sched.submit(
///     WorkFn::new(|_ctx| async move {
///         tokio::time::sleep(Duration::from_millis(100)).await;
///         Ok::<_, JobError>(7)
///     }),
///     None,
/// )?;
///
/// assert_eq!(handle.result(), Ok(7));
/// sched.stop()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Scheduler<T> {
    shared: Arc<Shared<T>>,
    bind_rx: Mutex<Option<mpsc::UnboundedReceiver<Bind<T>>>>,
    engine: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates a scheduler with the given configuration and no subscribers.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self::with_subscribers(cfg, Vec::new())
    }

    /// Creates a scheduler with event subscribers for observability.
    ///
    /// Subscribers run on the engine runtime and receive every event
    /// published after [`start`](Scheduler::start).
    pub fn with_subscribers(cfg: SchedulerConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (bind_tx, bind_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new(
            cfg.capacity_clamped(),
            bus,
            bind_tx,
            subscribers,
        ));
        Self {
            shared,
            bind_rx: Mutex::new(Some(bind_rx)),
            engine: Mutex::new(None),
        }
    }

    /// Starts the execution loop on a dedicated thread.
    ///
    /// Fails with [`SchedulerError::AlreadyStarted`] on any call after the
    /// first; the lifecycle guard makes double-start a hard error instead
    /// of undefined behavior.
    pub fn start(&self) -> Result<(), SchedulerError> {
        {
            let mut st = self.shared.lock_state();
            match st.lifecycle {
                Lifecycle::New => st.lifecycle = Lifecycle::Started,
                _ => return Err(SchedulerError::AlreadyStarted),
            }
        }

        let rx = {
            let mut slot = self.bind_rx.lock().unwrap_or_else(|e| e.into_inner());
            match slot.take() {
                Some(rx) => rx,
                None => return Err(SchedulerError::AlreadyStarted),
            }
        };

        let shared = Arc::clone(&self.shared);
        let token = self.shared.loop_token.clone();
        let spawned = thread::Builder::new()
            .name("jobloop-engine".into())
            .spawn(move || {
                if let Err(e) = engine::run(shared, rx, token) {
                    eprintln!("[jobloop] engine error: {e:?}");
                }
            });

        match spawned {
            Ok(handle) => {
                let mut slot = self.engine.lock().unwrap_or_else(|e| e.into_inner());
                *slot = Some(handle);
                Ok(())
            }
            Err(e) => {
                let mut st = self.shared.lock_state();
                st.lifecycle = Lifecycle::New;
                Err(SchedulerError::EngineSpawn {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Submits one unit of work; non-blocking either way.
    ///
    /// If a slot is free the job is admitted into the active set, bound to
    /// the engine, and the returned handle is already `Running`; otherwise
    /// the job is parked on the FIFO backlog in a `Pending` handle and will
    /// be promoted in submission order as slots free.
    ///
    /// The optional callback fires once, on the engine thread, after the
    /// job's terminal bookkeeping (eviction and promotion) has completed.
    ///
    /// Must not be called from within a job or callback running on the
    /// engine thread.
    pub fn submit(
        &self,
        work: impl Work<T>,
        callback: Option<DoneCallback<T>>,
    ) -> Result<JobHandle<T>, SubmitError> {
        self.submit_boxed(Box::new(work), callback)
    }

    /// Submits every item of a sequence, applying the same callback to all.
    ///
    /// Returns the handles in submission order. If the scheduler shuts down
    /// midway the already-submitted prefix stays submitted and the error is
    /// returned.
    pub fn submit_many<W, I>(
        &self,
        works: I,
        callback: Option<DoneCallback<T>>,
    ) -> Result<Vec<JobHandle<T>>, SubmitError>
    where
        W: Work<T>,
        I: IntoIterator<Item = W>,
    {
        let mut handles = Vec::new();
        for work in works {
            handles.push(self.submit(work, callback.clone())?);
        }
        Ok(handles)
    }

    /// Submits a type-erased payload from an untyped boundary.
    ///
    /// The only runtime-validated entry point: the payload must be a work
    /// descriptor erased with [`untyped::payload`](crate::untyped::payload).
    /// Plain values and uninvoked functions are rejected with
    /// [`SubmitError::InvalidWork`] before any job is created.
    pub fn submit_untyped(
        &self,
        raw: WorkPayload,
        callback: Option<DoneCallback<T>>,
    ) -> Result<JobHandle<T>, SubmitError>
    where
        T: 'static,
    {
        let work = untyped::coerce::<T>(raw)?;
        self.submit_boxed(work, callback)
    }

    /// The single admission point.
    fn submit_boxed(
        &self,
        work: BoxWork<T>,
        callback: Option<DoneCallback<T>>,
    ) -> Result<JobHandle<T>, SubmitError> {
        let inner = JobInner::new();
        let handle = JobHandle::from_inner(Arc::clone(&inner));

        let bind = {
            let mut st = self.shared.lock_state();
            match st.lifecycle {
                Lifecycle::Stopping | Lifecycle::Stopped => return Err(SubmitError::Closed),
                Lifecycle::New | Lifecycle::Started => {}
            }
            // Check-then-insert is one step under the lock.
            if st.active.try_insert(handle.clone()).is_ok() {
                inner.mark_running();
                Some(Bind {
                    inner: Arc::clone(&inner),
                    work,
                    callback,
                })
            } else {
                st.pending.push(PendingJob {
                    inner: Arc::clone(&inner),
                    work,
                    callback,
                });
                None
            }
        };

        match bind {
            Some(bind) => {
                self.shared
                    .bus
                    .publish(Event::new(EventKind::JobStarted).with_job(inner.id()));
                if let Err(send_err) = self.shared.bind_tx.send(bind) {
                    // The engine is already gone (shutdown race); the job
                    // can never run, so it resolves as cancelled.
                    let lost = send_err.0;
                    self.shared
                        .resolve_unbound_cancelled(lost.inner, lost.callback);
                }
            }
            None => {
                self.shared
                    .bus
                    .publish(Event::new(EventKind::JobQueued).with_job(inner.id()));
            }
        }
        Ok(handle)
    }

    /// Stops the scheduler: drains running jobs, resolves queued jobs as
    /// cancelled without starting them, then asks the loop to stop.
    ///
    /// Must be called from a thread other than the engine's own. Blocks
    /// until every running job reaches its terminal state (cancellation
    /// outcomes are discarded). Does **not** wait for the engine thread to
    /// exit; see [`join`](Scheduler::join).
    ///
    /// One-shot: a second call fails with
    /// [`SchedulerError::AlreadyStopped`].
    pub fn stop(&self) -> Result<(), SchedulerError> {
        {
            let mut st = self.shared.lock_state();
            match st.lifecycle {
                Lifecycle::Started => st.lifecycle = Lifecycle::Stopping,
                Lifecycle::New => return Err(SchedulerError::NotStarted),
                Lifecycle::Stopping | Lifecycle::Stopped => {
                    return Err(SchedulerError::AlreadyStopped)
                }
            }
        }
        self.shared
            .bus
            .publish(Event::new(EventKind::ShutdownRequested));

        // 1. Drain the active set: cancel, await terminal, discard the
        // cancellation outcomes. Promotion is suppressed while Stopping, so
        // the set only shrinks; the loop guards against completions racing
        // the snapshot.
        loop {
            let running = self.shared.lock_state().active.handles();
            if running.is_empty() {
                break;
            }
            for h in &running {
                h.force_cancel();
            }
            for h in running {
                let _ = h.wait_terminal();
            }
        }

        // 2. Drain the backlog: each queued job resolves as cancelled and
        // never binds to the engine.
        let parked = self.shared.lock_state().pending.drain();
        for p in parked {
            self.shared.resolve_unbound_cancelled(p.inner, p.callback);
        }

        // 3. Ask the loop itself to stop.
        self.shared.loop_token.cancel();
        self.shared.lock_state().lifecycle = Lifecycle::Stopped;
        Ok(())
    }

    /// Waits up to `grace` for the engine thread to exit.
    ///
    /// Complements [`stop`](Scheduler::stop), which returns without joining
    /// the loop. Fails with [`SchedulerError::GraceExceeded`] if the thread
    /// is still alive after the grace period (the handle is retained, so a
    /// later retry can still join).
    pub fn join(&self, grace: Duration) -> Result<(), SchedulerError> {
        let handle = {
            let mut slot = self.engine.lock().unwrap_or_else(|e| e.into_inner());
            match slot.take() {
                Some(h) => h,
                None => return Err(SchedulerError::NotStarted),
            }
        };

        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                let mut slot = self.engine.lock().unwrap_or_else(|e| e.into_inner());
                *slot = Some(handle);
                return Err(SchedulerError::GraceExceeded { grace });
            }
            thread::sleep(Duration::from_millis(5));
        }
        let _ = handle.join();
        Ok(())
    }

    /// Returns `true` iff at least one job is currently running.
    pub fn is_running(&self) -> bool {
        !self.shared.lock_state().active.is_empty()
    }

    /// Returns the fixed concurrency cap.
    pub fn capacity(&self) -> usize {
        self.shared.lock_state().active.capacity()
    }

    /// Returns an eventually-consistent size snapshot.
    ///
    /// All three counters are read under one lock, but the world may move
    /// on before the caller looks at them; monitors must tolerate that.
    pub fn status(&self) -> SchedulerStatus {
        let st = self.shared.lock_state();
        SchedulerStatus {
            active: st.active.len(),
            pending: st.pending.len(),
            completed: st.completed.len(),
            capacity: st.active.capacity(),
        }
    }

    /// Returns a receiver observing all events published from now on.
    ///
    /// This is the read-only monitor surface; no additional synchronization
    /// is offered beyond the bus's own ordering (`Event::seq`).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }
}
