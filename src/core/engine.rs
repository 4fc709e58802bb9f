//! # Engine: the dedicated execution loop and the completion protocol.
//!
//! The engine owns a current-thread tokio runtime on one dedicated OS
//! thread. Many jobs are multiplexed on it via cooperative suspension;
//! there is exactly one engine thread per scheduler instance.
//!
//! ## Bind loop
//! ```text
//! loop {
//!   ├─► loop_token cancelled ──► break
//!   └─► Bind received ─────────► spawn wrapper task
//!                                   │
//!                                   ├─► run work vs. token (select!)
//!                                   └─► complete(): completion protocol
//! }
//! ```
//!
//! ## Completion protocol
//! Fires exactly once per bound job, on the engine thread, and never
//! blocks:
//! 1. Evict the job from the active set and move its handle to the
//!    completed set; if the scheduler is still running, pop the next
//!    pending job and insert it into the freed slot — eviction and
//!    promotion share one critical section, so back-to-back completions
//!    cannot overshoot the capacity.
//! 2. Record the outcome (wakes `result()` waiters) and publish the
//!    terminal event; hand the promoted job back to the bind loop.
//! 3. Invoke the original job's user callback last.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::state::{Bind, Lifecycle, Shared};
use crate::error::JobError;
use crate::events::{Event, EventKind};
use crate::jobs::{JobHandle, JobInner, JobState};

/// Runs the engine until the loop token fires or the bind channel closes.
///
/// Entry point of the dedicated engine thread.
pub(crate) fn run<T: Send + 'static>(
    shared: Arc<Shared<T>>,
    bind_rx: mpsc::UnboundedReceiver<Bind<T>>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    rt.block_on(async move {
        subscriber_listener(&shared);
        shared.bus.publish(Event::new(EventKind::EngineStarted));

        let mut rx = bind_rx;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                bind = rx.recv() => match bind {
                    Some(bind) => spawn_job(Arc::clone(&shared), bind),
                    None => break,
                }
            }
        }

        shared.bus.publish(Event::new(EventKind::EngineStopped));
    });
    Ok(())
}

/// Forwards bus events to the configured subscribers, in order.
///
/// Lagged receivers skip missed items and keep going.
fn subscriber_listener<T: Send + 'static>(shared: &Arc<Shared<T>>) {
    if shared.subscribers.is_empty() {
        return;
    }
    let mut rx = shared.bus.subscribe();
    let subs = shared.subscribers.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    for sub in &subs {
                        sub.on_event(&ev).await;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Spawns the wrapper task for one bound job.
///
/// The wrapper races the work future against the job's cancellation token;
/// cancellation therefore takes effect at the work's next suspension point.
fn spawn_job<T: Send + 'static>(shared: Arc<Shared<T>>, bind: Bind<T>) {
    let inner = bind.inner;
    let callback = bind.callback;
    let token = inner.token().clone();
    let fut = bind.work.run(token.clone());

    tokio::spawn(async move {
        let outcome = tokio::select! {
            res = fut => res,
            _ = token.cancelled() => Err(JobError::Canceled),
        };
        complete(&shared, &inner, outcome, callback);
    });
}

/// The completion protocol for one terminal job.
fn complete<T: Send + 'static>(
    shared: &Arc<Shared<T>>,
    inner: &Arc<JobInner<T>>,
    outcome: Result<T, JobError>,
    callback: Option<crate::jobs::DoneCallback<T>>,
) {
    let handle = JobHandle::from_inner(Arc::clone(inner));

    // Step 1: evict and, capacity permitting, promote — one critical section.
    let promoted = {
        let mut st = shared.lock_state();
        st.active.remove(inner.id());
        st.completed.push(handle.clone());

        if st.lifecycle == Lifecycle::Started {
            match st.pending.pop() {
                Some(next) => {
                    let next_handle = JobHandle::from_inner(Arc::clone(&next.inner));
                    match st.active.try_insert(next_handle) {
                        Ok(()) => {
                            next.inner.mark_running();
                            Some(next)
                        }
                        Err(_full) => {
                            // A racing submit took the slot; the job keeps
                            // its place at the head of the queue.
                            st.pending.push_front(next);
                            None
                        }
                    }
                }
                None => None,
            }
        } else {
            None
        }
    };

    // Step 2: record the outcome and report.
    inner.resolve(outcome);
    let kind = match handle.state() {
        JobState::Finished => EventKind::JobFinished,
        JobState::Cancelled => EventKind::JobCancelled,
        _ => EventKind::JobFailed,
    };
    let mut ev = Event::new(kind).with_job(inner.id());
    if kind == EventKind::JobFailed {
        if let Some(err) = handle.exception() {
            ev = ev.with_reason(err.to_string());
        }
    }
    shared.bus.publish(ev);

    if let Some(next) = promoted {
        let id = next.inner.id();
        shared.bus.publish(Event::new(EventKind::JobPromoted).with_job(id));
        if let Err(send_err) = shared.bind_tx.send(Bind {
            inner: next.inner,
            work: next.work,
            callback: next.callback,
        }) {
            // The bind loop is gone (shutdown race); the promoted job can
            // never run, so it resolves as cancelled.
            let bind = send_err.0;
            shared.resolve_unbound_cancelled(bind.inner, bind.callback);
        }
    }

    // Step 3: user callback, strictly after bookkeeping.
    if let Some(cb) = callback {
        cb(&handle);
    }
}
