//! Functional tests driving a real scheduler instance end to end.
//!
//! These run the engine on its own thread and observe it from the test
//! thread, the way an embedding application would. Sleeps are generous to
//! keep the suite stable on slow machines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jobloop::{
    untyped, JobError, JobState, Scheduler, SchedulerConfig, SchedulerError, SubmitError, Work,
    WorkFn,
};

fn sleep_job(ms: u64, value: i32) -> impl Work<i32> {
    WorkFn::new(move |_ctx| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok::<_, JobError>(value)
    })
}

fn long_job(value: i32) -> impl Work<i32> {
    sleep_job(600_000, value)
}

fn started_scheduler(capacity: usize) -> Scheduler<i32> {
    let sched = Scheduler::new(SchedulerConfig::with_capacity(capacity));
    sched.start().expect("start");
    sched
}

#[test]
fn test_submit_and_result() {
    let sched = started_scheduler(4);

    let handle = sched.submit(sleep_job(50, 7), None).expect("submit");
    assert_eq!(handle.state(), JobState::Running);

    assert_eq!(handle.result(), Ok(7));
    assert!(handle.done());
    assert!(!handle.cancelled());
    assert_eq!(handle.exception(), None);

    sched.stop().expect("stop");
}

#[test]
fn test_submit_before_start_runs_after_start() {
    let sched: Scheduler<i32> = Scheduler::new(SchedulerConfig::with_capacity(2));
    let handle = sched.submit(sleep_job(20, 3), None).expect("submit");
    assert_eq!(handle.state(), JobState::Running);

    sched.start().expect("start");
    assert_eq!(handle.result(), Ok(3));
    sched.stop().expect("stop");
}

#[test]
fn test_failure_is_local_to_the_job() {
    let sched = started_scheduler(2);

    let bad = sched
        .submit(
            WorkFn::new(|_ctx| async move { Err::<i32, _>(JobError::failed("boom")) }),
            None,
        )
        .expect("submit");
    let good = sched.submit(sleep_job(50, 1), None).expect("submit");

    assert_eq!(bad.result(), Err(JobError::failed("boom")));
    assert_eq!(bad.state(), JobState::Failed);
    assert_eq!(bad.exception(), Some(JobError::failed("boom")));

    // The failure never affects the other job or the engine.
    assert_eq!(good.result(), Ok(1));
    sched.stop().expect("stop");
}

// Scenario A: capacity 5, ten slow jobs; five run, five queue, all complete.
#[test]
fn test_overflow_queues_then_drains() {
    let sched = started_scheduler(5);

    let handles = sched
        .submit_many((0..10).map(|i| sleep_job(200, i)), None)
        .expect("submit_many");
    assert_eq!(handles.len(), 10);

    let status = sched.status();
    assert_eq!(status.active, 5);
    assert_eq!(status.pending, 5);
    assert_eq!(status.completed, 0);
    assert!(sched.is_running());

    for (i, h) in handles.iter().enumerate() {
        assert_eq!(h.result(), Ok(i as i32));
    }

    thread::sleep(Duration::from_millis(100));
    let status = sched.status();
    assert_eq!(status.active, 0);
    assert_eq!(status.pending, 0);
    assert_eq!(status.completed, 10);
    assert!(!sched.is_running());

    sched.stop().expect("stop");
}

// Scenario B: shutdown cancels the running job and resolves the queued job
// without ever starting it.
#[test]
fn test_stop_cancels_running_and_pending() {
    let sched = started_scheduler(1);

    let job2_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&job2_ran);

    let h1 = sched.submit(long_job(1), None).expect("submit");
    let h2 = sched
        .submit(
            WorkFn::new(move |_ctx| async move {
                flag.store(true, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok::<_, JobError>(2)
            }),
            None,
        )
        .expect("submit");

    assert_eq!(h1.state(), JobState::Running);
    assert_eq!(h2.state(), JobState::Pending);

    sched.stop().expect("stop");

    assert_eq!(h1.result(), Err(JobError::Canceled));
    assert_eq!(h2.result(), Err(JobError::Canceled));
    assert!(h1.cancelled());
    assert!(h2.cancelled());
    assert!(!job2_ran.load(Ordering::SeqCst), "queued job must never run");

    let status = sched.status();
    assert_eq!(status.active, 0);
    assert_eq!(status.pending, 0);
    assert_eq!(status.completed, 2);

    sched.join(Duration::from_secs(5)).expect("join");
}

// Scenario C: untyped boundary rejects non-work payloads before any job exists.
#[test]
fn test_untyped_boundary_rejects_invalid_payloads() {
    let sched = started_scheduler(2);

    let err = sched.submit_untyped(Box::new(42), None).unwrap_err();
    assert!(matches!(err, SubmitError::InvalidWork { .. }));

    fn plain() -> i32 {
        1
    }
    let err = sched
        .submit_untyped(Box::new(plain as fn() -> i32), None)
        .unwrap_err();
    assert!(matches!(err, SubmitError::InvalidWork { .. }));

    // No job was created on either rejection.
    let status = sched.status();
    assert_eq!(status.active + status.pending + status.completed, 0);

    // A properly erased descriptor is accepted.
    let handle = sched
        .submit_untyped(untyped::payload(sleep_job(20, 5)), None)
        .expect("valid payload");
    assert_eq!(handle.result(), Ok(5));

    sched.stop().expect("stop");
}

// Scenario D: cancelling a running job mid-execution.
#[test]
fn test_cancel_running_job() {
    let sched = started_scheduler(2);

    let handle = sched.submit(long_job(1), None).expect("submit");
    thread::sleep(Duration::from_millis(100));

    assert!(handle.cancel());
    assert_eq!(handle.result(), Err(JobError::Canceled));
    assert!(handle.cancelled());
    assert_eq!(handle.exception(), Some(JobError::Canceled));

    // Idempotent reads on a terminal job.
    assert_eq!(handle.result(), Err(JobError::Canceled));
    assert!(!handle.cancel());

    sched.stop().expect("stop");
}

// Scenario E: capacity 3, seven jobs; three run at once, promotion is FIFO.
#[test]
fn test_promotion_is_fifo() {
    let sched = started_scheduler(3);
    let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let works: Vec<_> = (0..7)
        .map(|i| {
            let order = Arc::clone(&order);
            WorkFn::new(move |_ctx| async move {
                order.lock().unwrap().push(i);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, JobError>(i as i32)
            })
        })
        .collect();

    let handles = sched.submit_many(works, None).expect("submit_many");

    for h in &handles[..3] {
        assert_eq!(h.state(), JobState::Running);
    }
    for h in &handles[3..] {
        assert_eq!(h.state(), JobState::Pending);
    }

    for h in &handles {
        let _ = h.result();
    }

    let started = order.lock().unwrap().clone();
    assert_eq!(started.len(), 7);
    let mut first_wave = started[..3].to_vec();
    first_wave.sort_unstable();
    assert_eq!(first_wave, vec![0, 1, 2]);
    assert_eq!(&started[3..], &[3, 4, 5, 6], "promotion must follow FIFO order");

    sched.stop().expect("stop");
}

#[test]
fn test_cancel_frees_slot_and_promotes() {
    let sched = started_scheduler(1);

    let h1 = sched.submit(long_job(1), None).expect("submit");
    let h2 = sched.submit(sleep_job(100, 2), None).expect("submit");
    assert_eq!(h2.state(), JobState::Pending);

    thread::sleep(Duration::from_millis(100));
    assert!(h1.cancel());

    // The freed slot goes to the queued job.
    assert_eq!(h2.result(), Ok(2));
    assert!(h1.cancelled());
    assert_eq!(sched.status().pending, 0);

    sched.stop().expect("stop");
}

#[test]
fn test_cancel_pending_job_is_noop() {
    let sched = started_scheduler(1);

    let _h1 = sched.submit(long_job(1), None).expect("submit");
    let h2 = sched.submit(long_job(2), None).expect("submit");

    assert_eq!(h2.state(), JobState::Pending);
    assert!(!h2.cancel(), "cancelling a queued job is unsupported");
    assert_eq!(h2.state(), JobState::Pending);
    assert_eq!(sched.status().pending, 1);

    sched.stop().expect("stop");
}

#[test]
fn test_job_accounting_is_conserved() {
    let sched = started_scheduler(2);

    let check = |submitted: usize| {
        let s = sched.status();
        assert_eq!(s.active + s.pending + s.completed, submitted);
    };

    check(0);
    let handles = sched
        .submit_many((0..6).map(|i| sleep_job(100, i)), None)
        .expect("submit_many");
    check(6);

    thread::sleep(Duration::from_millis(150));
    check(6);

    for h in &handles {
        let _ = h.result();
    }
    thread::sleep(Duration::from_millis(50));
    check(6);
    assert_eq!(sched.status().completed, 6);

    sched.stop().expect("stop");
}

#[test]
fn test_callback_runs_after_bookkeeping() {
    let sched = started_scheduler(1);

    let seen: Arc<Mutex<Vec<(u64, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: jobloop::DoneCallback<i32> = Arc::new(move |handle| {
        sink.lock().unwrap().push((handle.id(), handle.done()));
    });

    let h1 = sched.submit(sleep_job(50, 1), Some(callback.clone())).expect("submit");
    let h2 = sched.submit(sleep_job(50, 2), Some(callback)).expect("submit");

    assert_eq!(h1.result(), Ok(1));
    assert_eq!(h2.result(), Ok(2));
    thread::sleep(Duration::from_millis(100));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    // Bookkeeping precedes the callback, so the handle is terminal inside it.
    assert_eq!(seen[0], (h1.id(), true));
    assert_eq!(seen[1], (h2.id(), true));

    sched.stop().expect("stop");
}

#[test]
fn test_shutdown_callback_fires_for_drained_pending_job() {
    let sched = started_scheduler(1);

    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);
    let callback: jobloop::DoneCallback<i32> = Arc::new(move |handle| {
        assert!(handle.cancelled());
        flag.store(true, Ordering::SeqCst);
    });

    let _h1 = sched.submit(long_job(1), None).expect("submit");
    let h2 = sched.submit(long_job(2), Some(callback)).expect("submit");
    assert_eq!(h2.state(), JobState::Pending);

    sched.stop().expect("stop");
    assert!(called.load(Ordering::SeqCst));
}

#[test]
fn test_lifecycle_guards() {
    let sched: Scheduler<i32> = Scheduler::new(SchedulerConfig::default());

    assert!(matches!(sched.stop(), Err(SchedulerError::NotStarted)));
    assert!(matches!(
        sched.join(Duration::from_millis(10)),
        Err(SchedulerError::NotStarted)
    ));

    sched.start().expect("start");
    assert!(matches!(sched.start(), Err(SchedulerError::AlreadyStarted)));

    sched.stop().expect("stop");
    assert!(matches!(sched.stop(), Err(SchedulerError::AlreadyStopped)));

    assert!(matches!(
        sched.submit(sleep_job(10, 1), None),
        Err(SubmitError::Closed)
    ));

    sched.join(Duration::from_secs(5)).expect("join");
}

#[test]
fn test_stop_from_another_thread() {
    let sched = Arc::new(started_scheduler(2));
    let h = sched.submit(long_job(1), None).expect("submit");

    let stopper = {
        let sched = Arc::clone(&sched);
        thread::spawn(move || sched.stop())
    };
    stopper.join().expect("stopper panicked").expect("stop");

    assert!(h.cancelled());
    sched.join(Duration::from_secs(5)).expect("join");
}

#[test]
fn test_events_report_job_lifecycle() {
    use jobloop::EventKind;

    let sched = started_scheduler(1);
    let mut rx = sched.subscribe();

    let h1 = sched.submit(sleep_job(50, 1), None).expect("submit");
    let h2 = sched.submit(sleep_job(50, 2), None).expect("submit");
    assert_eq!(h1.result(), Ok(1));
    assert_eq!(h2.result(), Ok(2));
    thread::sleep(Duration::from_millis(100));

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::JobStarted));
    assert!(kinds.contains(&EventKind::JobQueued));
    assert!(kinds.contains(&EventKind::JobPromoted));
    assert!(kinds.contains(&EventKind::JobFinished));

    sched.stop().expect("stop");
}
