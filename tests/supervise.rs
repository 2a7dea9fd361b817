use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use listenvisor::{
    Config, Event, EventKind, Listener, ManualSignals, RuntimeError, Signal, StopCause, Subscribe,
    Supervisor, WorkerContext, WorkerError, WorkerFn, WorkerRef, WorkerSet,
};
use tokio::time::sleep;

/// Counts workers that started and workers that returned.
#[derive(Default)]
struct Probe {
    started: AtomicUsize,
    stopped: AtomicUsize,
}

/// Blocks until cancelled, then takes `linger` to wind down.
fn blocking(name: &'static str, probe: Arc<Probe>, linger: Duration) -> WorkerRef {
    WorkerFn::arc(name, move |ctx: WorkerContext| {
        let probe = Arc::clone(&probe);
        async move {
            probe.started.fetch_add(1, Ordering::SeqCst);
            ctx.cancelled().await;
            sleep(linger).await;
            probe.stopped.fetch_add(1, Ordering::SeqCst);
            Ok::<(), WorkerError>(())
        }
    })
}

fn failing(name: &'static str, after: Duration, msg: &'static str) -> WorkerRef {
    WorkerFn::arc(name, move |_ctx: WorkerContext| async move {
        sleep(after).await;
        Err::<(), _>(WorkerError::fail(msg))
    })
}

fn supervisor() -> Supervisor {
    Supervisor::new(Config::default(), Vec::new())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn returns_only_after_every_worker_finished() {
    for n in 0..=5 {
        let probe = Arc::new(Probe::default());
        let workers: Vec<WorkerRef> = (0..n)
            .map(|_| blocking("w", probe.clone(), Duration::from_millis(20)))
            .collect();

        let (handle, signals) = ManualSignals::pair();
        tokio::spawn(async move {
            sleep(Duration::from_millis(5)).await;
            handle.shutdown();
        });

        let outcome = supervisor().run(workers, signals).await;
        assert!(outcome.is_clean(), "n={n}: {outcome:?}");
        assert_eq!(probe.started.load(Ordering::SeqCst), n, "n={n}");
        assert_eq!(probe.stopped.load(Ordering::SeqCst), n, "n={n}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_failure_cancels_every_sibling() {
    let probe = Arc::new(Probe::default());
    let mut workers: Vec<WorkerRef> = (0..3)
        .map(|_| blocking("healthy", probe.clone(), Duration::ZERO))
        .collect();
    workers.push(failing("broken", Duration::from_millis(5), "connection refused"));

    let (_handle, signals) = ManualSignals::pair();
    let outcome = supervisor().run(workers, signals).await;

    assert_eq!(
        outcome.cause(),
        &StopCause::WorkerFailed {
            worker: "broken".into()
        }
    );
    match outcome.error() {
        Some(RuntimeError::Worker { worker, source }) => {
            assert_eq!(worker, "broken");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.exit_status(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_cancels_every_context_before_returning() {
    let seen: Arc<Mutex<Vec<WorkerContext>>> = Arc::default();
    let workers: Vec<WorkerRef> = (0..3)
        .map(|_| {
            let seen = Arc::clone(&seen);
            WorkerFn::arc("w", move |ctx: WorkerContext| {
                seen.lock().unwrap().push(ctx.clone());
                async move {
                    ctx.cancelled().await;
                    Ok::<(), WorkerError>(())
                }
            }) as WorkerRef
        })
        .collect();

    let (handle, signals) = ManualSignals::pair();
    tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        handle.deliver(Signal::Interrupt);
    });

    let outcome = supervisor().run(workers, signals).await;
    assert!(outcome.is_clean());
    assert_eq!(outcome.cause(), &StopCause::Signal(Signal::Interrupt));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(WorkerContext::is_cancelled));
}

#[tokio::test]
async fn empty_set_waits_for_the_signal_only() {
    let (handle, signals) = ManualSignals::pair();
    tokio::spawn(async move {
        sleep(Duration::from_millis(5)).await;
        handle.shutdown();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        supervisor().run(Vec::<WorkerRef>::new(), signals),
    )
    .await
    .expect("supervising nothing must not deadlock");

    assert!(outcome.is_clean());
    assert_eq!(outcome.cause(), &StopCause::Signal(Signal::Manual));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_signal_does_not_change_a_failed_outcome() {
    let probe = Arc::new(Probe::default());
    let workers = vec![
        blocking("slow", probe.clone(), Duration::from_millis(40)),
        failing("broken", Duration::ZERO, "boom"),
    ];

    let (handle, signals) = ManualSignals::pair();
    let late = handle.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        late.deliver(Signal::Terminate);
    });

    let outcome = supervisor().run(workers, signals).await;
    assert!(!handle.shutdown(), "the late notice was already recorded");

    assert_eq!(
        outcome.cause(),
        &StopCause::WorkerFailed {
            worker: "broken".into()
        }
    );
    assert_eq!(outcome.error().and_then(RuntimeError::worker), Some("broken"));
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_at_10ms_waits_for_the_slow_sibling() {
    let probe = Arc::new(Probe::default());
    let workers = vec![
        blocking("a", probe.clone(), Duration::from_millis(50)),
        failing("b", Duration::from_millis(10), "connection refused"),
    ];

    let (_handle, signals) = ManualSignals::pair();
    let start = Instant::now();
    let outcome = supervisor().run(workers, signals).await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(60), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("worker 'b': connection refused")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn signal_at_5ms_returns_after_the_worker_drains() {
    let probe = Arc::new(Probe::default());
    let workers = vec![blocking("a", probe.clone(), Duration::from_millis(10))];

    let (handle, signals) = ManualSignals::pair();
    tokio::spawn(async move {
        sleep(Duration::from_millis(5)).await;
        handle.shutdown();
    });

    let start = Instant::now();
    let outcome = supervisor().run(workers, signals).await;
    let elapsed = start.elapsed();

    assert!(outcome.is_clean());
    assert!(elapsed >= Duration::from_millis(15), "returned after {elapsed:?}");
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_exiting_on_its_own_does_not_stop_the_rest() {
    let probe = Arc::new(Probe::default());
    let once: WorkerRef = WorkerFn::arc("once", |_ctx: WorkerContext| async {
        Ok::<(), WorkerError>(())
    });
    let workers = vec![once, blocking("steady", probe.clone(), Duration::ZERO)];

    let (handle, signals) = ManualSignals::pair();
    tokio::spawn(async move {
        sleep(Duration::from_millis(30)).await;
        handle.shutdown();
    });

    let start = Instant::now();
    let outcome = supervisor().run(workers, signals).await;

    assert!(outcome.is_clean());
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(outcome.cause(), &StopCause::Signal(Signal::Manual));
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn panicking_worker_fails_the_run() {
    let probe = Arc::new(Probe::default());
    let bomb: WorkerRef = WorkerFn::arc("bomb", |_ctx: WorkerContext| async {
        sleep(Duration::from_millis(5)).await;
        if true {
            panic!("listener exploded");
        }
        Ok::<(), WorkerError>(())
    });
    let workers = vec![bomb, blocking("steady", probe.clone(), Duration::ZERO)];

    let (_handle, signals) = ManualSignals::pair();
    let outcome = supervisor().run(workers, signals).await;

    match outcome.error() {
        Some(RuntimeError::WorkerPanicked { worker, reason }) => {
            assert_eq!(worker, "bomb");
            assert_eq!(reason, "listener exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(probe.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hung_worker_is_aborted_after_grace() {
    let hung: WorkerRef = WorkerFn::arc("hung", |_ctx: WorkerContext| async {
        sleep(Duration::from_secs(3600)).await;
        Ok::<(), WorkerError>(())
    });
    let sup = Supervisor::new(
        Config {
            grace: Duration::from_millis(50),
            ..Config::default()
        },
        Vec::new(),
    );

    let (handle, signals) = ManualSignals::pair();
    handle.shutdown();

    let outcome = tokio::time::timeout(Duration::from_secs(5), sup.run(vec![hung], signals))
        .await
        .expect("grace period must bound the drain");

    assert_eq!(outcome.cause(), &StopCause::Signal(Signal::Manual));
    match outcome.error() {
        Some(RuntimeError::GraceExceeded { grace, stuck }) => {
            assert_eq!(*grace, Duration::from_millis(50));
            assert_eq!(stuck, &["hung".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Records every event it sees, taking `delay` per event.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(EventKind, Option<String>)>>,
    delay: Duration,
}

impl Recorder {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn saw(&self, kind: EventKind, worker: Option<&str>) -> bool {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .any(|(k, w)| *k == kind && w.as_deref() == worker)
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        sleep(self.delay).await;
        let worker = ev.worker.as_deref().map(str::to_owned);
        self.seen.lock().unwrap().push((ev.kind, worker));
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribers_have_seen_the_lifecycle_when_run_returns() {
    let rec = Arc::new(Recorder::slow(Duration::from_millis(2)));
    let sup = Supervisor::builder(Config::default())
        .subscriber(rec.clone())
        .build();

    let probe = Arc::new(Probe::default());
    let workers = vec![
        blocking("a", probe.clone(), Duration::ZERO),
        failing("b", Duration::ZERO, "connection refused"),
    ];
    let (_handle, signals) = ManualSignals::pair();
    let outcome = sup.run(workers, signals).await;

    assert!(!outcome.is_clean());
    assert!(rec.saw(EventKind::WorkerStarting, Some("a")));
    assert!(rec.saw(EventKind::WorkerStarting, Some("b")));
    assert!(rec.saw(EventKind::WorkerFailed, Some("b")));
    assert!(rec.saw(EventKind::WorkerStopped, Some("a")));
    assert!(rec.saw(EventKind::AllStopped, None));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_run_reaches_the_subscribers() {
    let rec = Arc::new(Recorder::default());
    let sup = Supervisor::builder(Config::default())
        .subscriber(rec.clone())
        .build();

    for _ in 0..2 {
        let (handle, signals) = ManualSignals::pair();
        handle.shutdown();
        sup.run(Vec::<WorkerRef>::new(), signals).await;
    }

    let requested = rec
        .seen
        .lock()
        .unwrap()
        .iter()
        .filter(|(kind, _)| *kind == EventKind::ShutdownRequested)
        .count();
    assert_eq!(requested, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn error_while_draining_after_a_signal_fails_the_run() {
    let flusher: WorkerRef = WorkerFn::arc("flusher", |ctx: WorkerContext| async move {
        ctx.cancelled().await;
        Err::<(), _>(WorkerError::fail("flush failed"))
    });

    let (handle, signals) = ManualSignals::pair();
    tokio::spawn(async move {
        sleep(Duration::from_millis(5)).await;
        handle.deliver(Signal::Terminate);
    });

    let outcome = supervisor().run(vec![flusher], signals).await;

    assert_eq!(outcome.cause(), &StopCause::Signal(Signal::Terminate));
    assert_eq!(outcome.exit_status(), 1);
    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("worker 'flusher': flush failed")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn grace_timeout_keeps_the_earlier_worker_error() {
    let hung: WorkerRef = WorkerFn::arc("hung", |_ctx: WorkerContext| async {
        sleep(Duration::from_secs(3600)).await;
        Ok::<(), WorkerError>(())
    });
    let sup = Supervisor::new(
        Config {
            grace: Duration::from_millis(50),
            ..Config::default()
        },
        Vec::new(),
    );

    let workers = vec![hung, failing("broken", Duration::from_millis(5), "boom")];
    let (_handle, signals) = ManualSignals::pair();
    let outcome = tokio::time::timeout(Duration::from_secs(5), sup.run(workers, signals))
        .await
        .expect("grace period must bound the drain");

    assert_eq!(
        outcome.cause(),
        &StopCause::WorkerFailed {
            worker: "broken".into()
        }
    );
    match outcome.error() {
        Some(RuntimeError::Worker { worker, source }) => {
            assert_eq!(worker, "broken");
            assert_eq!(source.to_string(), "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn misconfigured_listener_takes_the_others_down() {
    let upstream = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live = format!("live/{}", upstream.local_addr().unwrap());

    let set = WorkerSet::parse([live.as_str(), "broken/localhost"]).unwrap();
    let workers = set.build(|spec| {
        Arc::new(Listener::new(spec).with_probe_interval(Duration::from_millis(10))) as WorkerRef
    });

    let (_handle, signals) = ManualSignals::pair();
    let outcome = tokio::time::timeout(Duration::from_secs(10), supervisor().run(workers, signals))
        .await
        .expect("listeners must stop once one of them fails");

    assert_eq!(outcome.exit_status(), 1);
    assert_eq!(outcome.error().and_then(RuntimeError::worker), Some("broken"));
}
