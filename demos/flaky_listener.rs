//! # Demo: one flaky listener takes the whole agent down
//!
//! Two listeners probe a local upstream. A third worker drops its connection
//! after a few rounds and fails; the supervisor cancels the healthy listeners,
//! waits for them, and reports the failure. Press Ctrl-C earlier to see the
//! clean path instead.
//!
//! ```text
//! cargo run --example flaky_listener
//! ```

use std::sync::Arc;
use std::time::Duration;

use listenvisor::{
    BackoffPolicy, Config, JitterPolicy, Listener, LogWriter, OsSignals, Supervisor,
    WorkerContext, WorkerError, WorkerFn, WorkerRef, WorkerSet,
};
use tokio::net::{TcpListener, TcpStream};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    listenvisor::logging::init("info", &["listener".to_string()])?;

    let upstream = TcpListener::bind("127.0.0.1:0").await?;
    let addr = upstream.local_addr()?;
    tokio::spawn(async move {
        while let Ok((conn, _)) = upstream.accept().await {
            drop(conn);
        }
    });

    let set = WorkerSet::parse([format!("alpha/{addr}"), format!("beta/{addr}")])?;
    let backoff = BackoffPolicy {
        first: Duration::from_millis(100),
        max: Duration::from_secs(2),
        factor: 2.0,
        jitter: JitterPolicy::Equal,
    };
    let mut workers = set.build(|spec| {
        let listener = Listener::new(spec)
            .with_backoff(backoff)
            .with_connect_timeout(Duration::from_secs(1))
            .with_probe_interval(Duration::from_millis(500));
        Arc::new(listener) as WorkerRef
    });

    let flaky: WorkerRef = WorkerFn::arc("flaky", move |ctx: WorkerContext| async move {
        for round in 1..=3 {
            TcpStream::connect(addr).await?;
            println!("[flaky] round {round} ok");
            if !ctx.sleep(Duration::from_millis(400)).await {
                return Ok(());
            }
        }
        Err(WorkerError::fail("upstream reset the session"))
    });
    workers.push(flaky);

    let sup = Supervisor::builder(Config {
        grace: Duration::from_secs(5),
        ..Config::default()
    })
    .subscriber(Arc::new(LogWriter::new()))
    .build();

    let outcome = sup.run(workers, OsSignals::subscribe()?).await;
    println!("cause: {:?}", outcome.cause());
    match outcome.into_result() {
        Ok(_) => println!("clean shutdown"),
        Err(err) => println!("failed: {err} ({})", err.as_label()),
    }
    Ok(())
}
