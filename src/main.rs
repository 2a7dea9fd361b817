use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use listenvisor::{
    AgentConfig, Listener, LogWriter, OsSignals, StopCause, Supervisor, WorkerRef, WorkerSet,
    logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let conf = AgentConfig::parse();

    let set = match conf.validate() {
        Ok(set) => set,
        Err(err) => {
            println!("invalid config: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init(&conf.log.level, &conf.log.subsystems) {
        println!("failed to setup logger: {err}");
        return ExitCode::FAILURE;
    }

    run(conf, set).await
}

async fn run(conf: AgentConfig, set: WorkerSet) -> ExitCode {
    info!(?conf, "starting agent");

    // Registered before any listener starts so an early signal is not lost.
    let signals = match OsSignals::subscribe() {
        Ok(signals) => signals,
        Err(err) => {
            error!(error = %err, "failed to register signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let sup = Supervisor::builder(conf.supervisor_config())
        .subscriber(Arc::new(LogWriter::new()))
        .build();

    let probe_interval = conf.probe_interval();
    let listeners = set.build(|spec| {
        Arc::new(Listener::new(spec).with_probe_interval(probe_interval)) as WorkerRef
    });

    let outcome = sup.run(listeners, signals).await;
    match outcome.cause() {
        // Logged by the supervisor when it arrived.
        StopCause::Signal(_) => {}
        StopCause::WorkerFailed { worker } => info!(%worker, "listener failed, shut down the rest"),
        StopCause::WorkersExited => info!("all listeners exited"),
    }
    if let Some(err) = outcome.error() {
        error!(error = %err, "failed to run agent");
    }

    info!("shutdown complete");
    outcome.exit_code()
}
