//! # Process configuration.
//!
//! [`AgentConfig`] is parsed from the command line and validated before any
//! worker starts. A validation failure is a configuration error: the process
//! reports it and exits without ever reaching the supervisor.

use std::time::Duration;

use clap::{Args, Parser};

use crate::core::Config;
use crate::error::ConfigError;
use crate::workers::WorkerSet;

const LONG_ABOUT: &str = "\
Start the agent.

The agent runs alongside your upstream service and registers one or more
listeners. Each listener is an endpoint ID paired with the address requests
for that endpoint are forwarded to.

Examples:
  # Register a listener with endpoint ID 'my-endpoint-123' that forwards
  # requests to 'localhost:3000'.
  listenvisor --listeners my-endpoint-123/localhost:3000

  # Register multiple listeners.
  listenvisor --listeners my-endpoint-123/localhost:3000 \\
      --listeners my-endpoint-xyz/localhost:6000";

/// Command-line configuration of the agent.
#[derive(Parser, Debug, Clone)]
#[command(name = "listenvisor", version, about, long_about = LONG_ABOUT)]
pub struct AgentConfig {
    /// Comma separated listeners to register, with format '<endpoint ID>/<forward addr>'
    #[arg(
        long = "listeners",
        visible_alias = "listener",
        value_delimiter = ',',
        value_name = "ID/ADDR"
    )]
    pub listeners: Vec<String>,

    #[command(flatten)]
    pub log: LogConfig,

    /// Seconds to wait for listeners to stop once shutdown starts (0 = no limit)
    #[arg(long = "shutdown.grace", value_name = "SECS", default_value_t = 0)]
    pub grace_secs: u64,

    /// Seconds between upstream reachability checks
    #[arg(long = "probe.interval", value_name = "SECS", default_value_t = 10)]
    pub probe_interval_secs: u64,
}

/// Logging flags.
#[derive(Args, Debug, Clone)]
pub struct LogConfig {
    /// Log level
    #[arg(long = "log.level", value_name = "LEVEL", default_value = "info")]
    pub level: String,

    /// Enable debug logs for the given subsystems
    #[arg(long = "log.subsystems", value_name = "NAME", value_delimiter = ',')]
    pub subsystems: Vec<String>,
}

impl AgentConfig {
    /// Checks the listener entries and returns the worker set they describe.
    pub fn validate(&self) -> Result<WorkerSet, ConfigError> {
        if self.listeners.is_empty() {
            return Err(ConfigError::MissingListeners);
        }
        WorkerSet::parse(&self.listeners)
    }

    /// Supervisor settings derived from the flags.
    pub fn supervisor_config(&self) -> Config {
        Config {
            grace: Duration::from_secs(self.grace_secs),
            ..Config::default()
        }
    }

    /// Interval between upstream checks, at least one second.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}
