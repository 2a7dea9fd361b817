//! Process-wide `tracing` setup.
//!
//! The base level applies everywhere; each named subsystem additionally gets
//! `debug` for the `listenvisor::<subsystem>` target, e.g. `listener` or
//! `core`.

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::error::ConfigError;

/// Builds the filter for `level` plus debug logs for `subsystems`.
pub fn filter(level: &str, subsystems: &[String]) -> Result<EnvFilter, ConfigError> {
    let parsed: Level = level.parse().map_err(|_| ConfigError::InvalidLogLevel {
        level: level.to_owned(),
    })?;

    let mut filter = EnvFilter::default().add_directive(LevelFilter::from_level(parsed).into());
    for subsystem in subsystems {
        let invalid = || ConfigError::InvalidLogSubsystem {
            subsystem: subsystem.clone(),
        };
        if subsystem.is_empty()
            || !subsystem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid());
        }
        let directive: Directive = format!("{}::{subsystem}=debug", env!("CARGO_CRATE_NAME"))
            .parse()
            .map_err(|_| invalid())?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Installs the global `fmt` subscriber.
pub fn init(level: &str, subsystems: &[String]) -> Result<(), ConfigError> {
    let filter = filter(level, subsystems)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .init();
    Ok(())
}
