//! # wakelampd: wakelamp daemons
//!
//! Composition root shared by the three binaries:
//!
//! | Binary | Runs |
//! |--------|------|
//! | `wakelamp-clock` | store watcher + [`Clock`](wakelamp_app::services::Clock) |
//! | `wakelamp-monitor` | [`DriftMonitor`](wakelamp_app::services::DriftMonitor) |
//! | `wakelamp-resume` | [`Resynchronizer`](wakelamp_app::services::Resynchronizer) |
//!
//! ## Responsibilities
//! - Parse configuration (`wakelamp.toml`, env vars)
//! - Install logging
//! - Construct the event store and gateway adapters
//! - Construct the application service and run it until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

pub mod config;
pub mod gateway;
pub mod telemetry;

use std::future::Future;

pub use config::Config;
pub use gateway::AnyGateway;

/// Load config and install logging; the common start of every binary.
///
/// # Errors
///
/// Returns an error when the configuration is missing, malformed or invalid.
pub fn bootstrap() -> anyhow::Result<Config> {
    let config = Config::load()?;
    telemetry::init(&config.logging.filter);
    Ok(config)
}

/// Drive `service` until it returns or Ctrl-C arrives.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed.
pub async fn run_until_shutdown(name: &str, service: impl Future<Output = ()>) -> anyhow::Result<()> {
    tracing::info!(service = name, "started");
    tokio::select! {
        () = service => {
            tracing::warn!(service = name, "stopped unexpectedly");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!(service = name, "shutdown signal received");
        }
    }
    Ok(())
}
