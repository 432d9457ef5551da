//! # wakelamp-app
//!
//! Application layer: the three schedulers and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Gateway`: read and command the lamp group
//!   - `EventStore`: load events, persist execution markers
//!   - `TimeSource`: wall clock and deadline sleeps
//!   - `ChangePublisher`: announce that the store changed
//! - Provide the use-cases:
//!   - `Clock` + `TransitionExecutor`: fire due events and drive their fades
//!   - `DriftMonitor`: compare active fades with the group's reported state
//!   - `Resynchronizer`: re-issue remaining legs after drift or a restart
//! - Provide **in-process infrastructure** that doesn't need IO (change feed,
//!   system and manual clocks)
//!
//! ## Dependency rule
//! Depends on `wakelamp-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod change_feed;
pub mod ports;
pub mod services;
pub mod time;

#[cfg(test)]
mod testing;
