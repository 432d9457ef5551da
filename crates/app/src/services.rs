//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod clock;
pub mod executor;
pub mod monitor;
pub mod resync;

pub use clock::Clock;
pub use executor::{ExecutionReport, TransitionExecutor};
pub use monitor::DriftMonitor;
pub use resync::{LegAction, ResumeOutcome, ResumeSummary, Resynchronizer};
