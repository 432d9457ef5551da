//! Time port: wall clock and deadline waits.
//!
//! Every wait in the services is a sleep until an explicit deadline, so a
//! virtual clock can drive a whole multi-minute fade instantly in tests.

use std::future::Future;

use wakelamp_domain::time::Timestamp;

/// Source of the current local time and of deadline sleeps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Resolve once `deadline` has passed. Returns immediately for a
    /// deadline in the past.
    fn sleep_until(&self, deadline: Timestamp) -> impl Future<Output = ()> + Send;
}
