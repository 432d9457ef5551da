//! Change feed port: notifications that the event store changed on disk.

use std::future::Future;

use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::time::Timestamp;

/// The event store was modified outside this process (or by the clock's
/// own marker write). Carries no payload: consumers reload everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub detected_at: Timestamp,
}

/// Publishes store change notifications to interested subscribers.
pub trait ChangePublisher: Send + Sync {
    /// Publish a change to all current subscribers.
    fn publish(&self, change: StoreChange) -> impl Future<Output = Result<(), WakeLampError>> + Send;
}
