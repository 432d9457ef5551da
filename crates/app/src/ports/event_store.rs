//! Event store port: persistence for event definitions.

use std::future::Future;

use chrono::NaiveDate;

use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::event::EventSet;

/// Repository holding every [`EventDefinition`](wakelamp_domain::event::EventDefinition)
/// by name.
pub trait EventStore: Send + Sync {
    /// Load every well-formed event. Malformed records are left out.
    fn load(&self) -> impl Future<Output = Result<EventSet, WakeLampError>> + Send;

    /// Persist the execution marker of one event. No other field changes.
    fn mark_executed(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send;
}

impl<T: EventStore> EventStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<EventSet, WakeLampError>> + Send {
        (**self).load()
    }

    fn mark_executed(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        (**self).mark_executed(name, date)
    }
}
