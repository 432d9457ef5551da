//! Clock: fires due events at their start minute.
//!
//! The clock owns the in-memory event set. It reloads it from the store
//! whenever the change feed reports a modification, and keeps its own record
//! of what it fired so a failed marker write cannot cause a second firing.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::broadcast::{self, error::TryRecvError};

use wakelamp_domain::event::EventSet;
use wakelamp_domain::time::after;

use crate::ports::{EventStore, Gateway, StoreChange, TimeSource};
use crate::services::executor::TransitionExecutor;

/// Default pause between two ticks.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub struct Clock<S, G, T> {
    store: S,
    executor: TransitionExecutor<G, T>,
    changes: broadcast::Receiver<StoreChange>,
    events: EventSet,
    fired: HashMap<String, NaiveDate>,
    tick_interval: Duration,
}

impl<S: EventStore, G: Gateway, T: TimeSource> Clock<S, G, T> {
    pub fn new(
        store: S,
        executor: TransitionExecutor<G, T>,
        changes: broadcast::Receiver<StoreChange>,
    ) -> Self {
        Self {
            store,
            executor,
            changes,
            events: EventSet::new(),
            fired: HashMap::new(),
            tick_interval: DEFAULT_TICK,
        }
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick_interval = tick;
        self
    }

    /// Events as currently known to the clock.
    #[must_use]
    pub fn events(&self) -> &EventSet {
        &self.events
    }

    /// Replace the in-memory events with a fresh read of the store.
    ///
    /// A failed read leaves the clock with no events until the next change.
    pub async fn reload(&mut self) {
        match self.store.load().await {
            Ok(events) => {
                tracing::info!(count = events.len(), "events loaded");
                self.events = events;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to load events, continuing with none");
                self.events = EventSet::new();
            }
        }
        self.overlay_fired();
    }

    /// Markers this process set win over older persisted ones.
    fn overlay_fired(&mut self) {
        for (name, fired_on) in &self.fired {
            if let Some(event) = self.events.get_mut(name)
                && event.last_executed.is_none_or(|marker| marker < *fired_on)
            {
                event.last_executed = Some(*fired_on);
            }
        }
    }

    /// Drain pending change notifications, reloading once if there were any.
    ///
    /// Returns whether a reload happened.
    pub async fn sync_changes(&mut self) -> bool {
        let mut pending = false;
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    tracing::debug!(detected_at = %change.detected_at, "store change received");
                    pending = true;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "change feed lagged");
                    pending = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if pending {
            self.reload().await;
        }
        pending
    }

    /// Fire every event due right now, one after the other in name order.
    ///
    /// Each execution blocks until its transition is complete. Returns the
    /// names of the events that fired.
    pub async fn tick(&mut self) -> Vec<String> {
        let now = self.executor.time().now();
        let today = now.date();
        let due: Vec<String> = self
            .events
            .iter()
            .filter(|(_, event)| event.is_due(now))
            .map(|(name, _)| name.clone())
            .collect();

        for name in &due {
            let Some(event) = self.events.get(name).cloned() else {
                continue;
            };
            tracing::info!(event = %name, direction = %event.direction, "event due, firing");
            self.executor.execute(name, &event).await;

            self.fired.insert(name.clone(), today);
            if let Some(event) = self.events.get_mut(name) {
                event.last_executed = Some(today);
            }
            if let Err(err) = self.store.mark_executed(name, today).await {
                tracing::warn!(%err, event = %name, "failed to persist execution marker");
            }
        }
        due
    }

    /// Load the events, then tick forever.
    pub async fn run(mut self) {
        self.reload().await;
        loop {
            self.sync_changes().await;
            self.tick().await;
            let next = after(self.executor.time().now(), self.tick_interval);
            self.executor.time().sleep_until(next).await;
        }
    }
}
