//! In-memory port implementations shared by the service tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::NaiveDate;

use wakelamp_domain::error::{NotFoundError, WakeLampError};
use wakelamp_domain::event::{EventDefinition, EventSet};
use wakelamp_domain::group::{GroupCommand, GroupState};
use wakelamp_domain::time::{TimeOfDay, Timestamp};

use crate::ports::{EventStore, Gateway, TimeSource};
use crate::time::ManualClock;

pub fn at(day: u32, h: u32, m: u32, s: u32) -> Timestamp {
    // March 2024: the 4th is a Monday.
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

/// Gateway that records commands with the virtual time they arrived at.
pub struct FakeGateway {
    clock: ManualClock,
    pub state: Mutex<GroupState>,
    commands: Mutex<Vec<(Timestamp, GroupCommand)>>,
    pub reads: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FakeGateway {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            state: Mutex::new(GroupState::default()),
            commands: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_state(&self, state: GroupState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn commands(&self) -> Vec<(Timestamp, GroupCommand)> {
        self.commands.lock().unwrap().clone()
    }
}

impl Gateway for FakeGateway {
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_reads.load(Ordering::SeqCst) {
            Err(WakeLampError::Gateway("gateway unreachable".into()))
        } else {
            Ok(self.state.lock().unwrap().clone())
        };
        async move { result }
    }

    fn apply(
        &self,
        command: &GroupCommand,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        self.commands
            .lock()
            .unwrap()
            .push((self.clock.now(), command.clone()));
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(WakeLampError::Gateway("gateway rejected command".into()))
        } else {
            Ok(())
        };
        async move { result }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    pub events: Mutex<EventSet>,
    pub fail_load: AtomicBool,
    pub fail_mark: AtomicBool,
}

impl InMemoryStore {
    pub fn with(events: impl IntoIterator<Item = (&'static str, EventDefinition)>) -> Self {
        let store = Self::default();
        for (name, event) in events {
            store.insert(name, event);
        }
        store
    }

    pub fn insert(&self, name: &str, event: EventDefinition) {
        self.events.lock().unwrap().insert(name.to_string(), event);
    }

    pub fn marker(&self, name: &str) -> Option<NaiveDate> {
        self.events
            .lock()
            .unwrap()
            .get(name)
            .and_then(|e| e.last_executed)
    }
}

impl EventStore for InMemoryStore {
    fn load(&self) -> impl Future<Output = Result<EventSet, WakeLampError>> + Send {
        let result = if self.fail_load.load(Ordering::SeqCst) {
            Err(WakeLampError::Storage("store unreadable".into()))
        } else {
            Ok(self.events.lock().unwrap().clone())
        };
        async move { result }
    }

    fn mark_executed(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        let result = if self.fail_mark.load(Ordering::SeqCst) {
            Err(WakeLampError::Storage("store read-only".into()))
        } else {
            match self.events.lock().unwrap().get_mut(name) {
                Some(event) => {
                    event.last_executed = Some(date);
                    Ok(())
                }
                None => Err(NotFoundError {
                    entity: "Event",
                    name: name.to_string(),
                }
                .into()),
            }
        };
        async move { result }
    }
}
