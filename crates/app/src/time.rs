//! [`TimeSource`] implementations: the real wall clock and a manual one.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use wakelamp_domain::time::{self, Timestamp, after, since};

use crate::ports::TimeSource;

/// Local wall clock; sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }

    fn sleep_until(&self, deadline: Timestamp) -> impl Future<Output = ()> + Send {
        let wait = since(deadline, time::now());
        async move {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[derive(Debug)]
struct ManualState {
    now: Timestamp,
    sleeps: Vec<Timestamp>,
}

/// A clock that only moves when told to.
///
/// `sleep_until` jumps straight to the deadline, so code that waits through
/// a half-hour fade runs instantly. Every requested deadline is recorded.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: start,
                sleeps: Vec::new(),
            })),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.lock().now = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.now = after(state.now, by);
    }

    /// Deadlines passed to `sleep_until`, in call order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Timestamp> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.lock().now
    }

    fn sleep_until(&self, deadline: Timestamp) -> impl Future<Output = ()> + Send {
        let mut state = self.lock();
        state.sleeps.push(deadline);
        if deadline > state.now {
            state.now = deadline;
        }
        std::future::ready(())
    }
}
