//! Virtual group: animates `on`, `bri` and `xy` like a real gateway.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use wakelamp_app::ports::{Gateway, TimeSource};
use wakelamp_domain::color::Xy;
use wakelamp_domain::drift::progress;
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::group::{BRI_MAX, GroupCommand, GroupState};
use wakelamp_domain::time::{Timestamp, since};

/// The simulated group refuses to answer.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("virtual group is unreachable")]
    Unreachable,
}

impl From<VirtualError> for WakeLampError {
    fn from(err: VirtualError) -> Self {
        Self::Gateway(Box::new(err))
    }
}

/// A linear animation between two values.
#[derive(Debug, Clone, Copy)]
struct Ramp<V> {
    from: V,
    to: V,
    started: Timestamp,
    duration: Duration,
}

impl<V: Copy> Ramp<V> {
    fn steady(value: V, now: Timestamp) -> Self {
        Self {
            from: value,
            to: value,
            started: now,
            duration: Duration::ZERO,
        }
    }

    fn fraction(&self, now: Timestamp) -> f64 {
        progress(since(now, self.started), self.duration)
    }
}

impl Ramp<f64> {
    fn at(&self, now: Timestamp) -> f64 {
        self.from + (self.to - self.from) * self.fraction(now)
    }
}

impl Ramp<Xy> {
    fn at(&self, now: Timestamp) -> Xy {
        self.from.lerp(self.to, self.fraction(now))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_bri(value: f64) -> u8 {
    value.round().clamp(0.0, f64::from(BRI_MAX)) as u8
}

#[derive(Debug)]
struct Model {
    on: bool,
    bri: Ramp<f64>,
    xy: Option<Ramp<Xy>>,
    reachable: bool,
    commands: Vec<(Timestamp, GroupCommand)>,
}

impl Model {
    fn snapshot(&self, now: Timestamp) -> GroupState {
        GroupState {
            on: self.on,
            bri: to_bri(self.bri.at(now)),
            xy: self.xy.map(|ramp| ramp.at(now)),
        }
    }

    fn reset(&mut self, state: &GroupState, now: Timestamp) {
        self.on = state.on;
        self.bri = Ramp::steady(f64::from(state.bri), now);
        self.xy = state.xy.map(|xy| Ramp::steady(xy, now));
    }
}

/// A simulated lamp group.
pub struct VirtualGroup<T> {
    time: T,
    model: Mutex<Model>,
}

impl<T: TimeSource> VirtualGroup<T> {
    /// A group that is off, at zero brightness, with no color reported.
    pub fn new(time: T) -> Self {
        let now = time.now();
        Self {
            time,
            model: Mutex::new(Model {
                on: false,
                bri: Ramp::steady(0.0, now),
                xy: None,
                reachable: true,
                commands: Vec::new(),
            }),
        }
    }

    /// Current state, interpolated at the clock's `now`.
    pub fn state(&self) -> GroupState {
        self.lock().snapshot(self.time.now())
    }

    /// Replace the state outright, cancelling any running animation.
    pub fn set_state(&self, state: &GroupState) {
        let now = self.time.now();
        self.lock().reset(state, now);
    }

    /// Freeze every running animation at its current value, as a power cut
    /// or a manual override on the wall switch would.
    pub fn interrupt(&self) {
        let now = self.time.now();
        let mut model = self.lock();
        let current = model.snapshot(now);
        model.reset(&current, now);
        tracing::debug!(bri = current.bri, "virtual group interrupted");
    }

    /// Make every subsequent request fail (or succeed again).
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Every accepted command with the time it arrived.
    pub fn commands(&self) -> Vec<(Timestamp, GroupCommand)> {
        self.lock().commands.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Model> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> Result<GroupState, VirtualError> {
        let model = self.lock();
        if !model.reachable {
            return Err(VirtualError::Unreachable);
        }
        Ok(model.snapshot(self.time.now()))
    }

    fn write(&self, command: &GroupCommand) -> Result<(), VirtualError> {
        let now = self.time.now();
        let mut model = self.lock();
        if !model.reachable {
            return Err(VirtualError::Unreachable);
        }
        let duration = command
            .transition
            .map_or(Duration::ZERO, |transition| transition.as_duration());

        if let Some(on) = command.on {
            model.on = on;
        }
        if let Some(bri) = command.bri {
            let from = model.bri.at(now);
            model.bri = Ramp {
                from,
                to: f64::from(bri),
                started: now,
                duration,
            };
        }
        if let Some(to) = command.xy {
            let from = model.xy.map_or(to, |ramp| ramp.at(now));
            model.xy = Some(Ramp {
                from,
                to,
                started: now,
                duration,
            });
        }
        model.commands.push((now, command.clone()));
        tracing::trace!(?command, "virtual group accepted command");
        Ok(())
    }
}

impl<T: TimeSource> Gateway for VirtualGroup<T> {
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send {
        let result = self.read().map_err(WakeLampError::from);
        async move { result }
    }

    fn apply(
        &self,
        command: &GroupCommand,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        let result = self.write(command).map_err(WakeLampError::from);
        async move { result }
    }
}
