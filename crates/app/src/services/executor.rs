//! Transition executor: drives one occurrence from its first command to its
//! last.
//!
//! A fade is at most three gateway commands: a color leg, a brightness leg,
//! and (for fades to `OFF`) a final power-off. The gateway animates each leg
//! itself; the executor only waits between them.

use std::fmt;

use wakelamp_domain::event::{Direction, EventDefinition};
use wakelamp_domain::group::GroupCommand;
use wakelamp_domain::occurrence::Occurrence;
use wakelamp_domain::time::after;
use wakelamp_domain::transition::MAX_TRANSITION_SECS;

use crate::ports::{Gateway, TimeSource};

/// Which step of a fade a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Color,
    Brightness,
    PowerOff,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::Brightness => f.write_str("brightness"),
            Self::PowerOff => f.write_str("power_off"),
        }
    }
}

/// Send one command, logging the outcome. Returns whether it was accepted.
pub(crate) async fn issue<G: Gateway>(
    gateway: &G,
    event: &str,
    leg: Leg,
    command: &GroupCommand,
) -> bool {
    match gateway.apply(command).await {
        Ok(()) => {
            tracing::info!(
                event,
                %leg,
                bri = ?command.bri,
                xy = ?command.xy,
                transition = ?command.transition.map(|t| t.units()),
                "command sent"
            );
            true
        }
        Err(err) => {
            tracing::warn!(%err, event, %leg, "command failed, continuing with next step");
            false
        }
    }
}

/// Commands sent and failed during one execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub sent: usize,
    pub failed: usize,
}

impl ExecutionReport {
    fn record(&mut self, accepted: bool) {
        if accepted {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Runs a fire-and-wait transition for a due event.
pub struct TransitionExecutor<G, T> {
    gateway: G,
    time: T,
}

impl<G: Gateway, T: TimeSource> TransitionExecutor<G, T> {
    pub fn new(gateway: G, time: T) -> Self {
        Self { gateway, time }
    }

    #[must_use]
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Execute `event` starting now, returning once its last step is sent.
    ///
    /// Gateway failures never abort the sequence: each failed command is
    /// logged and the executor moves on to the next step.
    #[tracing::instrument(skip(self, event), fields(direction = %event.direction))]
    pub async fn execute(&self, name: &str, event: &EventDefinition) -> ExecutionReport {
        if event.needs_clamping() {
            tracing::warn!(
                color_secs = event.color_transition_time,
                brightness_secs = event.brightness_transition_time,
                max_secs = MAX_TRANSITION_SECS,
                "transition longer than the gateway allows, clamping"
            );
        }

        let started = self.time.now();
        let window_end = Occurrence::anchored(event, started.date()).end;
        let mut report = ExecutionReport::default();

        if let Some(leg) = event.color_leg() {
            let command = GroupCommand::color_leg(leg.to, leg.duration);
            report.record(issue(&self.gateway, name, Leg::Color, &command).await);
            self.time.sleep_until(after(started, leg.duration)).await;
        }

        let brightness = event.brightness_duration();
        let issued_at = self.time.now();
        let command = GroupCommand::brightness_leg(event.direction, brightness);
        report.record(issue(&self.gateway, name, Leg::Brightness, &command).await);

        match event.direction {
            Direction::On => {
                self.time.sleep_until(after(issued_at, brightness)).await;
            }
            Direction::Off => {
                let settle = after(issued_at, event.color_duration() + brightness);
                self.time.sleep_until(settle.min(window_end)).await;
                let command = GroupCommand::power_off();
                report.record(issue(&self.gateway, name, Leg::PowerOff, &command).await);
            }
        }

        tracing::info!(sent = report.sent, failed = report.failed, "transition finished");
        report
    }
}
