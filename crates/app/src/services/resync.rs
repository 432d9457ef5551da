//! Resynchronizer: puts a drifting fade back on its schedule.
//!
//! Nothing about the current leg is persisted. Where a fade should be is
//! recomputed from the clock and the event's time fields, and the original
//! final value is commanded again over whatever time the leg has left.

use std::time::Duration;

use wakelamp_domain::drift::DriftReport;
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::event::{Direction, EventDefinition};
use wakelamp_domain::group::GroupCommand;
use wakelamp_domain::occurrence::Occurrence;
use wakelamp_domain::time::after;

use crate::ports::{EventStore, Gateway, TimeSource};
use crate::services::executor::{Leg, issue};
use crate::services::monitor::{DEFAULT_SCAN_INTERVAL, active_occurrences, log_report};

/// What resumption did with one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegAction {
    /// The event has no such leg.
    NotApplicable,
    /// The leg's time is already over.
    Elapsed,
    /// The group already sits at (or past) the leg's target.
    AtTarget,
    /// The target was commanded again over the leg's remaining time.
    Reissued { remaining: Duration },
    /// The corrective command was rejected.
    Failed,
}

impl LegAction {
    fn in_progress(self) -> bool {
        matches!(self, Self::AtTarget | Self::Reissued { .. } | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeSummary {
    pub color: LegAction,
    pub brightness: LegAction,
    pub powered_off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No occurrence of the event is running right now.
    NotActive,
    /// The group state could not be read; nothing was sent.
    StateUnavailable,
    Resumed(ResumeSummary),
}

pub struct Resynchronizer<S, G, T> {
    store: S,
    gateway: G,
    time: T,
    interval: Duration,
}

impl<S: EventStore, G: Gateway, T: TimeSource> Resynchronizer<S, G, T> {
    pub fn new(store: S, gateway: G, time: T) -> Self {
        Self {
            store,
            gateway,
            time,
            interval: DEFAULT_SCAN_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Assess every active event and resume the ones that drifted.
    ///
    /// Resumptions run one after the other; each may wait for its legs.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the events cannot be loaded, or a
    /// gateway error when the group state cannot be fetched.
    pub async fn scan(&self) -> Result<Vec<(String, ResumeOutcome)>, WakeLampError> {
        let events = self.store.load().await?;
        let now = self.time.now();
        let active = active_occurrences(&events, now);
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.gateway.group_state().await?;
        let mut outcomes = Vec::new();
        for (name, event, occ) in active {
            let report = DriftReport::assess(event, &occ, now, &state);
            log_report(name, &report);
            if report.is_drifting() {
                let outcome = self.resume(name, event).await;
                outcomes.push((name.to_string(), outcome));
            }
        }
        Ok(outcomes)
    }

    /// Bring `event` back onto its schedule from wherever the group is now.
    #[tracing::instrument(skip(self, event), fields(direction = %event.direction))]
    pub async fn resume(&self, name: &str, event: &EventDefinition) -> ResumeOutcome {
        let now = self.time.now();
        let Some(occ) = Occurrence::active_at(event, now) else {
            tracing::info!("no active occurrence, nothing to resume");
            return ResumeOutcome::NotActive;
        };
        let state = match self.gateway.group_state().await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(%err, "cannot read group state, aborting resume");
                return ResumeOutcome::StateUnavailable;
            }
        };

        let elapsed = occ.elapsed(now);
        let color = match event.color_leg() {
            None => LegAction::NotApplicable,
            Some(leg) if elapsed < leg.duration => {
                let remaining = leg.duration - elapsed;
                tracing::info!(remaining_secs = remaining.as_secs(), "resuming color leg");
                let command = GroupCommand::color_leg(leg.to, remaining);
                let sent = issue(&self.gateway, name, Leg::Color, &command).await;
                self.time.sleep_until(occ.color_deadline()).await;
                if sent {
                    LegAction::Reissued { remaining }
                } else {
                    LegAction::Failed
                }
            }
            Some(_) => {
                tracing::debug!("color leg already elapsed");
                LegAction::Elapsed
            }
        };

        let now = self.time.now();
        let brightness = match occ.brightness_elapsed(now) {
            Some(bri_elapsed) if bri_elapsed < occ.brightness => {
                if state.reached_brightness(event.direction) {
                    tracing::debug!(bri = state.bri, "brightness already at target");
                    LegAction::AtTarget
                } else {
                    let remaining = occ.brightness - bri_elapsed;
                    tracing::info!(remaining_secs = remaining.as_secs(), "resuming brightness leg");
                    let command = GroupCommand::brightness_leg(event.direction, remaining);
                    if issue(&self.gateway, name, Leg::Brightness, &command).await {
                        LegAction::Reissued { remaining }
                    } else {
                        LegAction::Failed
                    }
                }
            }
            _ => {
                tracing::debug!("brightness leg already elapsed");
                LegAction::Elapsed
            }
        };

        let powered_off = if event.direction == Direction::Off && brightness.in_progress() {
            self.time.sleep_until(occ.end).await;
            issue(&self.gateway, name, Leg::PowerOff, &GroupCommand::power_off()).await
        } else {
            false
        };

        let summary = ResumeSummary {
            color,
            brightness,
            powered_off,
        };
        tracing::info!(?summary, "resume finished");
        ResumeOutcome::Resumed(summary)
    }

    /// Scan and resume forever, one pass per interval.
    pub async fn run(self) {
        loop {
            if let Err(err) = self.scan().await {
                tracing::warn!(%err, "resync scan failed, retrying next interval");
            }
            let next = after(self.time.now(), self.interval);
            self.time.sleep_until(next).await;
        }
    }
}
