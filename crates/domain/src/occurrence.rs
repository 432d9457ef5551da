//! Occurrences: one event's window on one calendar day.
//!
//! Where a fade "should be" is never stored: it is recomputed from the
//! wall clock and the event's persisted time fields every time it is needed.

use std::time::Duration;

use chrono::NaiveDate;

use crate::event::{Direction, EventDefinition};
use crate::time::{Timestamp, after, since};

/// Where an occurrence stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    ColorLeg { elapsed: Duration, remaining: Duration },
    BrightnessLeg { elapsed: Duration, remaining: Duration },
    /// Both legs are done; a fade to `OFF` still owes its power-off.
    AwaitingPowerOff,
    Completed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not_started"),
            Self::ColorLeg { .. } => f.write_str("color_leg"),
            Self::BrightnessLeg { .. } => f.write_str("brightness_leg"),
            Self::AwaitingPowerOff => f.write_str("awaiting_power_off"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// An event's window anchored on a date: `[start, end)`, with `end` pushed
/// to the next day when the window wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start: Timestamp,
    pub end: Timestamp,
    pub direction: Direction,
    pub color: Duration,
    pub brightness: Duration,
}

impl Occurrence {
    /// The occurrence of `event` whose start falls on `date`.
    #[must_use]
    pub fn anchored(event: &EventDefinition, date: NaiveDate) -> Self {
        let start = event.start_time.on(date);
        let mut end = event.completion_time.on(date);
        if event.wraps_midnight() {
            end = after(end, Duration::from_secs(24 * 3600));
        }
        Self {
            date,
            start,
            end,
            direction: event.direction,
            color: event.color_duration(),
            brightness: event.brightness_duration(),
        }
    }

    /// The occurrence whose window contains `now`, if the event owns one.
    ///
    /// Checks today's occurrence and, for windows wrapping past midnight,
    /// yesterday's.
    #[must_use]
    pub fn active_at(event: &EventDefinition, now: Timestamp) -> Option<Self> {
        let today = now.date();
        let candidates = [Some(today), today.pred_opt().filter(|_| event.wraps_midnight())];
        candidates
            .into_iter()
            .flatten()
            .filter(|date| event.occurs_on(*date))
            .map(|date| Self::anchored(event, date))
            .find(|occurrence| occurrence.contains(now))
    }

    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        self.start <= now && now < self.end
    }

    /// Time since the window opened (zero before it opens).
    #[must_use]
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        since(now, self.start)
    }

    /// Time since the brightness leg began, or `None` while the color leg
    /// (or the window itself) has not finished yet.
    #[must_use]
    pub fn brightness_elapsed(&self, now: Timestamp) -> Option<Duration> {
        if now < self.start {
            return None;
        }
        self.elapsed(now).checked_sub(self.color)
    }

    /// When the color leg should end.
    #[must_use]
    pub fn color_deadline(&self) -> Timestamp {
        after(self.start, self.color)
    }

    /// When the brightness leg should end.
    #[must_use]
    pub fn brightness_deadline(&self) -> Timestamp {
        after(self.color_deadline(), self.brightness)
    }

    #[must_use]
    pub fn phase(&self, now: Timestamp) -> Phase {
        if now < self.start {
            return Phase::NotStarted;
        }
        let elapsed = self.elapsed(now);
        if elapsed < self.color {
            return Phase::ColorLeg {
                elapsed,
                remaining: self.color - elapsed,
            };
        }
        let bri_elapsed = elapsed - self.color;
        if bri_elapsed < self.brightness {
            return Phase::BrightnessLeg {
                elapsed: bri_elapsed,
                remaining: self.brightness - bri_elapsed,
            };
        }
        if self.direction == Direction::Off && now < self.end {
            return Phase::AwaitingPowerOff;
        }
        Phase::Completed
    }
}
