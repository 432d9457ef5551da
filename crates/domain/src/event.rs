//! Event definitions: scheduled fades persisted in the event store.
//!
//! An event describes one recurring fade of the lamp group: an optional
//! color leg followed by a brightness leg, and for fades to `OFF` a final
//! power-off at the completion time.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::color::Xy;
use crate::error::ValidationError;
use crate::recurrence::Recurrence;
use crate::time::{TimeOfDay, Timestamp};
use crate::transition::clamp_duration;

/// All known events, keyed (and iterated) by name.
pub type EventSet = BTreeMap<String, EventDefinition>;

/// Which way the brightness leg fades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ON", alias = "on", alias = "On")]
    On,
    #[serde(rename = "OFF", alias = "off", alias = "Off")]
    Off,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

/// A scheduled fade, as persisted in the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub direction: Direction,
    pub start_time: TimeOfDay,
    pub completion_time: TimeOfDay,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Execution marker: the last date the clock fired this event.
    #[serde(default, with = "marker")]
    pub last_executed: Option<NaiveDate>,
    #[serde(default)]
    pub color_change: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_color: Option<Xy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_color: Option<Xy>,
    /// Color leg duration in seconds, before clamping.
    #[serde(default)]
    pub color_transition_time: u64,
    /// Brightness leg duration in seconds, before clamping.
    #[serde(default)]
    pub brightness_transition_time: u64,
}

/// The color leg of an event: where it starts, where it ends, how long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLeg {
    pub from: Xy,
    pub to: Xy,
    pub duration: Duration,
}

impl EventDefinition {
    /// Create a builder for constructing an [`EventDefinition`].
    #[must_use]
    pub fn builder() -> EventDefinitionBuilder {
        EventDefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when:
    /// - `color_change` is set but a color is missing ([`ValidationError::MissingColor`])
    /// - a color lies outside the chromaticity plane
    /// - the recurrence day list is empty
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.color_change {
            let (Some(start), Some(end)) = (self.start_color, self.end_color) else {
                return Err(ValidationError::MissingColor);
            };
            start.validate()?;
            end.validate()?;
        }
        if matches!(&self.recurrence, Recurrence::Days(days) if days.is_empty()) {
            return Err(ValidationError::EmptyDayList);
        }
        Ok(())
    }

    /// Whether the window wraps past midnight.
    #[must_use]
    pub fn wraps_midnight(&self) -> bool {
        self.completion_time <= self.start_time
    }

    /// The color leg, when this event changes color.
    #[must_use]
    pub fn color_leg(&self) -> Option<ColorLeg> {
        if !self.color_change {
            return None;
        }
        Some(ColorLeg {
            from: self.start_color?,
            to: self.end_color?,
            duration: clamp_duration(Duration::from_secs(self.color_transition_time)),
        })
    }

    /// Clamped color leg duration; zero when the event has no color leg.
    #[must_use]
    pub fn color_duration(&self) -> Duration {
        self.color_leg().map_or(Duration::ZERO, |leg| leg.duration)
    }

    /// Clamped brightness leg duration.
    #[must_use]
    pub fn brightness_duration(&self) -> Duration {
        clamp_duration(Duration::from_secs(self.brightness_transition_time))
    }

    /// Whether either configured leg exceeds the gateway ceiling.
    #[must_use]
    pub fn needs_clamping(&self) -> bool {
        let max = crate::transition::MAX_TRANSITION_SECS;
        (self.color_change && self.color_transition_time > max)
            || self.brightness_transition_time > max
    }

    /// Whether the execution marker already holds `date`.
    #[must_use]
    pub fn executed_on(&self, date: NaiveDate) -> bool {
        self.last_executed == Some(date)
    }

    /// Whether an occurrence anchored on `date` belongs to this event.
    #[must_use]
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.recurrence.selects(date)
    }

    /// Whether the clock should fire this event at `now`.
    ///
    /// Due means: the recurrence selects today, `now` falls in the start
    /// minute, and the marker does not already hold today.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        let today = now.date();
        self.occurs_on(today)
            && TimeOfDay::of(now) == self.start_time
            && !self.executed_on(today)
    }
}

/// Step-by-step builder for [`EventDefinition`].
#[derive(Debug, Default)]
pub struct EventDefinitionBuilder {
    direction: Option<Direction>,
    start_time: Option<TimeOfDay>,
    completion_time: Option<TimeOfDay>,
    recurrence: Recurrence,
    last_executed: Option<NaiveDate>,
    colors: Option<(Xy, Xy)>,
    color_transition_time: u64,
    brightness_transition_time: u64,
}

impl EventDefinitionBuilder {
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn window(mut self, start: TimeOfDay, completion: TimeOfDay) -> Self {
        self.start_time = Some(start);
        self.completion_time = Some(completion);
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn last_executed(mut self, date: NaiveDate) -> Self {
        self.last_executed = Some(date);
        self
    }

    /// Add a color leg from `from` to `to` lasting `secs` seconds.
    #[must_use]
    pub fn color(mut self, from: Xy, to: Xy, secs: u64) -> Self {
        self.colors = Some((from, to));
        self.color_transition_time = secs;
        self
    }

    #[must_use]
    pub fn brightness_secs(mut self, secs: u64) -> Self {
        self.brightness_transition_time = secs;
        self
    }

    /// Consume the builder, validate, and return an [`EventDefinition`].
    ///
    /// Missing direction defaults to `ON`; a missing window defaults to
    /// `00:00`–`00:00`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the result breaks an invariant.
    pub fn build(self) -> Result<EventDefinition, ValidationError> {
        let event = EventDefinition {
            direction: self.direction.unwrap_or(Direction::On),
            start_time: self.start_time.unwrap_or(TimeOfDay::MIDNIGHT),
            completion_time: self.completion_time.unwrap_or(TimeOfDay::MIDNIGHT),
            recurrence: self.recurrence,
            last_executed: self.last_executed,
            color_change: self.colors.is_some(),
            start_color: self.colors.map(|(from, _)| from),
            end_color: self.colors.map(|(_, to)| to),
            color_transition_time: self.color_transition_time,
            brightness_transition_time: self.brightness_transition_time,
        };
        event.validate()?;
        Ok(event)
    }
}

/// `last_executed` is persisted as `"YYYY-MM-DD"`, or `""` when unset.
mod marker {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        crate::time::parse_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
