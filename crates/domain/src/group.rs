//! Lamp group state as reported by the gateway, and partial commands sent to it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Xy;
use crate::event::Direction;
use crate::transition::TransitionTime;

/// Full brightness.
pub const BRI_MAX: u8 = 254;

/// Dimmest level that keeps the group logically on. Fades to `OFF` stop
/// here so the gateway keeps animating; the final power-off is separate.
pub const BRI_FLOOR: u8 = 1;

/// Relative tolerance when comparing expected and reported brightness.
pub const BRIGHTNESS_TOLERANCE: f64 = 0.10;

impl Direction {
    /// Brightness the brightness leg fades towards.
    #[must_use]
    pub fn target_brightness(self) -> u8 {
        match self {
            Self::On => BRI_MAX,
            Self::Off => BRI_FLOOR,
        }
    }

    /// Expected brightness at `progress` through the brightness leg:
    /// ON ramps 0 → 254, OFF ramps 254 → 1.
    #[must_use]
    pub fn brightness_at(self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        let max = f64::from(BRI_MAX);
        match self {
            Self::On => p * max,
            Self::Off => max - p * (max - f64::from(BRI_FLOOR)),
        }
    }
}

/// Whether `actual` is within ±10 % of `expected`.
#[must_use]
pub fn brightness_matches(expected: f64, actual: u8) -> bool {
    let actual = f64::from(actual);
    let lower = expected * (1.0 - BRIGHTNESS_TOLERANCE);
    let upper = expected * (1.0 + BRIGHTNESS_TOLERANCE);
    (lower..=upper).contains(&actual)
}

/// Group state reported by the gateway (the group's `action` object).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupState {
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub bri: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<Xy>,
}

impl GroupState {
    /// Whether the brightness already meets or passes the leg's target.
    #[must_use]
    pub fn reached_brightness(&self, direction: Direction) -> bool {
        match direction {
            Direction::On => self.bri >= BRI_MAX,
            Direction::Off => self.bri <= BRI_FLOOR,
        }
    }
}

/// A partial desired state. Absent fields are left untouched by the gateway.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xy: Option<Xy>,
    #[serde(rename = "transitiontime", skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionTime>,
}

impl GroupCommand {
    /// Fade the color towards `to` over `duration` (clamped to one hour).
    #[must_use]
    pub fn color_leg(to: Xy, duration: Duration) -> Self {
        Self {
            on: Some(true),
            xy: Some(to),
            transition: Some(TransitionTime::from_duration(duration)),
            ..Self::default()
        }
    }

    /// Fade the brightness towards the direction's target over `duration`
    /// (clamped to one hour). The group stays on either way.
    #[must_use]
    pub fn brightness_leg(direction: Direction, duration: Duration) -> Self {
        Self {
            on: Some(true),
            bri: Some(direction.target_brightness()),
            transition: Some(TransitionTime::from_duration(duration)),
            ..Self::default()
        }
    }

    /// Switch the group off immediately.
    #[must_use]
    pub fn power_off() -> Self {
        Self {
            on: Some(false),
            ..Self::default()
        }
    }
}
