//! Drift assessment: expected versus reported group state.
//!
//! The expected value of each leg is a straight line from the leg's start
//! value to its target, indexed by wall-clock progress through the leg. A
//! finished leg is expected to sit at its target.

use std::time::Duration;

use crate::color::{COLOR_TOLERANCE, Xy};
use crate::event::EventDefinition;
use crate::group::{GroupState, brightness_matches};
use crate::occurrence::{Occurrence, Phase};
use crate::time::Timestamp;

/// Expected and reported color for the color leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCheck {
    pub expected: Xy,
    pub actual: Option<Xy>,
    pub matches: bool,
    /// The leg's duration has fully elapsed.
    pub settled: bool,
}

/// Expected and reported brightness for the brightness leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessCheck {
    pub expected: f64,
    pub actual: u8,
    pub matches: bool,
    pub settled: bool,
}

/// Per-leg comparison of one active occurrence against the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    pub occurrence: Occurrence,
    pub elapsed: Duration,
    pub phase: Phase,
    /// `None` when the event has no color leg.
    pub color: Option<ColorCheck>,
    /// `None` until the brightness leg has started.
    pub brightness: Option<BrightnessCheck>,
}

impl DriftReport {
    /// Compare `state` with where `occurrence` of `event` should be at `now`.
    #[must_use]
    pub fn assess(
        event: &EventDefinition,
        occurrence: &Occurrence,
        now: Timestamp,
        state: &GroupState,
    ) -> Self {
        let elapsed = occurrence.elapsed(now);

        let color = event.color_leg().map(|leg| {
            let expected = leg.from.lerp(leg.to, progress(elapsed, leg.duration));
            ColorCheck {
                expected,
                actual: state.xy,
                matches: state
                    .xy
                    .is_some_and(|actual| actual.approx_eq(expected, COLOR_TOLERANCE)),
                settled: elapsed >= leg.duration,
            }
        });

        let brightness = occurrence.brightness_elapsed(now).map(|bri_elapsed| {
            let expected = occurrence
                .direction
                .brightness_at(progress(bri_elapsed, occurrence.brightness));
            BrightnessCheck {
                expected,
                actual: state.bri,
                matches: brightness_matches(expected, state.bri),
                settled: bri_elapsed >= occurrence.brightness,
            }
        });

        Self {
            occurrence: *occurrence,
            elapsed,
            phase: occurrence.phase(now),
            color,
            brightness,
        }
    }

    #[must_use]
    pub fn color_drifting(&self) -> bool {
        self.color.is_some_and(|c| !c.matches)
    }

    #[must_use]
    pub fn brightness_drifting(&self) -> bool {
        self.brightness.is_some_and(|b| !b.matches)
    }

    /// Any checked leg is outside tolerance.
    #[must_use]
    pub fn is_drifting(&self) -> bool {
        self.color_drifting() || self.brightness_drifting()
    }
}

/// Fraction of `total` covered by `elapsed`, in `0..=1`. A zero-length leg
/// counts as complete.
#[must_use]
pub fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}
