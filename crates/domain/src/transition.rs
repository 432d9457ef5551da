//! Transition durations and their gateway encoding.
//!
//! The gateway animates a leg over `transitiontime`, expressed in tenths of
//! a second and capped device-side at one hour.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest leg the gateway accepts, in seconds.
pub const MAX_TRANSITION_SECS: u64 = 3600;

/// Longest leg the gateway accepts.
pub const MAX_TRANSITION: Duration = Duration::from_secs(MAX_TRANSITION_SECS);

/// Clamp a leg duration to [`MAX_TRANSITION`].
#[must_use]
pub fn clamp_duration(duration: Duration) -> Duration {
    duration.min(MAX_TRANSITION)
}

/// A leg duration in the gateway's native unit (1/10 s), at most 36000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionTime(u16);

impl TransitionTime {
    /// Largest encodable value (one hour).
    pub const MAX: Self = Self(36_000);

    /// Encode a duration, clamping it to one hour first. Sub-decisecond
    /// remainders are dropped.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let tenths = clamp_duration(duration).as_millis() / 100;
        Self(u16::try_from(tenths).unwrap_or(Self::MAX.0))
    }

    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::from_duration(Duration::from_secs(secs))
    }

    #[must_use]
    pub fn units(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0) * 100)
    }
}
