//! CIE 1931 chromaticity coordinates.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Per-axis tolerance when comparing an expected and a reported color.
pub const COLOR_TOLERANCE: f64 = 0.05;

/// A chromaticity pair, persisted and sent on the wire as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `to`; `progress` is clamped to `0..=1`.
    #[must_use]
    pub fn lerp(self, to: Self, progress: f64) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            x: self.x + p * (to.x - self.x),
            y: self.y + p * (to.y - self.y),
        }
    }

    /// Whether both axes are within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Check that both axes lie in the chromaticity plane `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ChromaticityOutOfRange`] naming the first
    /// offending axis.
    pub fn validate(self) -> Result<(), ValidationError> {
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ChromaticityOutOfRange { axis, value });
            }
        }
        Ok(())
    }
}

impl From<[f64; 2]> for Xy {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Xy> for [f64; 2] {
    fn from(value: Xy) -> Self {
        [value.x, value.y]
    }
}

impl std::fmt::Display for Xy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.x, self.y)
    }
}
