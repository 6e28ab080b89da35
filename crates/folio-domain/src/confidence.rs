//! Confidence scores

use std::fmt;

/// Extraction reliability estimate in the closed unit interval
///
/// This is a heuristic score, not a probability. Layers store the raw
/// `f64` (see [`crate::record`]) so that an out-of-range value can reach
/// the validator and be reported instead of silently clamped; extractors
/// and the linker produce scores through this type so they can never
/// leave [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    /// No signal
    pub const ZERO: Confidence = Confidence(0.0);

    /// Authoritative signal (manual overrides, exact path matches)
    pub const FULL: Confidence = Confidence(1.0);

    /// Create a confidence score
    ///
    /// # Errors
    /// Returns error if the value is NaN or outside [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self, String> {
        if is_unit_interval(value) {
            Ok(Self(value))
        } else {
            Err(format!("confidence {} out of range [0.0, 1.0]", value))
        }
    }

    /// Create a confidence score, clamping into [0.0, 1.0]
    ///
    /// NaN maps to zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw score
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Cap this score at `ceiling`
    pub fn capped_at(self, ceiling: Confidence) -> Self {
        if self.0 > ceiling.0 {
            ceiling
        } else {
            self
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// Check that a raw score lies in [0.0, 1.0]
pub fn is_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
