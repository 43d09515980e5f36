//! Motion Sample Filter.
//!
//! Classifies each acceleration sample as shake or not. Pure and stateless.

use crate::model::MotionSample;

/// Threshold classifier over acceleration magnitude.
#[derive(Debug, Clone, Copy)]
pub struct MotionFilter {
    threshold: f64,
}

impl MotionFilter {
    /// Create a filter with the given magnitude threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Euclidean norm of the acceleration vector.
    pub fn magnitude(sample: &MotionSample) -> f64 {
        (sample.x * sample.x + sample.y * sample.y + sample.z * sample.z).sqrt()
    }

    /// True iff the magnitude is finite and strictly above the threshold.
    ///
    /// NaN and infinite components classify as non-shake.
    pub fn is_shake(&self, sample: &MotionSample) -> bool {
        let mag = Self::magnitude(sample);
        mag.is_finite() && mag > self.threshold
    }
}
