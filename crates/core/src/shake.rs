//! Shake Sequence Detector.
//!
//! Turns a stream of shake classifications into a single
//! "pattern complete" event. Counted shakes must be chained: each one lands
//! at least `min_interval_ms` and less than `window_ms` after the previous
//! counted shake.
//!
//! ```text
//!   gap < min_interval        ignore (jitter from one physical shake)
//!   min_interval <= gap < window   count += 1
//!   otherwise                 count = 1
//! ```

use crate::time::MonoMs;
use crate::tuning::TriggerTuning;

/// Counter state. Reset to `{0, None}` whenever a pattern completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShakeDetectorState {
    /// Chained shakes counted so far.
    pub shake_count: u32,
    /// Time of the last counted shake.
    pub last_shake_ms: Option<MonoMs>,
}

/// Stateful shake pattern detector.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    window_ms: i64,
    min_interval_ms: i64,
    required: u32,
    state: ShakeDetectorState,
}

impl ShakeDetector {
    /// Create a detector from tuning constants.
    pub fn new(tuning: &TriggerTuning) -> Self {
        Self {
            window_ms: tuning.shake_window_ms as i64,
            min_interval_ms: tuning.min_shake_interval_ms as i64,
            required: tuning.required_shakes.max(1),
            state: ShakeDetectorState::default(),
        }
    }

    /// Feed one classified shake at time `t`.
    ///
    /// Returns true when the pattern completes. The state is reset in the same
    /// call, so the shakes that completed it never count again.
    pub fn on_shake(&mut self, t: MonoMs) -> bool {
        match self.state.last_shake_ms {
            Some(last) if t - last < self.min_interval_ms => return false,
            Some(last) if t - last < self.window_ms => self.state.shake_count += 1,
            _ => self.state.shake_count = 1,
        }
        self.state.last_shake_ms = Some(t);

        if self.state.shake_count >= self.required {
            self.state = ShakeDetectorState::default();
            return true;
        }
        false
    }

    /// Current counter state.
    pub fn state(&self) -> ShakeDetectorState {
        self.state
    }
}
