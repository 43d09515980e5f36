//! Thresholds and timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every timing and threshold constant of the engine.
///
/// Deserializes from partial documents; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerTuning {
    /// Acceleration magnitude a sample must exceed to count as a shake.
    pub shake_threshold: f64,
    /// Shakes needed to complete the pattern.
    pub required_shakes: u32,
    /// Maximum gap between consecutive counted shakes.
    pub shake_window_ms: u64,
    /// Shakes closer than this to the previous one are jitter and ignored.
    pub min_shake_interval_ms: u64,
    /// Minimum spacing between two accepted triggers.
    pub cooldown_ms: u64,
    /// Delay before chord latches and the triggered flag are cleared.
    pub reset_delay_ms: u64,
    /// Upper bound on the location fetch.
    pub location_timeout_ms: u64,
}

impl Default for TriggerTuning {
    fn default() -> Self {
        Self {
            shake_threshold: 15.0,
            required_shakes: 3,
            shake_window_ms: 1_000,
            min_shake_interval_ms: 300,
            cooldown_ms: 10_000,
            reset_delay_ms: 5_000,
            location_timeout_ms: 6_000,
        }
    }
}

impl TriggerTuning {
    /// Location fetch bound as a `Duration`.
    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }
}
