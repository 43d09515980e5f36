//! Composition of filter, detectors and arbiter.
//!
//! A `TriggerEngine` is owned by exactly one dispatcher. All detector and
//! cooldown state lives inside it, so holding `&mut TriggerEngine` is the
//! critical section for every event.

use crate::arbiter::{CooldownClock, TriggerArbiter, TriggerDecision};
use crate::model::{EmergencyConfig, MotionSample, TriggerSource};
use crate::motion::MotionFilter;
use crate::shake::{ShakeDetector, ShakeDetectorState};
use crate::time::MonoMs;
use crate::tuning::TriggerTuning;
use crate::volume::{VolumeChordDetector, VolumeState};

/// Read-only view of the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Shake counter.
    pub shake: ShakeDetectorState,
    /// Chord latches and last level.
    pub volume: VolumeState,
    /// Last accepted trigger time.
    pub cooldown: CooldownClock,
}

/// Both detectors feeding one arbiter.
#[derive(Debug, Clone)]
pub struct TriggerEngine {
    filter: MotionFilter,
    shake: ShakeDetector,
    chord: VolumeChordDetector,
    arbiter: TriggerArbiter,
}

impl TriggerEngine {
    /// Engine with an unknown starting volume.
    pub fn new(tuning: &TriggerTuning) -> Self {
        Self {
            filter: MotionFilter::new(tuning.shake_threshold),
            shake: ShakeDetector::new(tuning),
            chord: VolumeChordDetector::new(),
            arbiter: TriggerArbiter::new(tuning),
        }
    }

    /// Seed the chord detector with the level read at startup.
    pub fn with_initial_volume(mut self, level: Option<i32>) -> Self {
        if let Some(level) = level {
            self.chord = VolumeChordDetector::with_initial(level);
        }
        self
    }

    /// Classify a motion sample. Returns a decision only when the shake
    /// pattern completed on this sample.
    pub fn on_motion(
        &mut self,
        sample: &MotionSample,
        config: Option<&EmergencyConfig>,
    ) -> Option<TriggerDecision> {
        if !self.filter.is_shake(sample) {
            return None;
        }
        if !self.shake.on_shake(sample.timestamp_ms) {
            return None;
        }
        Some(
            self.arbiter
                .request_trigger(TriggerSource::Shake, config, sample.timestamp_ms),
        )
    }

    /// Feed a volume level observed at `at`. Returns a decision whenever the
    /// chord is satisfied.
    pub fn on_volume(
        &mut self,
        level: i32,
        at: MonoMs,
        config: Option<&EmergencyConfig>,
    ) -> Option<TriggerDecision> {
        if !self.chord.on_level(level) {
            return None;
        }
        Some(
            self.arbiter
                .request_trigger(TriggerSource::VolumeChord, config, at),
        )
    }

    /// Deferred reset after an accepted trigger: clears the chord latches.
    pub fn reset_chord(&mut self) {
        self.chord.reset();
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            shake: self.shake.state(),
            volume: self.chord.state(),
            cooldown: self.arbiter.clock(),
        }
    }
}
