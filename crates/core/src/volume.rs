//! Volume Chord Detector.
//!
//! Watches volume-level changes and reports once both an increase and a
//! decrease have been seen since the last reset. The latches are not cleared
//! here: the arbiter's deferred reset does that, so until then every further
//! level change keeps reporting the chord.

/// Latched direction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeState {
    /// `None` until the first reading.
    pub last_level: Option<i32>,
    /// An increase was seen since the last reset.
    pub up_seen: bool,
    /// A decrease was seen since the last reset.
    pub down_seen: bool,
}

/// Stateful chord detector.
#[derive(Debug, Clone, Default)]
pub struct VolumeChordDetector {
    state: VolumeState,
}

impl VolumeChordDetector {
    /// Detector with an unknown starting level. The first reading only seeds it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector seeded with the level read at startup.
    pub fn with_initial(level: i32) -> Self {
        Self {
            state: VolumeState {
                last_level: Some(level),
                ..VolumeState::default()
            },
        }
    }

    /// Feed a new level. Returns true when the chord is satisfied.
    ///
    /// A reading equal to the last level changes nothing and reports nothing.
    pub fn on_level(&mut self, level: i32) -> bool {
        if let Some(last) = self.state.last_level {
            if level == last {
                return false;
            }
            if level > last {
                self.state.up_seen = true;
            } else {
                self.state.down_seen = true;
            }
        }
        self.state.last_level = Some(level);
        self.state.up_seen && self.state.down_seen
    }

    /// Clear both latches. The last level is kept.
    pub fn reset(&mut self) {
        self.state.up_seen = false;
        self.state.down_seen = false;
    }

    /// Current latches and level.
    pub fn state(&self) -> VolumeState {
        self.state
    }
}
