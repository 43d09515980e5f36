//! Trigger Arbiter.
//!
//! The single serialization point between the detectors and the action
//! sequence. Whichever detector fires, at most one trigger is accepted per
//! cooldown window. Callers must hold the arbiter behind one owner (the
//! daemon's dispatcher task) so the cooldown check-and-set is atomic.

use tracing::debug;

use crate::error::ConfigError;
use crate::model::{EmergencyConfig, TriggerRecord, TriggerSource};
use crate::time::{new_ulid, now_ms, MonoMs};
use crate::tuning::TriggerTuning;
use crate::validation::check_complete;

/// Time of the last accepted trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownClock {
    /// `None` until the first accepted trigger.
    pub last_trigger_ms: Option<MonoMs>,
}

impl CooldownClock {
    /// Milliseconds left in the cooldown at `now`, or `None` when not cooling down.
    pub fn remaining(&self, now: MonoMs, cooldown_ms: u64) -> Option<u64> {
        let last = self.last_trigger_ms?;
        let elapsed = now - last;
        let cooldown = cooldown_ms as i64;
        (elapsed < cooldown).then(|| (cooldown - elapsed) as u64)
    }
}

/// Outcome of a trigger request.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerDecision {
    /// Run the action sequence.
    Accepted(TriggerRecord),
    /// Inside the cooldown window. Silent; nothing changed.
    Suppressed {
        /// Detector that fired.
        source: TriggerSource,
        /// Time left in the cooldown.
        remaining_ms: u64,
    },
    /// Configuration missing or incomplete. Must be surfaced to the user.
    MissingConfig {
        /// Detector that fired.
        source: TriggerSource,
        /// Why the configuration is unusable.
        error: ConfigError,
    },
}

impl TriggerDecision {
    /// True for [`TriggerDecision::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, TriggerDecision::Accepted(_))
    }

    /// Detector that asked for the trigger.
    pub fn source(&self) -> TriggerSource {
        match self {
            TriggerDecision::Accepted(record) => record.source,
            TriggerDecision::Suppressed { source, .. } => *source,
            TriggerDecision::MissingConfig { source, .. } => *source,
        }
    }
}

/// Cooldown gate plus configuration check.
#[derive(Debug, Clone)]
pub struct TriggerArbiter {
    cooldown_ms: u64,
    reset_delay_ms: u64,
    clock: CooldownClock,
}

impl TriggerArbiter {
    /// Create an arbiter from tuning constants.
    pub fn new(tuning: &TriggerTuning) -> Self {
        Self {
            cooldown_ms: tuning.cooldown_ms,
            reset_delay_ms: tuning.reset_delay_ms,
            clock: CooldownClock::default(),
        }
    }

    /// Decide whether a detector event at `now` becomes a trigger.
    ///
    /// Order matters: the cooldown is checked before the configuration, and a
    /// configuration failure does not start a cooldown.
    pub fn request_trigger(
        &mut self,
        source: TriggerSource,
        config: Option<&EmergencyConfig>,
        now: MonoMs,
    ) -> TriggerDecision {
        if let Some(remaining_ms) = self.clock.remaining(now, self.cooldown_ms) {
            debug!(source = source.as_str(), remaining_ms, "trigger suppressed by cooldown");
            return TriggerDecision::Suppressed {
                source,
                remaining_ms,
            };
        }

        if let Err(error) = check_complete(config) {
            return TriggerDecision::MissingConfig { source, error };
        }

        self.clock.last_trigger_ms = Some(now);
        TriggerDecision::Accepted(TriggerRecord {
            trigger_id: new_ulid().to_string(),
            source,
            at_ms: now,
            wall_ms: now_ms(),
            reset_after_ms: self.reset_delay_ms,
        })
    }

    /// Current cooldown state.
    pub fn clock(&self) -> CooldownClock {
        self.clock
    }
}
