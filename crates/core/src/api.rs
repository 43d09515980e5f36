//! Request and response bodies of the daemon HTTP API, shared with the
//! control client.

use serde::{Deserialize, Serialize};

use crate::arbiter::TriggerDecision;
use crate::model::{TriggerRecord, TriggerSource};

/// Raw accelerometer reading as sent by a motion source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionReading {
    /// Acceleration along x, m/s².
    pub x: f64,
    /// Acceleration along y, m/s².
    pub y: f64,
    /// Acceleration along z, m/s².
    pub z: f64,
}

/// Motion ingest body: either one reading or a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MotionIngestRequest {
    /// Readings stamped with one shared arrival time. Shakes inside a batch
    /// are closer together than the jitter interval, so at most one of them
    /// counts. Send a live sensor stream one reading per request.
    Batch {
        /// Readings in arrival order.
        samples: Vec<MotionReading>,
    },
    /// A single reading.
    Single(MotionReading),
}

impl MotionIngestRequest {
    /// Readings in arrival order.
    pub fn into_readings(self) -> Vec<MotionReading> {
        match self {
            MotionIngestRequest::Batch { samples } => samples,
            MotionIngestRequest::Single(reading) => vec![reading],
        }
    }
}

/// Volume ingest body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIngestRequest {
    /// New volume level.
    pub value: i32,
}

/// Serializable form of a [`TriggerDecision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The action sequence was started.
    Accepted {
        /// ULID of the accepted trigger.
        trigger_id: String,
        /// Detector that fired.
        source: TriggerSource,
    },
    /// Dropped by the cooldown.
    Suppressed {
        /// Detector that fired.
        source: TriggerSource,
        /// Time left in the cooldown.
        remaining_ms: u64,
    },
    /// Dropped because no usable contact configuration is loaded.
    MissingConfig {
        /// Detector that fired.
        source: TriggerSource,
        /// What is missing.
        reason: String,
    },
}

impl From<&TriggerDecision> for TriggerOutcome {
    fn from(decision: &TriggerDecision) -> Self {
        match decision {
            TriggerDecision::Accepted(record) => TriggerOutcome::Accepted {
                trigger_id: record.trigger_id.clone(),
                source: record.source,
            },
            TriggerDecision::Suppressed {
                source,
                remaining_ms,
            } => TriggerOutcome::Suppressed {
                source: *source,
                remaining_ms: *remaining_ms,
            },
            TriggerDecision::MissingConfig { source, error } => TriggerOutcome::MissingConfig {
                source: *source,
                reason: error.to_string(),
            },
        }
    }
}

/// Ingest response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Number of readings queued.
    pub received: usize,
    /// Decisions produced while processing them (usually empty).
    pub outcomes: Vec<TriggerOutcome>,
}

/// Current engine state as reported by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// A complete configuration is loaded.
    pub armed: bool,
    /// An emergency was sent and the deferred reset has not run yet.
    pub triggered: bool,
    /// Accepted triggers since startup.
    pub triggers_accepted: u64,
    /// Most recent accepted trigger.
    pub last_trigger: Option<TriggerRecord>,
    /// Shakes counted towards the current pattern.
    pub shake_count: u32,
    /// Volume-up latch.
    pub chord_up: bool,
    /// Volume-down latch.
    pub chord_down: bool,
    /// Last volume level seen, if any.
    pub volume_level: Option<i32>,
}

/// Error body returned by the daemon API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human readable message.
    pub error: String,
}
