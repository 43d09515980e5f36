//! Values passed between the detectors, the arbiter and the action sequence.

use serde::{Deserialize, Serialize};

use crate::time::{EpochMs, MonoMs};

/// One 3-axis acceleration reading, stamped when it reached the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Acceleration along x, m/s².
    pub x: f64,
    /// Acceleration along y, m/s².
    pub y: f64,
    /// Acceleration along z, m/s².
    pub z: f64,
    /// Arrival time on the engine clock.
    pub timestamp_ms: MonoMs,
}

impl MotionSample {
    /// Creates a sample.
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: MonoMs) -> Self {
        Self { x, y, z, timestamp_ms }
    }
}

/// Which detector asked for the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// Shake pattern completed.
    Shake,
    /// Volume up and volume down both observed.
    VolumeChord,
}

impl TriggerSource {
    /// Stable lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Shake => "shake",
            TriggerSource::VolumeChord => "volume_chord",
        }
    }
}

/// Who to call and who to notify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Number dialled on an accepted trigger.
    pub contact_number: String,
    /// Notified in no particular order.
    pub recipient_emails: Vec<String>,
}

impl EmergencyConfig {
    /// Creates a configuration snapshot.
    pub fn new(contact_number: impl Into<String>, recipient_emails: Vec<String>) -> Self {
        Self {
            contact_number: contact_number.into(),
            recipient_emails,
        }
    }
}

/// A position returned by the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

/// Body posted to the notification endpoint, one per recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Recipient of this payload.
    pub email: String,
}

impl LocationPayload {
    /// Builds the payload for one recipient.
    pub fn new(fix: LocationFix, email: impl Into<String>) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            email: email.into(),
        }
    }
}

/// Platform permissions the action sequence depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Place a phone call.
    Call,
    /// Read the device position.
    Location,
}

/// Answer from the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Calling is allowed.
    pub call: bool,
    /// Location access is allowed.
    pub location: bool,
}

impl PermissionGrant {
    /// Both permissions granted.
    pub fn all() -> Self {
        Self {
            call: true,
            location: true,
        }
    }

    /// Nothing granted.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a single permission is held.
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Call => self.call,
            Permission::Location => self.location,
        }
    }

    /// True only when every requested permission was granted.
    pub fn all_granted(&self) -> bool {
        self.call && self.location
    }
}

/// An accepted trigger. Exactly one exists per cooldown window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// ULID.
    pub trigger_id: String,
    /// Detector that fired.
    pub source: TriggerSource,
    /// Engine clock time of acceptance.
    pub at_ms: MonoMs,
    /// Wall clock time of acceptance.
    pub wall_ms: EpochMs,
    /// Delay after which the chord latches and the triggered flag are cleared.
    pub reset_after_ms: u64,
}
