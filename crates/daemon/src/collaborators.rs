//! Interfaces to everything outside the trigger engine: location, delivery,
//! telephony, permissions and user-facing alerts.

use std::time::Duration;

use async_trait::async_trait;
use lifeline_core::{LocationFix, LocationPayload, Permission, PermissionGrant};
use thiserror::Error;

/// Failure reported by a collaborator. Never retried.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),
    #[error("delivery to {email} failed: {reason}")]
    Delivery { email: String, reason: String },
    #[error("call to {number} failed: {reason}")]
    Call { number: String, reason: String },
}

/// Options for a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, request: LocationRequest) -> Result<LocationFix, CollaboratorError>;
}

/// Delivers one recipient's location payload.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn post(&self, payload: &LocationPayload) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait Telephony: Send + Sync {
    async fn call(&self, number: &str) -> Result<(), CollaboratorError>;
}

/// Asks the platform for permissions. Resolves once the user answered.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self, permissions: &[Permission]) -> PermissionGrant;
}

/// Signals meant for the person holding the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// A trigger fired but there is nobody to call or notify.
    MissingConfiguration(String),
    /// Call and/or location permission was refused.
    PermissionsDenied(PermissionGrant),
    /// An emergency was accepted and the action sequence started.
    EmergencySent { trigger_id: String },
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::MissingConfiguration(_) => "No Emergency Contact",
            Alert::PermissionsDenied(_) => "Permissions Denied",
            Alert::EmergencySent { .. } => "Emergency Alert Sent",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Alert::MissingConfiguration(reason) => {
                format!("Please set an emergency number and emails ({reason}).")
            }
            Alert::PermissionsDenied(grant) => {
                let mut missing = Vec::new();
                if !grant.call {
                    missing.push("call");
                }
                if !grant.location {
                    missing.push("location");
                }
                format!("Grant {} permission.", missing.join(" and "))
            }
            Alert::EmergencySent { trigger_id } => format!("Emergency {trigger_id} sent."),
        }
    }
}

pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}
