//! Host-side stand-ins for the device APIs.
//!
//! A daemon has no dialer, GPS or permission dialog. These adapters satisfy the
//! collaborator contracts from startup flags and report through `tracing`.

use async_trait::async_trait;
use lifeline_core::{LocationFix, Permission, PermissionGrant};
use tracing::{info, warn};

use crate::collaborators::{
    Alert, AlertSink, CollaboratorError, LocationProvider, LocationRequest, PermissionGate, Telephony,
};

/// Returns a configured position, or fails when none was given.
pub struct FixedLocationProvider {
    fix: Option<LocationFix>,
}

impl FixedLocationProvider {
    pub fn new(fix: Option<LocationFix>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self, _request: LocationRequest) -> Result<LocationFix, CollaboratorError> {
        self.fix
            .ok_or_else(|| CollaboratorError::LocationUnavailable("no position fix configured".into()))
    }
}

/// Records the call request in the log.
pub struct LogTelephony;

#[async_trait]
impl Telephony for LogTelephony {
    async fn call(&self, number: &str) -> Result<(), CollaboratorError> {
        info!(number, "placing emergency call");
        Ok(())
    }
}

/// Answers every request from a fixed grant.
pub struct StaticPermissionGate {
    grant: PermissionGrant,
}

impl StaticPermissionGate {
    pub fn new(grant: PermissionGrant) -> Self {
        Self { grant }
    }
}

#[async_trait]
impl PermissionGate for StaticPermissionGate {
    async fn request(&self, permissions: &[Permission]) -> PermissionGrant {
        PermissionGrant {
            call: permissions.contains(&Permission::Call) && self.grant.call,
            location: permissions.contains(&Permission::Location) && self.grant.location,
        }
    }
}

/// Surfaces alerts through the log.
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&self, alert: Alert) {
        match &alert {
            Alert::EmergencySent { .. } => info!(title = alert.title(), "{}", alert.message()),
            _ => warn!(title = alert.title(), "{}", alert.message()),
        }
    }
}
