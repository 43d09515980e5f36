//! Action Sequencer.
//!
//! Runs the side effects of one accepted trigger: permission request, then
//! location broadcast and phone call side by side. Every step is best effort:
//! failures are logged and reported, never retried, and never stop a sibling
//! step.

use std::sync::Arc;
use std::time::Duration;

use lifeline_core::{
    EmergencyConfig, LocationFix, LocationPayload, Permission, PermissionGrant, TriggerRecord,
};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::collaborators::{
    Alert, AlertSink, LocationProvider, LocationRequest, NotificationTransport, PermissionGate,
    Telephony,
};

/// The external collaborators one sequence talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub location: Arc<dyn LocationProvider>,
    pub transport: Arc<dyn NotificationTransport>,
    pub telephony: Arc<dyn Telephony>,
    pub permissions: Arc<dyn PermissionGate>,
    pub alerts: Arc<dyn AlertSink>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    Fixed(LocationFix),
    Failed(String),
    TimedOut,
    /// Location permission was not granted.
    Skipped,
}

/// Result of one recipient's delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub email: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Placed,
    Failed(String),
    /// Call permission was not granted.
    Skipped,
}

/// What happened during one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    pub trigger_id: String,
    pub permissions: PermissionGrant,
    pub location: LocationOutcome,
    /// In completion order, not recipient order.
    pub deliveries: Vec<DeliveryOutcome>,
    pub call: CallOutcome,
}

impl SequenceReport {
    /// Number of recipients whose delivery succeeded.
    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.error.is_none()).count()
    }
}

pub struct ActionSequencer {
    collaborators: Collaborators,
    location_timeout: Duration,
}

impl ActionSequencer {
    pub fn new(collaborators: Collaborators, location_timeout: Duration) -> Self {
        Self {
            collaborators,
            location_timeout,
        }
    }

    /// Run every action for `trigger` once.
    pub async fn run(&self, trigger: &TriggerRecord, config: &EmergencyConfig) -> SequenceReport {
        let permissions = self
            .collaborators
            .permissions
            .request(&[Permission::Call, Permission::Location])
            .await;
        if !permissions.all_granted() {
            warn!(
                trigger_id = %trigger.trigger_id,
                call = permissions.call,
                location = permissions.location,
                "permissions denied"
            );
            self.collaborators
                .alerts
                .alert(Alert::PermissionsDenied(permissions));
        }

        let ((location, deliveries), call) = tokio::join!(
            self.broadcast_location(trigger, config, permissions.allows(Permission::Location)),
            self.place_call(trigger, &config.contact_number, permissions.allows(Permission::Call)),
        );

        SequenceReport {
            trigger_id: trigger.trigger_id.clone(),
            permissions,
            location,
            deliveries,
            call,
        }
    }

    async fn broadcast_location(
        &self,
        trigger: &TriggerRecord,
        config: &EmergencyConfig,
        allowed: bool,
    ) -> (LocationOutcome, Vec<DeliveryOutcome>) {
        if !allowed {
            return (LocationOutcome::Skipped, Vec::new());
        }

        let request = LocationRequest {
            high_accuracy: true,
            timeout: self.location_timeout,
        };
        let position = self.collaborators.location.current_position(request);
        let fix = match tokio::time::timeout(self.location_timeout, position).await {
            Ok(Ok(fix)) => fix,
            Ok(Err(e)) => {
                warn!(trigger_id = %trigger.trigger_id, error = %e, "could not retrieve location");
                return (LocationOutcome::Failed(e.to_string()), Vec::new());
            }
            Err(_) => {
                warn!(
                    trigger_id = %trigger.trigger_id,
                    timeout_ms = self.location_timeout.as_millis() as u64,
                    "location request timed out"
                );
                return (LocationOutcome::TimedOut, Vec::new());
            }
        };

        let mut tasks = JoinSet::new();
        for email in &config.recipient_emails {
            let transport = Arc::clone(&self.collaborators.transport);
            let payload = LocationPayload::new(fix, email.clone());
            tasks.spawn(async move {
                let result = transport.post(&payload).await;
                DeliveryOutcome {
                    email: payload.email,
                    error: result.err().map(|e| e.to_string()),
                }
            });
        }

        let mut deliveries = Vec::with_capacity(config.recipient_emails.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    match &outcome.error {
                        Some(error) => warn!(
                            trigger_id = %trigger.trigger_id,
                            email = %outcome.email,
                            error = %error,
                            "failed to send location"
                        ),
                        None => info!(
                            trigger_id = %trigger.trigger_id,
                            email = %outcome.email,
                            "location sent"
                        ),
                    }
                    deliveries.push(outcome);
                }
                Err(e) => warn!(trigger_id = %trigger.trigger_id, error = %e, "delivery task aborted"),
            }
        }

        (LocationOutcome::Fixed(fix), deliveries)
    }

    async fn place_call(&self, trigger: &TriggerRecord, number: &str, allowed: bool) -> CallOutcome {
        if !allowed {
            return CallOutcome::Skipped;
        }
        match self.collaborators.telephony.call(number).await {
            Ok(()) => CallOutcome::Placed,
            Err(e) => {
                warn!(trigger_id = %trigger.trigger_id, error = %e, "call failed");
                CallOutcome::Failed(e.to_string())
            }
        }
    }
}
