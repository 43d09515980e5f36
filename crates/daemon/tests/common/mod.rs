#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lifeline_core::api::MotionReading;
use lifeline_core::{
    EmergencyConfig, LocationFix, LocationPayload, Permission, PermissionGrant, TriggerEngine,
    TriggerTuning,
};
use lifeline_daemon::collaborators::{
    Alert, AlertSink, CollaboratorError, LocationProvider, LocationRequest, NotificationTransport,
    PermissionGate, Telephony,
};
use lifeline_daemon::dispatcher::{Dispatcher, DispatcherHandle};
use lifeline_daemon::sequencer::{ActionSequencer, Collaborators, SequenceReport};
use tokio::sync::broadcast;

pub const FIX: LocationFix = LocationFix {
    latitude: 48.8566,
    longitude: 2.3522,
};

pub fn config() -> EmergencyConfig {
    EmergencyConfig::new(
        "5551234",
        vec![
            "a@example.com".into(),
            "b@example.com".into(),
            "c@example.com".into(),
        ],
    )
}

pub fn hard_shake() -> MotionReading {
    MotionReading {
        x: 14.0,
        y: 9.0,
        z: 3.0,
    }
}

#[derive(Clone, Copy)]
pub enum LocationBehavior {
    Fix(LocationFix),
    Fail,
    Hang,
}

pub struct FakeLocation {
    behavior: LocationBehavior,
    requests: Mutex<Vec<LocationRequest>>,
}

impl FakeLocation {
    pub fn requests(&self) -> Vec<LocationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationProvider for FakeLocation {
    async fn current_position(&self, request: LocationRequest) -> Result<LocationFix, CollaboratorError> {
        self.requests.lock().unwrap().push(request);
        match self.behavior {
            LocationBehavior::Fix(fix) => Ok(fix),
            LocationBehavior::Fail => Err(CollaboratorError::LocationUnavailable("gps off".into())),
            LocationBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Err(CollaboratorError::LocationUnavailable("never".into()))
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    failing: Vec<String>,
    sent: Mutex<Vec<LocationPayload>>,
}

impl RecordingTransport {
    pub fn failing_for(emails: &[&str]) -> Self {
        Self {
            failing: emails.iter().map(|e| e.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<LocationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn post(&self, payload: &LocationPayload) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push(payload.clone());
        if self.failing.contains(&payload.email) {
            return Err(CollaboratorError::Delivery {
                email: payload.email.clone(),
                reason: "503".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTelephony {
    calls: Mutex<Vec<String>>,
}

impl RecordingTelephony {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Telephony for RecordingTelephony {
    async fn call(&self, number: &str) -> Result<(), CollaboratorError> {
        self.calls.lock().unwrap().push(number.to_string());
        Ok(())
    }
}

pub struct FixedGate(pub PermissionGrant);

#[async_trait]
impl PermissionGate for FixedGate {
    async fn request(&self, permissions: &[Permission]) -> PermissionGrant {
        PermissionGrant {
            call: permissions.contains(&Permission::Call) && self.0.call,
            location: permissions.contains(&Permission::Location) && self.0.location,
        }
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
    }
}

pub struct Fakes {
    pub location: Arc<FakeLocation>,
    pub transport: Arc<RecordingTransport>,
    pub telephony: Arc<RecordingTelephony>,
    pub alerts: Arc<RecordingAlerts>,
    pub collaborators: Collaborators,
}

pub fn fakes(location: LocationBehavior, transport: RecordingTransport, grant: PermissionGrant) -> Fakes {
    let location = Arc::new(FakeLocation {
        behavior: location,
        requests: Mutex::new(Vec::new()),
    });
    let transport = Arc::new(transport);
    let telephony = Arc::new(RecordingTelephony::default());
    let alerts = Arc::new(RecordingAlerts::default());
    let collaborators = Collaborators {
        location: location.clone(),
        transport: transport.clone(),
        telephony: telephony.clone(),
        permissions: Arc::new(FixedGate(grant)),
        alerts: alerts.clone(),
    };
    Fakes {
        location,
        transport,
        telephony,
        alerts,
        collaborators,
    }
}

pub fn sequencer(fakes: &Fakes) -> ActionSequencer {
    ActionSequencer::new(
        fakes.collaborators.clone(),
        TriggerTuning::default().location_timeout(),
    )
}

pub struct Harness {
    pub handle: DispatcherHandle,
    pub reports: broadcast::Receiver<SequenceReport>,
    pub fakes: Fakes,
}

/// Dispatcher wired to fakes. Must be called inside a tokio runtime.
pub fn harness(config: Option<EmergencyConfig>, location: LocationBehavior) -> Harness {
    let fakes = fakes(location, RecordingTransport::default(), PermissionGrant::all());
    let engine = TriggerEngine::new(&TriggerTuning::default());
    let handle = Dispatcher::spawn(
        engine,
        config,
        Arc::new(sequencer(&fakes)),
        fakes.alerts.clone(),
        64,
    );
    let reports = handle.subscribe_reports();
    Harness {
        handle,
        reports,
        fakes,
    }
}
