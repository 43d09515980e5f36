//! Single dispatch queue in front of the trigger engine.
//!
//! Sample arrivals, volume changes, deferred resets, configuration updates and
//! status queries are all events on one mpsc queue, consumed by one task that
//! owns the [`TriggerEngine`]. That task is the only writer of detector and
//! cooldown state, so two near-simultaneous qualifying events are decided one
//! after the other. Action sequences run in their own tasks and never hold up
//! the queue.

use std::sync::Arc;
use std::time::Duration;

use lifeline_core::api::{EngineStatus, MotionReading, TriggerOutcome};
use lifeline_core::validation::check_complete;
use lifeline_core::{
    EmergencyConfig, MonoMs, MotionSample, TriggerDecision, TriggerEngine, TriggerRecord,
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::collaborators::{Alert, AlertSink};
use crate::sequencer::{ActionSequencer, SequenceReport};

const REPORT_BUFFER: usize = 16;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is not running")]
    Closed,
}

enum EngineEvent {
    Motion {
        readings: Vec<MotionReading>,
        reply: oneshot::Sender<Vec<TriggerOutcome>>,
    },
    Volume {
        level: i32,
        reply: oneshot::Sender<Vec<TriggerOutcome>>,
    },
    SetConfig(Option<EmergencyConfig>),
    ResetChord {
        trigger_id: String,
    },
    Status(oneshot::Sender<EngineStatus>),
}

/// Cheap, cloneable sender side of the dispatcher.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<EngineEvent>,
    reports: broadcast::Sender<SequenceReport>,
}

impl DispatcherHandle {
    /// Queue motion readings. Resolves with any trigger decisions they caused.
    pub async fn motion(&self, readings: Vec<MotionReading>) -> Result<Vec<TriggerOutcome>, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineEvent::Motion { readings, reply }).await?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Queue a volume level change.
    pub async fn volume(&self, level: i32) -> Result<Vec<TriggerOutcome>, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineEvent::Volume { level, reply }).await?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Replace the configuration snapshot used for future triggers.
    pub async fn set_config(&self, config: Option<EmergencyConfig>) -> Result<(), DispatchError> {
        self.send(EngineEvent::SetConfig(config)).await
    }

    pub async fn status(&self) -> Result<EngineStatus, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineEvent::Status(reply)).await?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Receive a report for every finished action sequence.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<SequenceReport> {
        self.reports.subscribe()
    }

    async fn send(&self, event: EngineEvent) -> Result<(), DispatchError> {
        self.tx.send(event).await.map_err(|_| DispatchError::Closed)
    }
}

/// Owner of the engine state. Lives inside the dispatch task.
pub struct Dispatcher {
    engine: TriggerEngine,
    config: Option<EmergencyConfig>,
    sequencer: Arc<ActionSequencer>,
    alerts: Arc<dyn AlertSink>,
    origin: Instant,
    tx: mpsc::WeakSender<EngineEvent>,
    reports: broadcast::Sender<SequenceReport>,
    triggered: bool,
    triggers_accepted: u64,
    last_trigger: Option<TriggerRecord>,
}

impl Dispatcher {
    /// Start the dispatch task and return its handle.
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(
        engine: TriggerEngine,
        config: Option<EmergencyConfig>,
        sequencer: Arc<ActionSequencer>,
        alerts: Arc<dyn AlertSink>,
        capacity: usize,
    ) -> DispatcherHandle {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (reports, _) = broadcast::channel(REPORT_BUFFER);

        let dispatcher = Dispatcher {
            engine,
            config,
            sequencer,
            alerts,
            origin: Instant::now(),
            tx: tx.downgrade(),
            reports: reports.clone(),
            triggered: false,
            triggers_accepted: 0,
            last_trigger: None,
        };
        tokio::spawn(dispatcher.run(rx));

        DispatcherHandle { tx, reports }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<EngineEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle(event);
        }
        debug!("dispatcher stopped");
    }

    fn now(&self) -> MonoMs {
        self.origin.elapsed().as_millis() as MonoMs
    }

    fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Motion { readings, reply } => {
                // Readings delivered together share one arrival time.
                let at = self.now();
                let mut outcomes = Vec::new();
                for r in readings {
                    let sample = MotionSample::new(r.x, r.y, r.z, at);
                    if let Some(decision) = self.engine.on_motion(&sample, self.config.as_ref()) {
                        outcomes.push(TriggerOutcome::from(&decision));
                        self.apply(decision);
                    }
                }
                let _ = reply.send(outcomes);
            }
            EngineEvent::Volume { level, reply } => {
                let at = self.now();
                let mut outcomes = Vec::new();
                if let Some(decision) = self.engine.on_volume(level, at, self.config.as_ref()) {
                    outcomes.push(TriggerOutcome::from(&decision));
                    self.apply(decision);
                }
                let _ = reply.send(outcomes);
            }
            EngineEvent::SetConfig(config) => {
                info!(armed = check_complete(config.as_ref()).is_ok(), "configuration updated");
                self.config = config;
            }
            EngineEvent::ResetChord { trigger_id } => {
                self.engine.reset_chord();
                let current = self.last_trigger.as_ref().map(|t| t.trigger_id.as_str());
                if current == Some(trigger_id.as_str()) {
                    self.triggered = false;
                }
                debug!(trigger_id = %trigger_id, "chord reset");
            }
            EngineEvent::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn apply(&mut self, decision: TriggerDecision) {
        match decision {
            TriggerDecision::Accepted(record) => {
                info!(
                    trigger_id = %record.trigger_id,
                    source = record.source.as_str(),
                    "emergency triggered"
                );
                self.triggered = true;
                self.triggers_accepted += 1;
                self.last_trigger = Some(record.clone());
                self.alerts.alert(Alert::EmergencySent {
                    trigger_id: record.trigger_id.clone(),
                });

                if let Some(config) = self.config.clone() {
                    self.spawn_sequence(record.clone(), config);
                }
                self.schedule_reset(record);
            }
            TriggerDecision::Suppressed { .. } => {}
            TriggerDecision::MissingConfig { source, error } => {
                warn!(source = source.as_str(), error = %error, "trigger without usable configuration");
                self.alerts.alert(Alert::MissingConfiguration(error.to_string()));
            }
        }
    }

    fn spawn_sequence(&self, record: TriggerRecord, config: EmergencyConfig) {
        let sequencer = Arc::clone(&self.sequencer);
        let reports = self.reports.clone();
        tokio::spawn(async move {
            let report = sequencer.run(&record, &config).await;
            info!(
                trigger_id = %report.trigger_id,
                delivered = report.delivered(),
                recipients = config.recipient_emails.len(),
                call = ?report.call,
                "action sequence finished"
            );
            // No subscribers is the normal case outside tests.
            let _ = reports.send(report);
        });
    }

    fn schedule_reset(&self, record: TriggerRecord) {
        let tx = self.tx.clone();
        let delay = Duration::from_millis(record.reset_after_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx
                    .send(EngineEvent::ResetChord {
                        trigger_id: record.trigger_id,
                    })
                    .await;
            }
        });
    }

    fn status(&self) -> EngineStatus {
        let snapshot = self.engine.snapshot();
        EngineStatus {
            armed: check_complete(self.config.as_ref()).is_ok(),
            triggered: self.triggered,
            triggers_accepted: self.triggers_accepted,
            last_trigger: self.last_trigger.clone(),
            shake_count: snapshot.shake.shake_count,
            chord_up: snapshot.volume.up_seen,
            chord_down: snapshot.volume.down_seen,
            volume_level: snapshot.volume.last_level,
        }
    }
}
