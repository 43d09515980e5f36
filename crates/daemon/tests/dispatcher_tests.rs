mod common;

use std::time::Duration;

use common::{config, harness, hard_shake, LocationBehavior, FIX};
use lifeline_core::api::TriggerOutcome;
use lifeline_core::{EmergencyConfig, TriggerSource};
use lifeline_daemon::collaborators::Alert;
use lifeline_daemon::dispatcher::DispatcherHandle;
use tokio::time::sleep;

/// Three hard shakes 400 ms apart. Returns the outcomes of the last one.
async fn shake_pattern(handle: &DispatcherHandle) -> Vec<TriggerOutcome> {
    handle.motion(vec![hard_shake()]).await.unwrap();
    sleep(Duration::from_millis(400)).await;
    handle.motion(vec![hard_shake()]).await.unwrap();
    sleep(Duration::from_millis(400)).await;
    handle.motion(vec![hard_shake()]).await.unwrap()
}

fn accepted(outcomes: &[TriggerOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| matches!(o, TriggerOutcome::Accepted { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn shake_then_chord_runs_once_per_cooldown() {
    let mut h = harness(Some(config()), LocationBehavior::Fix(FIX));

    h.handle.volume(10).await.unwrap();
    let outcomes = shake_pattern(&h.handle).await;
    assert_eq!(accepted(&outcomes), 1);
    let first = h.reports.recv().await.unwrap();
    assert_eq!(first.delivered(), 3);

    h.handle.volume(12).await.unwrap();
    let chord = h.handle.volume(9).await.unwrap();
    assert!(matches!(
        chord.as_slice(),
        [TriggerOutcome::Suppressed {
            source: TriggerSource::VolumeChord,
            ..
        }]
    ));

    // 11 s after the first trigger. The deferred reset cleared the latches,
    // so a fresh chord is needed.
    sleep(Duration::from_millis(11_000)).await;
    h.handle.volume(11).await.unwrap();
    let later = h.handle.volume(8).await.unwrap();
    assert_eq!(accepted(&later), 1);
    h.reports.recv().await.unwrap();

    assert_eq!(h.fakes.telephony.calls().len(), 2);
    assert_eq!(h.handle.status().await.unwrap().triggers_accepted, 2);
}

#[tokio::test(start_paused = true)]
async fn simultaneous_sources_accept_exactly_one() {
    let h = harness(Some(config()), LocationBehavior::Fix(FIX));

    h.handle.volume(10).await.unwrap();
    h.handle.volume(12).await.unwrap();
    h.handle.motion(vec![hard_shake()]).await.unwrap();
    sleep(Duration::from_millis(400)).await;
    h.handle.motion(vec![hard_shake()]).await.unwrap();
    sleep(Duration::from_millis(400)).await;

    let (shake, chord) = tokio::join!(h.handle.motion(vec![hard_shake()]), h.handle.volume(7));
    let (shake, chord) = (shake.unwrap(), chord.unwrap());
    assert_eq!(shake.len(), 1);
    assert_eq!(chord.len(), 1);
    assert_eq!(accepted(&shake) + accepted(&chord), 1);
}

#[tokio::test(start_paused = true)]
async fn deferred_reset_clears_chord_and_flag() {
    let h = harness(Some(config()), LocationBehavior::Fix(FIX));

    h.handle.volume(10).await.unwrap();
    h.handle.volume(12).await.unwrap();
    assert_eq!(accepted(&h.handle.volume(9).await.unwrap()), 1);

    let status = h.handle.status().await.unwrap();
    assert!(status.triggered);
    assert!(status.chord_up && status.chord_down);
    let record = status.last_trigger.clone().unwrap();
    assert_eq!(record.source, TriggerSource::VolumeChord);
    assert_eq!(
        h.fakes.alerts.alerts(),
        vec![Alert::EmergencySent {
            trigger_id: record.trigger_id
        }]
    );

    sleep(Duration::from_millis(5_100)).await;
    let status = h.handle.status().await.unwrap();
    assert!(!status.triggered);
    assert!(!status.chord_up && !status.chord_down);
    assert_eq!(status.volume_level, Some(9));
    assert_eq!(status.triggers_accepted, 1);
}

#[tokio::test(start_paused = true)]
async fn empty_recipients_alert_without_side_effects() {
    let h = harness(
        Some(EmergencyConfig::new("5551234", vec![])),
        LocationBehavior::Fix(FIX),
    );

    let outcomes = shake_pattern(&h.handle).await;
    assert!(matches!(
        outcomes.as_slice(),
        [TriggerOutcome::MissingConfig {
            source: TriggerSource::Shake,
            ..
        }]
    ));

    assert!(h.fakes.transport.sent().is_empty());
    assert!(h.fakes.telephony.calls().is_empty());
    assert!(matches!(
        h.fakes.alerts.alerts().as_slice(),
        [Alert::MissingConfiguration(_)]
    ));
    let status = h.handle.status().await.unwrap();
    assert!(!status.armed);
    assert_eq!(status.triggers_accepted, 0);
}

#[tokio::test(start_paused = true)]
async fn configuring_later_arms_the_engine() {
    let mut h = harness(None, LocationBehavior::Fix(FIX));

    let outcomes = shake_pattern(&h.handle).await;
    assert!(matches!(outcomes.as_slice(), [TriggerOutcome::MissingConfig { .. }]));

    h.handle.set_config(Some(config())).await.unwrap();
    assert!(h.handle.status().await.unwrap().armed);

    sleep(Duration::from_millis(400)).await;
    let outcomes = shake_pattern(&h.handle).await;
    assert_eq!(accepted(&outcomes), 1);
    let report = h.reports.recv().await.unwrap();
    assert_eq!(report.delivered(), 3);
}

#[tokio::test(start_paused = true)]
async fn suppressed_replay_is_a_noop() {
    let h = harness(Some(config()), LocationBehavior::Fix(FIX));

    h.handle.volume(10).await.unwrap();
    h.handle.volume(12).await.unwrap();
    h.handle.volume(9).await.unwrap();

    assert!(matches!(
        h.handle.volume(10).await.unwrap().as_slice(),
        [TriggerOutcome::Suppressed { .. }]
    ));
    let before = h.handle.status().await.unwrap();
    assert!(h.handle.volume(10).await.unwrap().is_empty());
    let after = h.handle.status().await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test(start_paused = true)]
async fn location_failure_still_places_call() {
    let mut h = harness(Some(config()), LocationBehavior::Fail);

    assert_eq!(accepted(&shake_pattern(&h.handle).await), 1);
    let report = h.reports.recv().await.unwrap();

    assert!(report.deliveries.is_empty());
    assert!(h.fakes.transport.sent().is_empty());
    assert_eq!(h.fakes.telephony.calls(), vec!["5551234".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn batched_readings_share_one_arrival_time() {
    let h = harness(Some(config()), LocationBehavior::Fix(FIX));

    let outcomes = h
        .handle
        .motion(vec![hard_shake(), hard_shake(), hard_shake()])
        .await
        .unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(h.handle.status().await.unwrap().shake_count, 1);
}
