//! Integration tests for the core crate.

use lifeline_core::api::{MotionIngestRequest, MotionReading, TriggerOutcome};
use lifeline_core::{
    EmergencyConfig, MotionSample, TriggerDecision, TriggerEngine, TriggerSource, TriggerTuning,
};

fn config() -> EmergencyConfig {
    EmergencyConfig::new("5551234", vec!["a@example.com".into(), "b@example.com".into()])
}

fn shake_at(engine: &mut TriggerEngine, t: i64, cfg: Option<&EmergencyConfig>) -> Option<TriggerDecision> {
    engine.on_motion(&MotionSample::new(12.0, 12.0, 0.0, t), cfg)
}

#[test]
fn test_trigger_source_serde() {
    let serialized = serde_json::to_string(&TriggerSource::VolumeChord).unwrap();
    assert_eq!(serialized, r#""volume_chord""#);
    let deserialized: TriggerSource = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, TriggerSource::VolumeChord);
}

#[test]
fn test_motion_ingest_accepts_single_and_batch() {
    let single: MotionIngestRequest = serde_json::from_str(r#"{"x":1.0,"y":2.0,"z":3.0}"#).unwrap();
    assert_eq!(
        single.into_readings(),
        vec![MotionReading { x: 1.0, y: 2.0, z: 3.0 }]
    );

    let batch: MotionIngestRequest =
        serde_json::from_str(r#"{"samples":[{"x":1.0,"y":0.0,"z":0.0},{"x":0.0,"y":1.0,"z":0.0}]}"#)
            .unwrap();
    assert_eq!(batch.into_readings().len(), 2);
}

#[test]
fn test_outcome_wire_shape() {
    let decision = TriggerDecision::Suppressed {
        source: TriggerSource::Shake,
        remaining_ms: 250,
    };
    let value = serde_json::to_value(TriggerOutcome::from(&decision)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"outcome": "suppressed", "source": "shake", "remaining_ms": 250})
    );
}

#[test]
fn test_payload_wire_shape() {
    let payload = lifeline_core::LocationPayload::new(
        lifeline_core::LocationFix {
            latitude: 51.5,
            longitude: -0.12,
        },
        "a@example.com",
    );
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"latitude": 51.5, "longitude": -0.12, "email": "a@example.com"})
    );
}

#[test]
fn shake_and_chord_within_cooldown_accept_once() {
    let mut engine = TriggerEngine::new(&TriggerTuning::default()).with_initial_volume(Some(10));
    let cfg = config();

    let mut accepted = 0;
    for t in [0, 350, 700] {
        if let Some(d) = shake_at(&mut engine, t, Some(&cfg)) {
            accepted += d.is_accepted() as u32;
        }
    }
    for (level, t) in [(12, 1_000), (9, 1_200)] {
        if let Some(d) = engine.on_volume(level, t, Some(&cfg)) {
            assert!(matches!(d, TriggerDecision::Suppressed { .. }));
        }
    }
    assert_eq!(accepted, 1);

    // 11 s after the first trigger the latched chord fires again and is accepted.
    let later = engine.on_volume(11, 11_700, Some(&cfg)).unwrap();
    assert!(later.is_accepted());
    assert_eq!(later.source(), TriggerSource::VolumeChord);
}

#[test]
fn chord_reset_requires_a_fresh_chord() {
    let mut engine = TriggerEngine::new(&TriggerTuning::default());
    let cfg = config();
    engine.on_volume(10, 0, Some(&cfg));
    engine.on_volume(12, 10, Some(&cfg));
    assert!(engine.on_volume(9, 20, Some(&cfg)).unwrap().is_accepted());

    engine.reset_chord();
    assert!(engine.on_volume(8, 20_000, Some(&cfg)).is_none());
    assert!(engine.on_volume(9, 20_100, Some(&cfg)).unwrap().is_accepted());
}

#[test]
fn missing_config_keeps_engine_ready() {
    let mut engine = TriggerEngine::new(&TriggerTuning::default());
    for t in [0, 400] {
        assert!(shake_at(&mut engine, t, None).is_none());
    }
    assert!(matches!(
        shake_at(&mut engine, 800, None),
        Some(TriggerDecision::MissingConfig { .. })
    ));
    assert_eq!(engine.snapshot().cooldown.last_trigger_ms, None);

    let cfg = config();
    for t in [1_200, 1_600] {
        assert!(shake_at(&mut engine, t, Some(&cfg)).is_none());
    }
    assert!(shake_at(&mut engine, 2_000, Some(&cfg)).unwrap().is_accepted());
}
