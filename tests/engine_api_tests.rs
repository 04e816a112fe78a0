use std::cell::RefCell;
use std::rc::Rc;

use annot_rs::api::{AnnotationEngine, AnnotationEngineConfig, AnnotationEvent, AnnotationObserver};
use annot_rs::artifacts::{Artifact, ArtifactKind, BarCountArtifact, TextArtifact};
use annot_rs::core::{Color, PriceBar, ScenePoint};
use annot_rs::interaction::ToolMode;

fn engine() -> AnnotationEngine {
    AnnotationEngine::new(AnnotationEngineConfig::default()).expect("engine init")
}

fn counter(start_x: f64, end_x: f64) -> Artifact {
    let mut artifact = BarCountArtifact::new("", ScenePoint::new(start_x, -100.0));
    artifact.set_end_point(ScenePoint::new(end_x, -100.0));
    Artifact::BarCount(artifact)
}

fn sample_bars() -> Vec<PriceBar> {
    (1..=5)
        .map(|i| {
            let x = f64::from(i);
            PriceBar::new(x, 100.0, 105.0, 95.0, 102.0).expect("valid bar")
        })
        .collect()
}

#[test]
fn add_get_remove_round_trip() {
    let mut engine = engine();
    let name = engine.add_artifact(counter(1.0, 4.0)).expect("added");

    assert!(engine.artifact(&name).is_ok());
    assert_eq!(engine.artifact_count(), 1);

    let removed = engine.remove_artifact(&name).expect("removed");
    assert_eq!(removed.kind(), ArtifactKind::BarCount);
    assert!(engine.artifact(&name).is_err());
}

#[test]
fn empty_names_are_auto_generated() {
    let mut engine = engine();
    let first = engine.add_artifact(counter(1.0, 4.0)).expect("added");
    let second = engine.add_artifact(counter(2.0, 6.0)).expect("added");

    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut engine = engine();
    let mut artifact = BarCountArtifact::new("dup", ScenePoint::new(1.0, -100.0));
    artifact.set_end_point(ScenePoint::new(4.0, -100.0));
    engine
        .add_artifact(Artifact::BarCount(artifact.clone()))
        .expect("added");

    assert!(engine.add_artifact(Artifact::BarCount(artifact)).is_err());
}

#[test]
fn unknown_artifact_lookups_error() {
    let engine = engine();
    assert!(engine.artifact("missing").is_err());
}

#[test]
fn kind_mismatch_is_a_contract_error() {
    let mut engine = engine();
    let name = engine
        .add_artifact(Artifact::Text(TextArtifact::new(
            "note",
            ScenePoint::new(1.0, -100.0),
            "hello",
        )))
        .expect("added");

    let artifact = engine.artifact(&name).expect("artifact");
    let error = artifact.as_bar_count().expect_err("kind mismatch");
    let message = error.to_string();
    assert!(message.contains("bar_count"));
    assert!(message.contains("text"));
}

#[test]
fn artifacts_filter_by_kind() {
    let mut engine = engine();
    engine.add_artifact(counter(1.0, 4.0)).expect("added");
    engine.add_artifact(counter(2.0, 6.0)).expect("added");
    engine
        .add_artifact(Artifact::Text(TextArtifact::new(
            "note",
            ScenePoint::new(1.0, -100.0),
            "hello",
        )))
        .expect("added");

    assert_eq!(engine.artifacts_of_kind(ArtifactKind::BarCount).len(), 2);
    assert_eq!(engine.artifacts_of_kind(ArtifactKind::Text).len(), 1);
    assert_eq!(engine.artifacts_of_kind(ArtifactKind::ModalScale).len(), 0);
}

#[test]
fn set_artifact_replaces_state_and_recomputes() {
    let mut engine = engine();
    engine.set_bars(sample_bars());
    let name = engine.add_artifact(counter(1.0, 3.0)).expect("added");

    let mut replacement = BarCountArtifact::new("ignored", ScenePoint::new(1.0, -100.0));
    replacement.set_end_point(ScenePoint::new(5.0, -100.0));
    engine
        .set_artifact(&name, Artifact::BarCount(replacement))
        .expect("replaced");

    let artifact = engine.artifact(&name).expect("artifact");
    assert_eq!(artifact.name(), name);
    assert_eq!(artifact.as_bar_count().expect("counter").bar_count(), 4);
}

#[test]
fn setting_bars_recomputes_existing_artifacts() {
    let mut engine = engine();
    let name = engine.add_artifact(counter(1.0, 4.0)).expect("added");
    assert_eq!(
        engine
            .artifact(&name)
            .expect("artifact")
            .as_bar_count()
            .expect("counter")
            .bar_count(),
        0
    );

    engine.set_bars(sample_bars());
    assert_eq!(
        engine
            .artifact(&name)
            .expect("artifact")
            .as_bar_count()
            .expect("counter")
            .bar_count(),
        3
    );
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut engine = engine();
    engine.set_bars(sample_bars());
    engine.add_artifact(counter(1.0, 4.0)).expect("added");
    engine.set_tool(ToolMode::ModalScale);
    engine.pointer_down(ScenePoint::new(1.0, -95.0));
    engine.pointer_down(ScenePoint::new(5.0, -105.0));

    let json = engine.artifacts_json().expect("snapshot");

    let mut restored = AnnotationEngine::new(AnnotationEngineConfig::default()).expect("engine");
    restored.set_bars(sample_bars());
    let count = restored.load_artifacts_json(&json).expect("load");
    assert_eq!(count, 2);

    for (name, artifact) in engine.artifacts() {
        let restored_artifact = restored.artifact(name).expect("restored artifact");
        assert_eq!(restored_artifact, artifact);
    }
}

#[test]
fn observers_receive_lifecycle_events() {
    struct Recorder {
        events: Rc<RefCell<Vec<AnnotationEvent>>>,
    }

    impl AnnotationObserver for Recorder {
        fn id(&self) -> &str {
            "recorder"
        }

        fn on_event(&mut self, event: &AnnotationEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    let events = Rc::new(RefCell::new(Vec::new()));
    let mut engine = engine();
    engine.add_observer(Box::new(Recorder {
        events: Rc::clone(&events),
    }));

    engine.set_bars(sample_bars());
    let name = engine.add_artifact(counter(1.0, 4.0)).expect("added");
    engine.remove_artifact(&name).expect("removed");

    let seen = events.borrow();
    assert_eq!(
        seen.as_slice(),
        &[
            AnnotationEvent::BarsUpdated { bars_len: 5 },
            AnnotationEvent::ArtifactCreated { name: name.clone() },
            AnnotationEvent::ArtifactRemoved { name: name.clone() },
        ]
    );
}

#[test]
fn removed_observers_stop_receiving_events() {
    struct Counter {
        count: Rc<RefCell<usize>>,
    }

    impl AnnotationObserver for Counter {
        fn id(&self) -> &str {
            "counter"
        }

        fn on_event(&mut self, _event: &AnnotationEvent) {
            *self.count.borrow_mut() += 1;
        }
    }

    let count = Rc::new(RefCell::new(0));
    let mut engine = engine();
    engine.add_observer(Box::new(Counter {
        count: Rc::clone(&count),
    }));

    engine.set_bars(sample_bars());
    assert_eq!(*count.borrow(), 1);

    assert!(engine.remove_observer("counter"));
    engine.set_bars(sample_bars());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn config_validation_rejects_bad_values() {
    let mut config = AnnotationEngineConfig::default();
    config.pen_width = 0.0;
    assert!(AnnotationEngine::new(config).is_err());

    let mut config = AnnotationEngineConfig::default();
    config.edge_band_ratio = 0.7;
    assert!(AnnotationEngine::new(config).is_err());

    let mut config = AnnotationEngineConfig::default();
    config.default_color = Color::rgba(1.5, 0.0, 0.0, 1.0);
    assert!(AnnotationEngine::new(config).is_err());

    let mut config = AnnotationEngineConfig::default();
    config.timezone_offset_seconds = 999_999;
    assert!(AnnotationEngine::new(config).is_err());
}

#[test]
fn snap_default_comes_from_config() {
    let mut config = AnnotationEngineConfig::default();
    config.snap_enabled_default = false;
    let engine = AnnotationEngine::new(config).expect("engine init");
    assert!(!engine.snap_enabled());
}
