//! Activity smoothing as seen through the engine.

mod common;

use std::time::Instant;

use common::{frames_after, test_config, HeadlessContainer, FRAME};
use vexfield::Engine;

fn running_engine() -> (HeadlessContainer, Engine<HeadlessContainer>) {
    let container = HeadlessContainer::new(800, 600, 1.0);
    let engine = Engine::construct(&container, test_config()).unwrap();
    (container, engine)
}

#[test]
fn test_starts_at_rest() {
    let (_container, engine) = running_engine();
    assert_eq!(engine.activity().current, 0.0);
    assert_eq!(engine.activity().target, 0.0);
}

#[test]
fn test_target_is_clamped() {
    let (_container, mut engine) = running_engine();

    engine.set_activity(1.7);
    assert_eq!(engine.activity().target, 1.0);

    engine.set_activity(-0.3);
    assert_eq!(engine.activity().target, 0.0);

    engine.set_activity(f32::NAN);
    assert_eq!(engine.activity().target, 0.0);

    engine.set_activity(0.45);
    assert_eq!(engine.activity().target, 0.45);
}

#[test]
fn test_set_activity_does_not_move_current() {
    let (_container, mut engine) = running_engine();
    engine.set_activity(1.0);
    assert_eq!(engine.activity().current, 0.0);
}

#[test]
fn test_two_seconds_up_then_two_seconds_down() {
    let (_container, mut engine) = running_engine();
    let t0 = Instant::now();

    engine.set_activity(0.8);
    for now in frames_after(t0, 120) {
        engine.frame(now);
    }
    assert!(engine.activity().current >= 0.75, "{}", engine.activity().current);

    let t1 = t0 + FRAME * 120;
    engine.set_activity(0.0);
    for now in frames_after(t1, 120) {
        engine.frame(now);
    }
    assert!(engine.activity().current <= 0.05, "{}", engine.activity().current);
}

#[test]
fn test_approach_is_monotonic() {
    let (_container, mut engine) = running_engine();
    let t0 = Instant::now();

    engine.set_activity(0.8);
    let mut previous = engine.activity().current;
    for now in frames_after(t0, 60) {
        engine.frame(now);
        let current = engine.activity().current;
        assert!(current > previous);
        assert!(current <= 0.8);
        previous = current;
    }
}

#[test]
fn test_uniforms_carry_smoothed_level() {
    let (container, mut engine) = running_engine();
    let t0 = Instant::now();

    engine.set_activity(1.0);
    for now in frames_after(t0, 5) {
        engine.frame(now);
    }

    let uniforms = container.probe.last_uniforms.get().unwrap();
    assert_eq!(uniforms.activity, engine.activity().current);
    assert!(uniforms.activity > 0.0 && uniforms.activity < 1.0);
    assert!(uniforms.time > 0.0);
}

#[test]
fn test_time_advances_with_frames() {
    let (container, mut engine) = running_engine();
    let t0 = Instant::now();

    engine.frame(t0 + FRAME);
    let early = container.probe.last_uniforms.get().unwrap().time;
    engine.frame(t0 + FRAME * 61);
    let late = container.probe.last_uniforms.get().unwrap().time;

    assert!((late - early - 1.0).abs() < 0.01, "{} -> {}", early, late);
}

#[test]
fn test_custom_smoothing() {
    let container = HeadlessContainer::new(800, 600, 1.0);
    let mut engine = Engine::construct(&container, test_config().with_smoothing(1.0)).unwrap();

    engine.set_activity(0.6);
    engine.frame(Instant::now());
    assert_eq!(engine.activity().current, 0.6);
}
