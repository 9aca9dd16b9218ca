//! Joint runner behaviour on its own thread, against simulated and
//! failing PWM channels.

use std::sync::Arc;
use std::time::Duration;

use earm::app::events::{AppEvent, ReleaseReason};
use earm::app::runner::JointRunner;
use earm::app::state::{CommandState, JointId, MotionMode, StopSignal};
use earm::config::{JointConfig, MotionTiming, Polarity, ServoTiming};
use earm::drivers::servo::Servo;
use earm::drivers::sim_pwm::SimPwm;

use crate::mock_hw::{FailingPwm, RecordingSink, wait_for};

fn fast_timing() -> MotionTiming {
    MotionTiming {
        cadence_ms: 2,
        hold_interval_ms: 1,
        released_poll_ms: 1,
        idle_threshold: 5,
        ..MotionTiming::default()
    }
}

fn gripper(min: u8, max: u8, power_save: bool) -> JointConfig {
    let mut j = JointConfig::new(JointId::D, 7, min, Polarity::Inverted);
    j.min_angle = min;
    j.max_angle = max;
    j.power_save = power_save;
    j
}

#[test]
fn increasing_saturates_at_max_then_is_a_no_op() {
    let joint = gripper(10, 20, false);
    let pwm = SimPwm::new(14);
    let mut servo = Servo::new(&joint, &ServoTiming::default(), pwm.clone()).unwrap();
    servo.set_angle(10.0);

    let state = Arc::new(CommandState::new());
    state.set_mode(JointId::D, MotionMode::Increasing);
    let mut runner = JointRunner::new(servo, Arc::clone(&state), RecordingSink::new(), fast_timing(), false);

    let mut angles = Vec::new();
    for _ in 0..8 {
        runner.tick();
        angles.push(runner.servo().angle());
    }
    assert_eq!(angles, [12.0, 14.0, 16.0, 18.0, 20.0, 20.0, 20.0, 20.0]);
    assert_eq!(
        runner.sink().count(|e| matches!(e, AppEvent::LimitReached { angle, .. } if *angle == 20.0)),
        1
    );
}

#[test]
fn leaving_and_re_entering_limit_reports_again() {
    let joint = gripper(0, 4, false);
    let servo = Servo::new(&joint, &ServoTiming::default(), SimPwm::new(14)).unwrap();
    let state = Arc::new(CommandState::new());
    let mut runner = JointRunner::new(servo, Arc::clone(&state), RecordingSink::new(), fast_timing(), false);

    state.set_mode(JointId::D, MotionMode::Increasing);
    for _ in 0..4 {
        runner.tick();
    }
    state.set_mode(JointId::D, MotionMode::Decreasing);
    for _ in 0..4 {
        runner.tick();
    }
    assert_eq!(runner.servo().angle(), 0.0);
    assert_eq!(
        runner.sink().count(|e| matches!(e, AppEvent::LimitReached { .. })),
        2
    );
}

#[test]
fn threaded_runner_follows_mode_changes_and_stops() {
    let joint = gripper(0, 180, true);
    let pwm = SimPwm::new(14);
    let mut servo = Servo::new(&joint, &ServoTiming::default(), pwm.clone()).unwrap();
    servo.set_angle(90.0);

    let state = Arc::new(CommandState::new());
    let sink = RecordingSink::new();
    let stop = StopSignal::new();
    let runner = JointRunner::new(servo, Arc::clone(&state), sink.clone(), fast_timing(), true);

    let task_stop = stop.clone();
    let handle = std::thread::spawn(move || runner.run(&task_stop));

    // Idle with power-save: released after the threshold.
    assert!(wait_for(Duration::from_secs(2), || {
        sink.count(|e| matches!(e, AppEvent::JointReleased { reason: ReleaseReason::PowerSave, .. })) == 1
    }));
    assert_eq!(pwm.duty(), 0);

    // Motion reattaches.
    state.set_mode(JointId::D, MotionMode::Decreasing);
    assert!(wait_for(Duration::from_secs(2), || pwm.duty() != 0));
    state.set_mode(JointId::D, MotionMode::Idle);

    stop.raise();
    let servo = handle.join().unwrap();
    assert!(!servo.is_attached());
    assert!(servo.angle() < 90.0);
    assert_eq!(pwm.duty(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::JointReleased { reason: ReleaseReason::Shutdown, .. })),
        1
    );
}

#[test]
fn pwm_write_failures_do_not_stop_motion() {
    let joint = gripper(0, 180, false);
    let servo = Servo::new(&joint, &ServoTiming::default(), FailingPwm).unwrap();
    let state = Arc::new(CommandState::new());
    state.set_mode(JointId::D, MotionMode::Increasing);
    let mut runner = JointRunner::new(servo, state, RecordingSink::new(), fast_timing(), false);

    for _ in 0..3 {
        runner.tick();
    }
    // Angle bookkeeping continues even though the channel rejects writes.
    assert_eq!(runner.servo().angle(), 96.0);
}
