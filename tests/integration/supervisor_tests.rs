//! Full start → command → shutdown cycle through the supervisor.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use earm::app::events::{AppEvent, ReleaseReason};
use earm::app::state::{JointId, MotionMode};
use earm::app::supervisor::Supervisor;
use earm::config::{ArmConfig, Polarity};
use earm::drivers::sim_pwm::SimPwm;
use earm::error::{ConfigError, Error};

use crate::mock_hw::{RecordingSink, RefusingSpawner, tapped_outputs, wait_for};

fn test_config() -> ArmConfig {
    let mut config = ArmConfig::default();
    config.server.io_timeout_ms = 20;
    config.motion.cadence_ms = 2;
    config.motion.hold_interval_ms = 1;
    config.motion.released_poll_ms = 1;
    config.motion.idle_threshold = 20;
    config.motion.shutdown_grace_ms = 10;
    config
}

fn start(config: &ArmConfig) -> (Supervisor<SimPwm, RecordingSink>, [SimPwm; 4], SimPwm, RecordingSink) {
    let (outputs, taps, buzzer) = tapped_outputs();
    let sink = RecordingSink::new();
    let sup = Supervisor::start_on("127.0.0.1:0".parse().unwrap(), config, outputs, sink.clone()).unwrap();
    (sup, taps, buzzer, sink)
}

fn get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    let request = format!("GET {target} HTTP/1.1\r\n\r\n");
    stream.write_all(request.as_bytes()).unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).unwrap();
    reply
}

#[test]
fn startup_homes_every_joint() {
    let config = test_config();
    let (sup, _taps, _, sink) = start(&config);

    let homed: Vec<(JointId, f32)> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::JointHomed { joint, angle } => Some((*joint, *angle)),
            _ => None,
        })
        .collect();
    assert_eq!(
        homed,
        [
            (JointId::A, 90.0),
            (JointId::B, 120.0),
            (JointId::C, 60.0),
            (JointId::D, 90.0)
        ]
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Started { .. })), 1);
    sup.shutdown();
}

#[test]
fn minus_on_inverted_joint_moves_up() {
    let config = test_config();
    let (sup, taps, _, _) = start(&config);
    let homed_duty = taps[0].duty();

    get(sup.local_addr(), "/?a_minus=1");
    assert_eq!(sup.state().mode(JointId::A), MotionMode::Increasing);
    assert!(wait_for(Duration::from_secs(2), || taps[0].duty() > homed_duty));

    get(sup.local_addr(), "/?a_minus=0");
    assert_eq!(sup.state().mode(JointId::A), MotionMode::Idle);
    sup.shutdown();
}

#[test]
fn minus_on_normal_joint_moves_down() {
    let mut config = test_config();
    config.joints[0].polarity = Polarity::Normal;
    let (sup, taps, _, _) = start(&config);
    let homed_duty = taps[0].duty();

    get(sup.local_addr(), "/?a_minus=1");
    assert_eq!(sup.state().mode(JointId::A), MotionMode::Decreasing);
    assert!(wait_for(Duration::from_secs(2), || taps[0].duty() < homed_duty));
    sup.shutdown();
}

#[test]
fn gripper_power_save_then_reattach() {
    let config = test_config();
    let (sup, taps, _, sink) = start(&config);

    assert!(wait_for(Duration::from_secs(2), || {
        sink.count(|e| {
            matches!(
                e,
                AppEvent::JointReleased {
                    joint: JointId::D,
                    reason: ReleaseReason::PowerSave,
                    ..
                }
            )
        }) == 1
    }));
    assert_eq!(taps[3].duty(), 0);
    // Joints without power-save keep holding.
    assert_ne!(taps[0].duty(), 0);

    get(sup.local_addr(), "/?d_plus=1");
    assert!(wait_for(Duration::from_secs(2), || taps[3].duty() != 0));
    sup.shutdown();
}

#[test]
fn shutdown_releases_everything() {
    let config = test_config();
    let (sup, taps, buzzer, sink) = start(&config);

    get(sup.local_addr(), "/?buzzer=on");
    get(sup.local_addr(), "/?b_plus=1");
    assert!(buzzer.duty() > 0);

    sup.shutdown();

    for tap in &taps {
        assert_eq!(tap.duty(), 0);
    }
    assert_eq!(buzzer.duty(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::JointReleased { reason: ReleaseReason::Shutdown, .. })),
        4
    );
    assert!(matches!(sink.events().last(), Some(AppEvent::Stopped)));
}

#[test]
fn stop_signal_ends_run_until_stopped() {
    let config = test_config();
    let (sup, taps, _, sink) = start(&config);
    let stop = sup.stop_signal();

    let handle = std::thread::spawn(move || sup.run_until_stopped());
    stop.raise();
    handle.join().unwrap();

    assert!(taps.iter().all(|p| p.duty() == 0));
    assert!(matches!(sink.events().last(), Some(AppEvent::Stopped)));
}

#[test]
fn invalid_config_starts_nothing() {
    let mut config = test_config();
    config.joints[1].min_angle = 170;
    config.joints[1].max_angle = 10;

    let (outputs, taps, _) = tapped_outputs();
    let sink = RecordingSink::new();
    let result = Supervisor::start_on("127.0.0.1:0".parse().unwrap(), &config, outputs, sink.clone());

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::AngleBounds { joint: JointId::B, .. }))
    ));
    assert!(taps.iter().all(|p| p.writes() == 0));
    assert!(sink.events().is_empty());
}

/// Start with one task refused and check nothing is left driving.
fn refused_start_leaves_outputs_released(refuse: &'static str) {
    let config = test_config();
    let (outputs, taps, buzzer) = tapped_outputs();
    let sink = RecordingSink::new();
    let result = Supervisor::start_with(
        "127.0.0.1:0".parse().unwrap(),
        &config,
        outputs,
        sink.clone(),
        &RefusingSpawner { refuse },
    );

    assert!(matches!(result, Err(Error::Init(_))));
    // Homing happened, so every joint was driven at some point.
    assert!(taps.iter().all(|p| p.writes() > 0));
    assert!(taps.iter().all(|p| p.duty() == 0), "a joint is still driven");
    assert_eq!(buzzer.duty(), 0);

    // Runners that did start were joined: D's power-save loop would
    // otherwise keep writing.
    let before: Vec<u32> = taps.iter().map(|p| p.writes()).collect();
    std::thread::sleep(Duration::from_millis(50));
    let after: Vec<u32> = taps.iter().map(|p| p.writes()).collect();
    assert_eq!(before, after);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Started { .. })), 0);
}

#[test]
fn refused_runner_releases_every_joint() {
    refused_start_leaves_outputs_released("joint-c\0");
}

#[test]
fn refused_server_joins_runners_and_releases() {
    refused_start_leaves_outputs_released("web\0");
}
