//! Command server over a real localhost socket.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use earm::app::service::ArmService;
use earm::app::state::{CommandState, JointId, MotionMode, StopSignal};
use earm::config::{Polarity, ServerConfig};
use earm::drivers::buzzer::Buzzer;
use earm::drivers::sim_pwm::SimPwm;
use earm::web::server::CommandServer;

use crate::mock_hw::RecordingSink;

type Service = ArmService<Buzzer<SimPwm>, RecordingSink>;

struct Harness {
    addr: SocketAddr,
    state: Arc<CommandState>,
    buzzer: SimPwm,
    stop: StopSignal,
    handle: JoinHandle<Service>,
}

impl Harness {
    fn start() -> Self {
        let state = Arc::new(CommandState::new());
        let buzzer = SimPwm::new(10);
        let service = ArmService::new(
            Arc::clone(&state),
            [Polarity::Normal; 4],
            Buzzer::new(buzzer.clone()),
            RecordingSink::new(),
        );
        let config = ServerConfig {
            port: 0,
            io_timeout_ms: 50,
            max_request_bytes: 1024,
        };
        let server =
            CommandServer::bind_addr("127.0.0.1:0".parse().unwrap(), &config, service).unwrap();
        let addr = server.local_addr().unwrap();
        let stop = StopSignal::new();
        let task_stop = stop.clone();
        let handle = std::thread::spawn(move || server.run(&task_stop));
        Self {
            addr,
            state,
            buzzer,
            stop,
            handle,
        }
    }

    fn stop(self) -> Service {
        self.stop.raise();
        self.handle.join().unwrap()
    }
}

fn get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: earm\r\n\r\n");
    stream.write_all(request.as_bytes()).unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).unwrap();
    reply
}

fn body(reply: &str) -> &str {
    reply.split_once("\r\n\r\n").map_or("", |(_, b)| b)
}

#[test]
fn bare_get_serves_status_page() {
    let h = Harness::start();
    let reply = get(h.addr, "/");
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n"));
    assert!(body(&reply).contains("<!DOCTYPE html>"));
    assert!(body(&reply).contains("id=\"joint-a\""));
    h.stop();
}

#[test]
fn command_mutates_state_with_empty_ack() {
    let h = Harness::start();
    let reply = get(h.addr, "/?a_minus=1");
    assert_eq!(
        reply,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n"
    );
    assert_eq!(h.state.mode(JointId::A), MotionMode::Decreasing);

    get(h.addr, "/?a_minus=0");
    assert_eq!(h.state.mode(JointId::A), MotionMode::Idle);
    h.stop();
}

#[test]
fn buzzer_on_then_status_check() {
    let h = Harness::start();
    get(h.addr, "/?buzzer=on");
    let reply = get(h.addr, "/?status_check=1");
    assert!(reply.contains("Content-Type: text/plain"));
    assert_eq!(body(&reply), "OK");
    assert!(h.state.indicator());
    assert_eq!(h.buzzer.duty(), 511);

    let page = get(h.addr, "/");
    assert!(body(&page).contains("Buzzer: on"));
    h.stop();
}

#[test]
fn status_check_does_not_mutate() {
    let h = Harness::start();
    get(h.addr, "/?status_check=1&b_plus=1&buzzer=on");
    assert_eq!(h.state.mode(JointId::B), MotionMode::Idle);
    assert!(!h.state.indicator());
    h.stop();
}

#[test]
fn malformed_requests_do_not_kill_the_listener() {
    let h = Harness::start();

    // Connect and close without sending anything.
    drop(TcpStream::connect(h.addr).unwrap());

    // Garbage bytes.
    {
        let mut s = TcpStream::connect(h.addr).unwrap();
        s.write_all(b"\xff\xfe\xfd\r\n").unwrap();
        let mut sink = Vec::new();
        let _ = s.read_to_end(&mut sink);
        assert!(sink.is_empty());
    }

    // Unknown keys are acknowledged, nothing changes.
    let reply = get(h.addr, "/?foo&bar=baz");
    assert_eq!(body(&reply), "");

    let reply = get(h.addr, "/?c_plus=1");
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(h.state.mode(JointId::C), MotionMode::Increasing);
    h.stop();
}

#[test]
fn stop_returns_the_service() {
    let h = Harness::start();
    get(h.addr, "/?buzzer=on");
    let buzzer = h.buzzer.clone();
    let mut service = h.stop();
    service.halt();
    assert_eq!(buzzer.duty(), 0);
    assert!(!service.snapshot().indicator);
}

#[test]
fn bare_query_mark_still_serves_status_page() {
    let h = Harness::start();
    let reply = get(h.addr, "/?");
    assert!(reply.contains("Content-Type: text/html"));
    assert!(body(&reply).contains("<!DOCTYPE html>"));
    h.stop();
}

/// Writes one byte every 30 ms until the server hangs up or `for_how_long` ends.
fn trickle(addr: SocketAddr, for_how_long: Duration) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut s = TcpStream::connect(addr).unwrap();
        let end = Instant::now() + for_how_long;
        while Instant::now() < end {
            if s.write_all(b"G").is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(30));
        }
    })
}

#[test]
fn trickling_client_does_not_delay_stop() {
    let h = Harness::start();
    let slow = trickle(h.addr, Duration::from_secs(3));
    std::thread::sleep(Duration::from_millis(20));

    let begin = Instant::now();
    h.stop();
    let elapsed = begin.elapsed();
    assert!(elapsed < Duration::from_millis(500), "stop took {elapsed:?}");
    slow.join().unwrap();
}

#[test]
fn trickling_client_does_not_starve_other_clients() {
    let h = Harness::start();
    let slow = trickle(h.addr, Duration::from_secs(3));
    std::thread::sleep(Duration::from_millis(20));

    let begin = Instant::now();
    get(h.addr, "/?b_plus=1");
    assert!(begin.elapsed() < Duration::from_millis(500));
    assert_eq!(h.state.mode(JointId::B), MotionMode::Increasing);
    h.stop();
    slow.join().unwrap();
}
