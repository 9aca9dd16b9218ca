//! Mock adapters for integration tests.
//!
//! Records every emitted event so tests can assert on the full history
//! across runner threads without touching real LEDC registers.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use earm::app::events::AppEvent;
use earm::app::ports::EventSink;
use earm::drivers::hw_init::{ArmOutputs, sim_outputs};
use earm::drivers::sim_pwm::SimPwm;
use earm::drivers::task_pin::{TaskSpawner, spawn_task};
use earm::error::Error;
use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

// ── Recording event sink ──────────────────────────────────────

/// Clones share one event log, so every runner's copy lands in it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Output taps ─────────────────────────────────────────────

/// Simulated outputs plus tap handles onto the same channels.
#[allow(dead_code)]
pub fn tapped_outputs() -> (ArmOutputs<SimPwm>, [SimPwm; 4], SimPwm) {
    let outputs = sim_outputs();
    let taps = outputs.servos.clone();
    let buzzer = outputs.buzzer.clone();
    (outputs, taps, buzzer)
}

// ── Failing PWM ───────────────────────────────────────────────

#[derive(Debug)]
pub struct PwmFault;

impl embedded_hal::pwm::Error for PwmFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A channel whose every write fails.
#[allow(dead_code)]
pub struct FailingPwm;

impl ErrorType for FailingPwm {
    type Error = PwmFault;
}

impl SetDutyCycle for FailingPwm {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Err(PwmFault)
    }
}

// ── Refusing spawner ──────────────────────────────────────────

/// Spawns normally except for the task named `refuse`.
#[allow(dead_code)]
pub struct RefusingSpawner {
    pub refuse: &'static str,
}

impl TaskSpawner for RefusingSpawner {
    fn spawn<T: Send + 'static>(
        &self,
        name: &'static str,
        priority: u8,
        stack_kb: usize,
        f: impl FnOnce() -> T + Send + 'static,
    ) -> Result<std::thread::JoinHandle<T>, Error> {
        if name == self.refuse {
            return Err(Error::Init("thread creation failed"));
        }
        spawn_task(name, priority, stack_kb, f)
    }
}

// ── Polling helper ────────────────────────────────────────────

/// Poll `cond` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
