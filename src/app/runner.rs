//! Per-joint automation loop.
//!
//! One [`JointRunner`] owns one [`Servo`] and polls the shared
//! [`CommandState`] on its own cadence:
//!
//! ```text
//!  mode = Increasing ─▶ adjust(+step) ─┐
//!  mode = Decreasing ─▶ adjust(-step) ─┼─▶ sleep(cadence)
//!  mode = Idle, no power-save ─────────┘
//!
//!  mode = Idle, power-save:
//!    idle_ticks < threshold ─▶ reassert angle, idle_ticks += 1 ─▶ sleep(hold)
//!    idle_ticks == threshold ─▶ release ──────────────────────────▶ sleep(poll)
//! ```
//!
//! The runner never blocks on anything but its own sleep; the stop flag is
//! checked at the top of every pass.

use std::sync::Arc;
use std::time::Duration;

use embedded_hal::pwm::SetDutyCycle;
use log::{debug, info};

use crate::config::MotionTiming;
use crate::drivers::servo::Servo;

use super::events::{AppEvent, ReleaseReason};
use super::ports::EventSink;
use super::state::{CommandState, JointId, MotionMode, StopSignal};

pub struct JointRunner<P, S> {
    servo: Servo<P>,
    state: Arc<CommandState>,
    sink: S,
    timing: MotionTiming,
    power_save: bool,
    idle_ticks: u32,
    at_limit: bool,
}

impl<P: SetDutyCycle, S: EventSink> JointRunner<P, S> {
    pub fn new(
        servo: Servo<P>,
        state: Arc<CommandState>,
        sink: S,
        timing: MotionTiming,
        power_save: bool,
    ) -> Self {
        Self {
            servo,
            state,
            sink,
            timing,
            power_save,
            idle_ticks: 0,
            at_limit: false,
        }
    }

    /// One automation pass.  Returns how long to sleep before the next.
    pub fn tick(&mut self) -> Duration {
        match self.state.mode(self.servo.id()) {
            MotionMode::Increasing => self.step(self.timing.step_degrees),
            MotionMode::Decreasing => self.step(-self.timing.step_degrees),
            MotionMode::Idle => self.idle(),
        }
    }

    fn step(&mut self, delta: f32) -> Duration {
        let joint = self.servo.id();
        let was_attached = self.servo.is_attached();
        let before = self.servo.angle();
        let angle = self.servo.adjust_angle(delta);
        self.idle_ticks = 0;

        if !was_attached {
            self.sink.emit(&AppEvent::JointReattached { joint, angle });
        }

        if angle == before {
            if !self.at_limit {
                self.at_limit = true;
                self.sink.emit(&AppEvent::LimitReached { joint, angle });
            }
        } else {
            self.at_limit = false;
        }

        ms(self.timing.cadence_ms)
    }

    fn idle(&mut self) -> Duration {
        self.at_limit = false;

        if !self.power_save {
            return ms(self.timing.cadence_ms);
        }

        if self.idle_ticks >= self.timing.idle_threshold {
            return ms(self.timing.released_poll_ms);
        }

        // Hold rigid until the threshold is reached.
        self.servo.reattach();
        self.idle_ticks += 1;

        if self.idle_ticks == self.timing.idle_threshold {
            self.servo.release();
            self.sink.emit(&AppEvent::JointReleased {
                joint: self.servo.id(),
                angle: self.servo.angle(),
                reason: ReleaseReason::PowerSave,
            });
        }

        ms(self.timing.hold_interval_ms)
    }

    /// Tick until `stop` is raised, then release the servo and hand it back.
    pub fn run(mut self, stop: &StopSignal) -> Servo<P> {
        let joint = self.servo.id();
        info!(
            "Joint {} ({}): runner started at {:.0}\u{00b0}",
            joint,
            joint.label(),
            self.servo.angle()
        );

        while !stop.is_raised() {
            let pause = self.tick();
            std::thread::sleep(pause);
        }

        debug!("Joint {}: stop observed", joint);
        self.servo.release();
        self.sink.emit(&AppEvent::JointReleased {
            joint,
            angle: self.servo.angle(),
            reason: ReleaseReason::Shutdown,
        });
        self.servo
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn joint(&self) -> JointId {
        self.servo.id()
    }

    pub fn servo(&self) -> &Servo<P> {
        &self.servo
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_servo(self) -> Servo<P> {
        self.servo
    }
}

fn ms(millis: u32) -> Duration {
    Duration::from_millis(u64::from(millis))
}
