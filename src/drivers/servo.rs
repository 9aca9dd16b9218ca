//! Hobby-servo driver for one arm joint.
//!
//! Maps an angle to a pulse width and writes the matching duty value to a
//! PWM channel.  The channel is any [`SetDutyCycle`] implementation: an
//! LEDC driver on the device, [`SimPwm`](super::sim_pwm::SimPwm) on host.
//!
//! ```text
//! angle ──clamp──▶ pulse_us = min_pulse + (angle / 180) * (max_pulse - min_pulse)
//!                   duty    = pulse_us / period_us * max_duty
//! ```
//!
//! Out-of-range angles are clamped silently; there is no error path for
//! motion.  The only failure is construction with invalid bounds.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::state::JointId;
use crate::config::{JointConfig, ServoTiming};
use crate::error::ConfigError;

/// Pose assumed before the first command.
pub const NEUTRAL_ANGLE: f32 = 90.0;

/// Full mechanical travel used by the pulse mapping.
const FULL_TRAVEL_DEG: f32 = 180.0;

pub struct Servo<P> {
    id: JointId,
    pwm: P,
    min_angle: f32,
    max_angle: f32,
    period_us: f32,
    min_pulse_us: f32,
    max_pulse_us: f32,
    current_angle: f32,
    attached: bool,
    duty: u16,
}

impl<P: SetDutyCycle> Servo<P> {
    /// Validate `joint` and `timing` and take ownership of `pwm`.
    ///
    /// Nothing is written to the output until the first
    /// [`set_angle`](Self::set_angle).
    pub fn new(joint: &JointConfig, timing: &ServoTiming, pwm: P) -> Result<Self, ConfigError> {
        joint.validate()?;
        timing.validate()?;

        let min_angle = f32::from(joint.min_angle);
        let max_angle = f32::from(joint.max_angle);

        Ok(Self {
            id: joint.id,
            pwm,
            min_angle,
            max_angle,
            period_us: timing.period_us() as f32,
            min_pulse_us: f32::from(timing.min_pulse_us),
            max_pulse_us: f32::from(timing.max_pulse_us),
            current_angle: NEUTRAL_ANGLE.clamp(min_angle, max_angle),
            attached: false,
            duty: 0,
        })
    }

    // ── Motion ────────────────────────────────────────────────

    /// Drive to `angle`, clamped into the joint's travel.
    /// Returns the angle actually applied.
    pub fn set_angle(&mut self, angle: f32) -> f32 {
        let angle = self.clamp(angle);
        let duty = self.duty_for(angle);
        self.write_duty(duty);
        self.current_angle = angle;
        self.attached = true;
        angle
    }

    /// Move relative to the current angle.
    pub fn adjust_angle(&mut self, delta: f32) -> f32 {
        self.set_angle(self.current_angle + delta)
    }

    /// Stop the pulse train.  The joint goes limp; the angle is kept.
    pub fn release(&mut self) {
        self.write_duty(0);
        self.attached = false;
    }

    /// Resume driving at the last commanded angle.
    pub fn reattach(&mut self) -> f32 {
        self.set_angle(self.current_angle)
    }

    // ── Pulse math ────────────────────────────────────────────

    /// Pulse width (µs) for `angle` after clamping.
    pub fn pulse_width_us(&self, angle: f32) -> f32 {
        let angle = self.clamp(angle);
        self.min_pulse_us + (angle / FULL_TRAVEL_DEG) * (self.max_pulse_us - self.min_pulse_us)
    }

    /// Duty value for `angle`, scaled to the channel's resolution.
    pub fn duty_for(&self, angle: f32) -> u16 {
        let max = self.pwm.max_duty_cycle();
        let duty = (self.pulse_width_us(angle) / self.period_us) * f32::from(max);
        (duty as u16).min(max)
    }

    fn clamp(&self, angle: f32) -> f32 {
        if angle.is_nan() {
            return self.current_angle;
        }
        angle.clamp(self.min_angle, self.max_angle)
    }

    fn write_duty(&mut self, duty: u16) {
        if let Err(e) = self.pwm.set_duty_cycle(duty) {
            warn!("Servo {}: PWM write failed: {:?}", self.id, e);
        }
        self.duty = duty;
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn angle(&self) -> f32 {
        self.current_angle
    }

    pub fn min_angle(&self) -> f32 {
        self.min_angle
    }

    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Duty last written to the channel (0 when released).
    pub fn duty(&self) -> u16 {
        self.duty
    }
}
