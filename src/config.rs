//! System configuration parameters
//!
//! All tunable parameters for the eArm controller.  Defaults reproduce the
//! shipping web-control firmware; a JSON override can be embedded at build
//! time (see `main.rs`).

use serde::{Deserialize, Serialize};

use crate::app::state::{JOINT_COUNT, JointId, MotionMode};
use crate::error::ConfigError;
use crate::pins;

/// How the `minus` / `plus` buttons map onto servo travel for one joint.
///
/// The elbow is mounted mirrored relative to the other joints, so the same
/// button has to drive the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// `minus` decreases the angle, `plus` increases it.
    Normal,
    /// `minus` increases the angle, `plus` decreases it.
    Inverted,
}

impl Polarity {
    /// Mode engaged by the `minus` button.
    pub const fn minus(self) -> MotionMode {
        match self {
            Self::Normal => MotionMode::Decreasing,
            Self::Inverted => MotionMode::Increasing,
        }
    }

    /// Mode engaged by the `plus` button.
    pub const fn plus(self) -> MotionMode {
        match self {
            Self::Normal => MotionMode::Increasing,
            Self::Inverted => MotionMode::Decreasing,
        }
    }
}

/// Per-joint wiring and travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointConfig {
    pub id: JointId,
    /// LEDC output pin.
    pub gpio: i32,
    /// Inclusive lower travel bound (degrees, 0-180).
    pub min_angle: u8,
    /// Inclusive upper travel bound (degrees, 0-180).
    pub max_angle: u8,
    /// Pose driven at startup.
    pub initial_angle: u8,
    /// Release the drive signal after a sustained idle period.
    pub power_save: bool,
    pub polarity: Polarity,
}

impl JointConfig {
    pub const fn new(id: JointId, gpio: i32, initial_angle: u8, polarity: Polarity) -> Self {
        Self {
            id,
            gpio,
            min_angle: 0,
            max_angle: 180,
            initial_angle,
            power_save: false,
            polarity,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_angle >= self.max_angle || self.max_angle > 180 {
            return Err(ConfigError::AngleBounds {
                joint: self.id,
                min: self.min_angle,
                max: self.max_angle,
            });
        }
        if !(self.min_angle..=self.max_angle).contains(&self.initial_angle) {
            return Err(ConfigError::InitialAngle {
                joint: self.id,
                angle: self.initial_angle,
            });
        }
        Ok(())
    }
}

/// Servo signal shape shared by all joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoTiming {
    /// Refresh rate (Hz).  50 Hz ⇒ 20 ms period.
    pub freq_hz: u32,
    /// Pulse width at 0° (µs).
    pub min_pulse_us: u16,
    /// Pulse width at 180° (µs).
    pub max_pulse_us: u16,
}

impl ServoTiming {
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.freq_hz
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.freq_hz == 0 || self.freq_hz > 1_000 {
            return Err(ConfigError::Timing("servo freq_hz must be 1..=1000"));
        }
        let period_us = self.period_us();
        if self.min_pulse_us >= self.max_pulse_us || u32::from(self.max_pulse_us) > period_us {
            return Err(ConfigError::PulseBounds {
                min_us: self.min_pulse_us,
                max_us: self.max_pulse_us,
                period_us,
            });
        }
        Ok(())
    }
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            freq_hz: pins::SERVO_PWM_FREQ_HZ,
            min_pulse_us: 500,
            max_pulse_us: 2400,
        }
    }
}

/// Automation cadence for the joint runners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionTiming {
    /// Degrees moved per tick while a direction is engaged.
    pub step_degrees: f32,
    /// Tick period while moving, and while idle without power-save.
    pub cadence_ms: u32,
    /// Tick period while holding position before release.
    pub hold_interval_ms: u32,
    /// Tick period once the signal has been released.
    pub released_poll_ms: u32,
    /// Idle ticks before a power-save joint releases its signal.
    pub idle_threshold: u32,
    /// Time given to the runners to observe the stop flag.
    pub shutdown_grace_ms: u32,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            step_degrees: 2.0,
            cadence_ms: 20,
            hold_interval_ms: 30,
            released_poll_ms: 10,
            idle_threshold: 1000,
            shutdown_grace_ms: 100,
        }
    }
}

impl MotionTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_degrees > 0.0 && self.step_degrees <= 180.0) {
            return Err(ConfigError::Timing("step_degrees must be in (0, 180]"));
        }
        if !(1..=1_000).contains(&self.cadence_ms) {
            return Err(ConfigError::Timing("cadence_ms must be 1..=1000"));
        }
        if !(1..=1_000).contains(&self.hold_interval_ms) {
            return Err(ConfigError::Timing("hold_interval_ms must be 1..=1000"));
        }
        if !(1..=1_000).contains(&self.released_poll_ms) {
            return Err(ConfigError::Timing("released_poll_ms must be 1..=1000"));
        }
        if self.idle_threshold == 0 {
            return Err(ConfigError::Timing("idle_threshold must be non-zero"));
        }
        Ok(())
    }
}

/// Web command server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Accept poll and per-connection read/write timeout.
    pub io_timeout_ms: u32,
    /// Bytes read from each connection; only the request line matters.
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            io_timeout_ms: 100,
            max_request_bytes: 1024,
        }
    }
}

/// Soft access point raised at boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointConfig {
    pub ssid: heapless::String<32>,
    pub ip: [u8; 4],
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        let mut ssid = heapless::String::new();
        // "eArm" always fits in 32 bytes.
        let _ = ssid.push_str("eArm");
        Self {
            ssid,
            ip: [192, 168, 4, 1],
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    pub joints: [JointConfig; JOINT_COUNT],
    pub servo: ServoTiming,
    pub motion: MotionTiming,
    pub server: ServerConfig,
    pub access_point: AccessPointConfig,
    pub buzzer_gpio: i32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        let mut gripper = JointConfig::new(JointId::D, pins::SERVO_D_GPIO, 90, Polarity::Inverted);
        gripper.power_save = true;

        Self {
            joints: [
                JointConfig::new(JointId::A, pins::SERVO_A_GPIO, 90, Polarity::Inverted),
                JointConfig::new(JointId::B, pins::SERVO_B_GPIO, 120, Polarity::Inverted),
                JointConfig::new(JointId::C, pins::SERVO_C_GPIO, 60, Polarity::Normal),
                gripper,
            ],
            servo: ServoTiming::default(),
            motion: MotionTiming::default(),
            server: ServerConfig::default(),
            access_point: AccessPointConfig::default(),
            buzzer_gpio: pins::BUZZER_GPIO,
        }
    }
}

impl ArmConfig {
    /// Parse a JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn joint(&self, id: JointId) -> &JointConfig {
        &self.joints[id.index()]
    }

    /// Check every invariant.  Nothing is started on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (slot, joint) in JointId::ALL.iter().zip(self.joints.iter()) {
            if joint.id != *slot {
                return Err(ConfigError::JointOrder {
                    slot: *slot,
                    found: joint.id,
                });
            }
            joint.validate()?;
        }

        let mut gpios = [self.buzzer_gpio; JOINT_COUNT + 1];
        for (i, joint) in self.joints.iter().enumerate() {
            gpios[i] = joint.gpio;
        }
        for (i, pin) in gpios.iter().enumerate() {
            if gpios[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicateGpio(*pin));
            }
        }

        self.servo.validate()?;
        self.motion.validate()?;

        if self.server.io_timeout_ms == 0 {
            return Err(ConfigError::Timing("io_timeout_ms must be non-zero"));
        }
        if self.server.max_request_bytes < 16 {
            return Err(ConfigError::Timing("max_request_bytes must be at least 16"));
        }
        Ok(())
    }
}
