//! Unified error types for the eArm firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! supervisor's startup path uniform.  All variants are `Copy` so they can be
//! passed across the runner threads without allocation.

use core::fmt;

use crate::app::state::JointId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid; construction is refused.
    Config(ConfigError),
    /// The network command surface failed to come up.
    Comms(CommsError),
    /// Peripheral initialisation or task creation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Rejected configuration values.  These are fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `min_angle` / `max_angle` outside 0..=180 or not strictly ordered.
    AngleBounds { joint: JointId, min: u8, max: u8 },
    /// The start pose lies outside the joint's travel.
    InitialAngle { joint: JointId, angle: u8 },
    /// Pulse bounds are empty, inverted, or longer than the PWM period.
    PulseBounds { min_us: u16, max_us: u16, period_us: u32 },
    /// The joint in `slot` is configured as `found`; joints go A, B, C, D.
    JointOrder { slot: JointId, found: JointId },
    /// Two joints share a GPIO.
    DuplicateGpio(i32),
    /// A timing or sizing field failed range validation.
    Timing(&'static str),
    /// JSON override could not be parsed.
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AngleBounds { joint, min, max } => write!(
                f,
                "joint {joint}: angle bounds {min}..={max} invalid (need 0 <= min < max <= 180)"
            ),
            Self::InitialAngle { joint, angle } => {
                write!(f, "joint {joint}: initial angle {angle} outside travel")
            }
            Self::PulseBounds {
                min_us,
                max_us,
                period_us,
            } => write!(
                f,
                "pulse bounds {min_us}..{max_us}us invalid for {period_us}us period"
            ),
            Self::JointOrder { slot, found } => {
                write!(f, "joint slot {slot} holds joint {found}")
            }
            Self::DuplicateGpio(pin) => write!(f, "GPIO {pin} assigned twice"),
            Self::Timing(field) => write!(f, "timing: {field}"),
            Self::Parse => write!(f, "config JSON could not be parsed"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The listener socket could not be bound.
    BindFailed(u16),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed(port) => write!(f, "could not bind port {port}"),
        }
    }
}

impl core::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
