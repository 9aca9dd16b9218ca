//! Outbound application events.
//!
//! Runners, the service and the supervisor emit these through the
//! [`EventSink`](super::ports::EventSink) port.

use core::net::SocketAddr;

use super::state::{JointId, MotionMode};

/// Why a joint stopped driving its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// Idle long enough with power-save enabled.
    PowerSave,
    /// Supervisor shutdown.
    Shutdown,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A joint was driven to its start pose.
    JointHomed { joint: JointId, angle: f32 },

    /// A web command changed a joint's mode.
    ModeChanged { joint: JointId, mode: MotionMode },

    /// The indicator was switched.
    IndicatorChanged(bool),

    /// A moving joint hit the end of its travel.
    LimitReached { joint: JointId, angle: f32 },

    /// A joint stopped driving its signal.
    JointReleased {
        joint: JointId,
        angle: f32,
        reason: ReleaseReason,
    },

    /// A released joint started driving again.
    JointReattached { joint: JointId, angle: f32 },

    /// Every runner and the command server are up.
    Started { listen: SocketAddr },

    /// Shutdown finished; every joint is released.
    Stopped,
}
