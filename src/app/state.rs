//! Shared command state between the web command server and the joint runners.
//!
//! ```text
//! ┌──────────────┐  set_mode / set_indicator   ┌──────────────┐
//! │ CommandServer│────────────────────────────▶│              │
//! └──────────────┘                             │ CommandState │
//! ┌──────────────┐        mode(joint)          │  (atomics)   │
//! │ JointRunner×4│◀────────────────────────────│              │
//! └──────────────┘                             └──────────────┘
//! ```
//!
//! Each joint's mode is a single `AtomicU8`, so "increasing" and
//! "decreasing" can never be observed together: writing one replaces the
//! other.  Commands are not queued; only the latest mode survives.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Number of joints on the arm.
pub const JOINT_COUNT: usize = 4;

// ───────────────────────────────────────────────────────────────
// Joint identity
// ───────────────────────────────────────────────────────────────

/// Stable joint identifier.  The lowercase letter is the query-key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointId {
    /// Base rotation.
    A,
    /// Shoulder.
    B,
    /// Elbow.
    C,
    /// Gripper.
    D,
}

impl JointId {
    pub const ALL: [JointId; JOINT_COUNT] = [JointId::A, JointId::B, JointId::C, JointId::D];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase key prefix used on the wire (`a`, `b`, ...).
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "base",
            Self::B => "shoulder",
            Self::C => "elbow",
            Self::D => "gripper",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(s)
    }
}

// ───────────────────────────────────────────────────────────────
// Motion mode
// ───────────────────────────────────────────────────────────────

/// What a joint's runner should be doing on its next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MotionMode {
    #[default]
    Idle = 0,
    Increasing = 1,
    Decreasing = 2,
}

impl MotionMode {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Increasing,
            2 => Self::Decreasing,
            _ => Self::Idle,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// CommandState
// ───────────────────────────────────────────────────────────────

/// Desired mode per joint plus the indicator flag.
///
/// Shared as `Arc<CommandState>`; every method takes `&self` and never
/// blocks.
#[derive(Debug, Default)]
pub struct CommandState {
    modes: [AtomicU8; JOINT_COUNT],
    indicator: AtomicBool,
}

impl CommandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-writer-wins store of `joint`'s mode.
    pub fn set_mode(&self, joint: JointId, mode: MotionMode) {
        self.modes[joint.index()].store(mode as u8, Ordering::Release);
    }

    pub fn mode(&self, joint: JointId) -> MotionMode {
        MotionMode::from_u8(self.modes[joint.index()].load(Ordering::Acquire))
    }

    /// Put every joint back to `Idle`.
    pub fn stop_all(&self) {
        for joint in JointId::ALL {
            self.set_mode(joint, MotionMode::Idle);
        }
    }

    pub fn set_indicator(&self, on: bool) {
        self.indicator.store(on, Ordering::Release);
    }

    pub fn indicator(&self) -> bool {
        self.indicator.load(Ordering::Acquire)
    }

    /// Point-in-time copy for status rendering.  Fields are read one by
    /// one, so the snapshot is per-field consistent only.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            modes: JointId::ALL.map(|j| self.mode(j)),
            indicator: self.indicator(),
        }
    }
}

/// Plain copy of [`CommandState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub modes: [MotionMode; JOINT_COUNT],
    pub indicator: bool,
}

impl StateSnapshot {
    pub fn mode(&self, joint: JointId) -> MotionMode {
        self.modes[joint.index()]
    }
}

// ───────────────────────────────────────────────────────────────
// Stop signal
// ───────────────────────────────────────────────────────────────

/// One-way shutdown flag shared by the runners and the command server.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
